use clap::{Parser, Subcommand};

use unbait_core::SourceMode;
use unbait_detect::{JsonFileStore, SourceReliabilityTracker};
use unbait_pipeline::PipelineRunner;

#[derive(Debug, Parser)]
#[command(name = "unbait")]
#[command(about = "News headline clickbait analysis and rewriting pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one pipeline pass
    Run {
        /// Override the number of articles to process
        #[arg(long)]
        articles: Option<usize>,
        /// Override the article source mode: rss, newsapi, or mixed
        #[arg(long)]
        source_mode: Option<String>,
    },
    /// Print the source reliability report
    Report,
    /// List the configured sources
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Missing required configuration is the only fatal category: abort here,
    // before any fetching begins.
    let mut config = unbait_core::load_app_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            articles,
            source_mode,
        } => {
            if let Some(articles) = articles {
                config.total_articles = articles;
            }
            if let Some(mode) = source_mode {
                config.source_mode = parse_mode(&mode)?;
            }
            run_pipeline(config).await
        }
        Commands::Report => print_report(&config),
        Commands::Sources => print_sources(&config),
    }
}

fn parse_mode(raw: &str) -> anyhow::Result<SourceMode> {
    match raw.to_lowercase().as_str() {
        "rss" => Ok(SourceMode::Rss),
        "newsapi" => Ok(SourceMode::NewsApi),
        "mixed" => Ok(SourceMode::Mixed),
        other => anyhow::bail!("unknown source mode '{other}'; expected rss, newsapi, or mixed"),
    }
}

async fn run_pipeline(config: unbait_core::AppConfig) -> anyhow::Result<()> {
    let runner = PipelineRunner::from_config(config)?;

    // Stop between batches on interrupt; already-submitted work stays put.
    let cancel = runner.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; stopping after the current batch");
            cancel.cancel();
        }
    });

    let summary = runner.run().await?;

    println!(
        "{} in {:.1} minutes",
        if summary.cancelled {
            "Run cancelled"
        } else {
            "Run complete"
        },
        summary.duration_secs / 60.0
    );
    println!(
        "  fetched {}, processed {}, skipped {}",
        summary.stats.articles_fetched,
        summary.stats.articles_processed,
        summary.stats.articles_skipped
    );
    println!(
        "  rewrites: {} ok, {} failed",
        summary.stats.rewrites_successful, summary.stats.rewrites_failed
    );
    println!(
        "  uploads: {} ok, {} failed across {} batches",
        summary.stats.uploads_successful, summary.stats.uploads_failed, summary.batches_submitted
    );

    Ok(())
}

fn print_report(config: &unbait_core::AppConfig) -> anyhow::Result<()> {
    let tracker =
        SourceReliabilityTracker::new(Box::new(JsonFileStore::new(&config.reliability_path)));
    let report = tracker.report();

    if report.sources.is_empty() {
        println!("No sources with enough history yet (5 articles minimum).");
        return Ok(());
    }

    println!("Source reliability ({} sources, best first):", report.total_sources);
    for entry in &report.sources {
        println!(
            "  {:<20} {:>4} articles  avg {:>5.1}  clickbait {:>5.1}%  [{}]",
            entry.name,
            entry.total_articles,
            entry.average_score,
            entry.clickbait_percentage,
            entry.reliability_rating
        );
    }

    Ok(())
}

fn print_sources(config: &unbait_core::AppConfig) -> anyhow::Result<()> {
    let specs = if config.sources_path.exists() {
        unbait_core::load_sources(&config.sources_path)?.sources
    } else {
        unbait_collect::builtin_specs()
    };

    println!("Configured sources:");
    for spec in &specs {
        println!(
            "  {:<16} {:<16} {} (min {}s between requests)",
            spec.key(),
            spec.name,
            spec.feed_url,
            spec.rate_limit_secs
        );
    }

    Ok(())
}
