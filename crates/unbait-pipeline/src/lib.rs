//! Pipeline orchestration: one run from fetch to indexed documents.

mod cancel;
mod error;
mod phase;
mod processor;
mod runner;
mod stats;

pub use cancel::CancelFlag;
pub use error::PipelineError;
pub use phase::{PhaseTracker, RunPhase};
pub use processor::{ArticleOutcome, ArticleProcessor, ProcessedArticle};
pub use runner::{PipelineRunner, RunSummary};
pub use stats::RunStats;
