//! Paged headline API client with rate-limit-aware retry.
//!
//! Drives the fetch phase of a pipeline run against a NewsAPI-shaped
//! `/v2/everything` endpoint. On HTTP 429 the `Retry-After` header is parsed
//! (integer seconds or an HTTP date), clamped to five minutes, slept, and the
//! same page is retried — rate limiting never silently drops a page. Other
//! failures end that topic's fetch without aborting the run.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use unbait_core::NormalizedArticle;

use crate::error::CollectError;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// Longest wait honored from a `Retry-After` header.
const MAX_RETRY_AFTER_SECS: u64 = 300;

/// Pause between successive pages of one topic.
const INTER_PAGE_DELAY_SECS: u64 = 1;

/// Wait before retrying a page after a request timeout.
const TIMEOUT_RETRY_DELAY_SECS: u64 = 5;

const MAX_PAGE_SIZE: usize = 100;

/// One headline-API query topic with its share of the article mix.
#[derive(Debug, Clone)]
pub struct TopicSpec {
    pub key: &'static str,
    pub query: &'static str,
    pub domains: &'static str,
    pub weight: f64,
}

impl TopicSpec {
    /// The default topic mix: half general news, half sports.
    #[must_use]
    pub fn default_mix() -> Vec<TopicSpec> {
        vec![
            TopicSpec {
                key: "general",
                query: "UK",
                domains: "bbc.co.uk,theguardian.com,independent.co.uk,telegraph.co.uk",
                weight: 0.5,
            },
            TopicSpec {
                key: "sports",
                query: "sports OR football OR rugby OR cricket OR tennis OR golf",
                domains: "skysports.com,bbc.co.uk/sport,espn.co.uk,theguardian.com/sport",
                weight: 0.5,
            },
        ]
    }
}

/// Result of a topic fetch, including call accounting for the run summary.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub articles: Vec<NormalizedArticle>,
    pub api_calls: usize,
    pub api_errors: usize,
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    content: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    author: Option<String>,
    source: Option<ApiSource>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

/// HTTP client for the paged headline API.
pub struct HeadlineApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HeadlineApiClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CollectError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, CollectError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn everything_url(&self, query: &str, domains: &str, page_size: usize, page: usize) -> String {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
        format!(
            "{}/v2/everything?q={encoded}&domains={domains}&sortBy=publishedAt&language=en&pageSize={page_size}&page={page}&apiKey={}",
            self.base_url, self.api_key
        )
    }

    /// Fetches one page of a topic.
    ///
    /// # Errors
    ///
    /// - [`CollectError::RateLimited`] — HTTP 429; `retry_after_secs` carries
    ///   the parsed, clamped `Retry-After` value.
    /// - [`CollectError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`CollectError::Http`] — network or timeout failure.
    /// - [`CollectError::Deserialize`] — response body is not the expected shape.
    async fn fetch_page(
        &self,
        topic: &TopicSpec,
        page_size: usize,
        page: usize,
    ) -> Result<Vec<NormalizedArticle>, CollectError> {
        let url = self.everything_url(topic.query, topic.domains, page_size, page);
        tracing::debug!(topic = topic.key, page, page_size, "fetching headline page");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = parse_retry_after(
                response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            return Err(CollectError::RateLimited {
                host: self.base_url.clone(),
                retry_after_secs,
            });
        }

        if !status.is_success() {
            return Err(CollectError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let parsed =
            serde_json::from_str::<ArticlesResponse>(&body).map_err(|e| {
                CollectError::Deserialize {
                    context: format!("headline page {page} for topic {}", topic.key),
                    source: e,
                }
            })?;

        Ok(parsed
            .articles
            .into_iter()
            .filter_map(normalize_api_article)
            .collect())
    }

    /// Fetches up to `count` articles for one topic, paging until the topic
    /// is exhausted or the target is reached.
    ///
    /// Rate limiting and timeouts retry the same page; any other failure ends
    /// the topic's fetch with whatever was collected so far.
    pub async fn fetch_topic(&self, topic: &TopicSpec, count: usize) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        let mut page = 1usize;

        while outcome.articles.len() < count {
            let remaining = count - outcome.articles.len();
            let page_size = remaining.min(MAX_PAGE_SIZE);
            outcome.api_calls += 1;

            match self.fetch_page(topic, page_size, page).await {
                Ok(articles) => {
                    if articles.is_empty() {
                        tracing::info!(topic = topic.key, "no more articles available");
                        break;
                    }
                    outcome.articles.extend(articles);
                    page += 1;
                    tokio::time::sleep(Duration::from_secs(INTER_PAGE_DELAY_SECS)).await;
                }
                Err(CollectError::RateLimited {
                    retry_after_secs, ..
                }) => {
                    outcome.api_errors += 1;
                    tracing::warn!(
                        topic = topic.key,
                        page,
                        retry_after_secs,
                        "rate limited; sleeping before retrying the same page"
                    );
                    tokio::time::sleep(Duration::from_secs(retry_after_secs)).await;
                }
                Err(CollectError::Http(e)) if e.is_timeout() => {
                    outcome.api_errors += 1;
                    tracing::warn!(topic = topic.key, page, "timeout; retrying page");
                    tokio::time::sleep(Duration::from_secs(TIMEOUT_RETRY_DELAY_SECS)).await;
                }
                Err(e) => {
                    outcome.api_errors += 1;
                    tracing::error!(topic = topic.key, page, error = %e, "topic fetch ended");
                    break;
                }
            }
        }

        outcome.articles.truncate(count);
        outcome
    }

    /// Fetches `total` articles split across the topic mix by weight.
    pub async fn fetch_mix(&self, topics: &[TopicSpec], total: usize) -> FetchOutcome {
        let mut combined = FetchOutcome::default();
        let mut assigned = 0usize;

        for (index, topic) in topics.iter().enumerate() {
            let count = if index + 1 == topics.len() {
                total - assigned
            } else {
                #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let share = (total as f64 * topic.weight) as usize;
                share
            };
            assigned += count;
            if count == 0 {
                continue;
            }

            tracing::info!(topic = topic.key, count, "fetching topic share");
            let outcome = self.fetch_topic(topic, count).await;
            combined.api_calls += outcome.api_calls;
            combined.api_errors += outcome.api_errors;
            combined.articles.extend(outcome.articles);
        }

        combined
    }
}

/// Normalize one API record, dropping records without a usable title or url.
fn normalize_api_article(article: ApiArticle) -> Option<NormalizedArticle> {
    let title = article.title.unwrap_or_default();
    if title.trim().is_empty() || title == "[Removed]" {
        return None;
    }
    let url = article.url.unwrap_or_default();
    if url.trim().is_empty() {
        return None;
    }

    let content = article
        .content
        .or(article.description)
        .unwrap_or_default();

    Some(NormalizedArticle {
        title,
        url,
        content,
        source: article
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| "Unknown".to_string()),
        published_at: article.published_at.unwrap_or_default(),
        author: article.author.unwrap_or_default(),
        image_url: article.url_to_image.unwrap_or_default(),
    })
}

/// Parse a `Retry-After` header value into seconds, clamped to
/// [`MAX_RETRY_AFTER_SECS`]. Accepts either an integer or an RFC 2822 date;
/// anything else falls back to 60 seconds.
fn parse_retry_after(header: Option<&str>) -> u64 {
    let Some(raw) = header else {
        return 60;
    };
    let secs = if let Ok(secs) = raw.trim().parse::<u64>() {
        secs
    } else if let Ok(date) = chrono::DateTime::parse_from_rfc2822(raw.trim()) {
        let delta = date.signed_duration_since(chrono::Utc::now()).num_seconds();
        u64::try_from(delta.max(0)).unwrap_or(0)
    } else {
        60
    };
    secs.min(MAX_RETRY_AFTER_SECS)
}
