//! RSS/Atom feed source adapter.

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

use unbait_core::{NormalizedArticle, SourceSpec};

use crate::error::CollectError;
use crate::source::{NewsSource, RateGate};

/// An RSS/Atom feed producer.
///
/// Fetches the configured feed URL, parses `<item>`/`<entry>` elements, and
/// normalizes them into [`NormalizedArticle`]s. Records without a title or
/// link are dropped with a debug trace and never leave this adapter.
pub struct RssSource {
    spec: SourceSpec,
    key: String,
    origin: String,
    client: reqwest::Client,
    gate: RateGate,
}

/// One parsed feed entry before normalization.
#[derive(Debug, Default)]
struct FeedItem {
    title: String,
    link: String,
    description: String,
    published: String,
    author: String,
    image_url: String,
}

impl RssSource {
    /// Creates an RSS source from a registry spec.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::InvalidFeedUrl`] if the feed URL has no
    /// parseable origin, or [`CollectError::Http`] if the HTTP client cannot
    /// be constructed.
    pub fn new(
        spec: SourceSpec,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CollectError> {
        let origin = reqwest::Url::parse(&spec.feed_url)
            .map(|u| u.origin().ascii_serialization())
            .map_err(|e| CollectError::InvalidFeedUrl {
                url: spec.feed_url.clone(),
                reason: e.to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let key = spec.key();
        let gate = RateGate::new(Duration::from_secs(spec.rate_limit_secs));

        Ok(Self {
            spec,
            key,
            origin,
            client,
            gate,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, CollectError> {
        self.gate.acquire().await;
        let result = async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(CollectError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok(response.text().await?)
        }
        .await;
        self.gate.release().await;
        result
    }

    fn normalize(&self, item: FeedItem) -> NormalizedArticle {
        NormalizedArticle {
            title: item.title.trim().to_string(),
            url: absolutize(&self.origin, item.link.trim()),
            content: strip_html(&item.description),
            source: self.spec.name.clone(),
            published_at: normalize_date(&item.published),
            author: item.author.trim().to_string(),
            image_url: if item.image_url.is_empty() {
                String::new()
            } else {
                absolutize(&self.origin, item.image_url.trim())
            },
        }
    }
}

#[async_trait]
impl NewsSource for RssSource {
    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.spec.name
    }

    async fn fetch(&self, max_articles: usize) -> Result<Vec<NormalizedArticle>, CollectError> {
        tracing::debug!(source = %self.key, max_articles, "fetching feed");

        let body = self.get_text(&self.spec.feed_url).await?;
        let items = parse_feed(&body)?;

        let mut articles = Vec::new();
        for item in items {
            if articles.len() >= max_articles {
                break;
            }
            let article = self.normalize(item);
            if article.has_identity() {
                articles.push(article);
            } else {
                tracing::debug!(
                    source = %self.key,
                    title = %article.title,
                    "dropping feed entry without title/url"
                );
            }
        }

        tracing::debug!(source = %self.key, count = articles.len(), "feed fetch complete");
        Ok(articles)
    }

    async fn check_access_policy(&self) -> bool {
        let robots_url = format!("{}/robots.txt", self.origin);
        match self.get_text(&robots_url).await {
            Ok(body) => {
                let body = body.to_lowercase();
                if body.contains("disallow: /rss") || body.contains("disallow: /feed") {
                    tracing::warn!(source = %self.key, "robots.txt disallows feed access");
                    false
                } else {
                    true
                }
            }
            Err(e) => {
                tracing::warn!(
                    source = %self.key,
                    error = %e,
                    "could not fetch robots.txt, proceeding anyway"
                );
                true
            }
        }
    }
}

/// Parse an RSS 2.0 or Atom feed body into feed items.
///
/// # Errors
///
/// Returns [`CollectError::Xml`] if the XML is malformed.
fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, CollectError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current = FeedItem::default();
    let mut in_item = false;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                match name.as_str() {
                    "item" | "entry" => {
                        in_item = true;
                        current = FeedItem::default();
                    }
                    // Atom entries carry the link as an href attribute.
                    "link" if in_item => {
                        if let Some(href) = attr_value(&e, b"href") {
                            current.link = href;
                        }
                        current_tag = name;
                    }
                    _ => {
                        current_tag = name;
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if !in_item {
                    continue;
                }
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                match name {
                    "link" => {
                        if let Some(href) = attr_value(&e, b"href") {
                            current.link = href;
                        }
                    }
                    "media:thumbnail" | "media:content" => {
                        if current.image_url.is_empty() {
                            if let Some(url) = attr_value(&e, b"url") {
                                current.image_url = url;
                            }
                        }
                    }
                    "enclosure" => {
                        let is_image = attr_value(&e, b"type")
                            .is_some_and(|t| t.starts_with("image"));
                        if is_image && current.image_url.is_empty() {
                            if let Some(url) = attr_value(&e, b"url") {
                                current.image_url = url;
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if (name == "item" || name == "entry") && in_item {
                    in_item = false;
                    items.push(std::mem::take(&mut current));
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    assign_field(&mut current, &current_tag, text);
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    assign_field(&mut current, &current_tag, text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CollectError::Xml(e)),
            _ => {}
        }
    }

    Ok(items)
}

fn assign_field(item: &mut FeedItem, tag: &str, text: String) {
    match tag {
        "title" => item.title = text,
        "link" if item.link.is_empty() => item.link = text,
        "description" | "summary" => {
            if item.description.is_empty() {
                item.description = text;
            }
        }
        "pubDate" | "published" | "updated" => {
            if item.published.is_empty() {
                item.published = text;
            }
        }
        "author" | "dc:creator" => {
            if item.author.is_empty() {
                item.author = text;
            }
        }
        _ => {}
    }
}

fn attr_value(e: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(Result::ok)
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Strip HTML tags from a string, returning plain text.
fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.trim().to_string()
}

/// Make a relative URL absolute against the feed origin.
fn absolutize(origin: &str, url: &str) -> String {
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{origin}{url}")
    } else {
        format!("{origin}/{url}")
    }
}

/// Normalize a feed date to RFC 3339.
///
/// Feeds mostly publish RFC 2822 (`Tue, 04 Aug 2026 09:30:00 GMT`); Atom uses
/// RFC 3339. Anything unparseable is carried through raw — the validator is
/// lenient on ambiguous dates and decides downstream.
fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(raw) {
        return dt.to_rfc3339();
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.to_rfc3339();
    }
    tracing::warn!(date = raw, "could not normalize feed date");
    raw.to_string()
}
