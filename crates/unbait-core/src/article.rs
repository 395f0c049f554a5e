use serde::{Deserialize, Serialize};

/// Canonical article shape produced by every collector.
///
/// `title` and `url` are guaranteed non-empty: adapters drop any record that
/// fails that invariant before it leaves the collector boundary.
/// `published_at` is RFC 3339 when the producer date was parseable; otherwise
/// the producer's raw text is carried through and the validator decides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedArticle {
    pub title: String,
    pub url: String,
    pub content: String,
    pub source: String,
    pub published_at: String,
    pub author: String,
    pub image_url: String,
}

impl NormalizedArticle {
    /// Returns `true` when the identity fields (`title`, `url`) are both
    /// non-empty after trimming.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, url: &str) -> NormalizedArticle {
        NormalizedArticle {
            title: title.to_string(),
            url: url.to_string(),
            content: String::new(),
            source: "Test".to_string(),
            published_at: String::new(),
            author: String::new(),
            image_url: String::new(),
        }
    }

    #[test]
    fn has_identity_with_both_fields() {
        assert!(article("Headline", "https://example.com/a").has_identity());
    }

    #[test]
    fn missing_title_fails_identity() {
        assert!(!article("", "https://example.com/a").has_identity());
        assert!(!article("   ", "https://example.com/a").has_identity());
    }

    #[test]
    fn missing_url_fails_identity() {
        assert!(!article("Headline", "").has_identity());
    }
}
