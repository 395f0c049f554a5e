//! Clickbait pattern and problematic-phrase tables.

use crate::types::{PatternCategory, PatternMatch};

/// Known clickbait indicators by category. Matching is literal substring
/// search over the lowercased headline.
const CLICKBAIT_PATTERNS: &[(PatternCategory, &[&str])] = &[
    (
        PatternCategory::Exaggeration,
        &[
            "shocking",
            "unbelievable",
            "incredible",
            "amazing",
            "stunning",
            "mind-blowing",
            "jaw-dropping",
            "explosive",
            "massive",
            "epic",
        ],
    ),
    (
        PatternCategory::CuriosityGap,
        &[
            "you won't believe",
            "happened next",
            "this is what",
            "the reason why",
            "here's why",
            "find out",
            "the truth about",
            "what really",
            "secret",
            "revealed",
        ],
    ),
    (
        PatternCategory::Urgency,
        &[
            "breaking",
            "just in",
            "urgent",
            "alert",
            "warning",
            "now",
            "immediately",
            "must see",
            "don't miss",
        ],
    ),
    (
        PatternCategory::EmotionalManipulation,
        &[
            "heartbreaking",
            "devastating",
            "tragic",
            "horrifying",
            "outrageous",
            "infuriating",
            "disgusting",
            "terrifying",
        ],
    ),
    (
        PatternCategory::Listicles,
        &[
            "reasons why",
            "ways to",
            "things you",
            "facts about",
            "tips for",
            "tricks to",
        ],
    ),
    (
        PatternCategory::Sensationalism,
        &[
            "slams", "blasts", "destroys", "obliterates", "annihilates", "demolishes", "crushes",
            "hammers", "rips into",
        ],
    ),
];

/// Points contributed by each matched pattern.
const POINTS_PER_MATCH: u32 = 10;

/// Upper bound on the pattern-based contribution to the clickbait score.
const PATTERN_SCORE_CAP: u32 = 50;

/// Words that often signal a negative or sensational framing.
const PROBLEMATIC_PHRASES: &[&str] = &[
    "threat", "threatens", "crisis", "crash", "collapse", "scandal", "outrage", "fury", "slams",
    "blasts", "attacks", "destroys", "fails", "failure", "disaster", "chaos", "panic", "fear",
    "war", "conflict", "violence", "death", "killed", "murdered",
];

/// A problematic phrase found in a headline, with surrounding context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseHit {
    pub phrase: &'static str,
    pub context: String,
    pub position: usize,
}

/// Scan a lowercased headline for clickbait patterns.
///
/// Returns the pattern score (capped at [`PATTERN_SCORE_CAP`]) and the list
/// of matches, each tagged with its category's reporting severity.
#[must_use]
pub fn check_patterns(headline_lower: &str) -> (u32, Vec<PatternMatch>) {
    let mut score = 0u32;
    let mut matches = Vec::new();

    for (category, patterns) in CLICKBAIT_PATTERNS {
        for pattern in *patterns {
            if headline_lower.contains(pattern) {
                score += POINTS_PER_MATCH;
                matches.push(PatternMatch {
                    category: *category,
                    pattern,
                    severity: category.severity(),
                });
            }
        }
    }

    (score.min(PATTERN_SCORE_CAP), matches)
}

/// Find up to three problematic phrases in a headline, each with ±10 chars of
/// context from the original text.
#[must_use]
pub fn find_problematic_phrases(text: &str) -> Vec<PhraseHit> {
    let text_lower = text.to_lowercase();
    let mut hits = Vec::new();

    for phrase in PROBLEMATIC_PHRASES {
        if let Some(start) = text_lower.find(phrase) {
            let context_start = start.saturating_sub(10);
            let context_end = (start + phrase.len() + 10).min(text.len());
            // Snap to char boundaries for non-ASCII headlines.
            let context_start = floor_char_boundary(text, context_start);
            let context_end = floor_char_boundary(text, context_end);
            hits.push(PhraseHit {
                phrase,
                context: text[context_start..context_end].trim().to_string(),
                position: start,
            });
            if hits.len() >= 3 {
                break;
            }
        }
    }

    hits
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatternSeverity;

    #[test]
    fn clean_headline_matches_nothing() {
        let (score, matches) = check_patterns("council approves transport plan");
        assert_eq!(score, 0);
        assert!(matches.is_empty());
    }

    #[test]
    fn each_match_contributes_ten_points() {
        let (score, matches) = check_patterns("shocking secret revealed");
        // exaggeration ×1 + curiosity_gap ×2.
        assert_eq!(matches.len(), 3);
        assert_eq!(score, 30);
    }

    #[test]
    fn pattern_score_caps_at_fifty() {
        let headline =
            "shocking unbelievable incredible amazing stunning secret revealed breaking urgent";
        let (score, matches) = check_patterns(headline);
        assert!(matches.len() > 5);
        assert_eq!(score, 50);
    }

    #[test]
    fn curiosity_heavy_headline_scores_thirty() {
        let headline = "you won't believe what shocking thing happened next";
        let (score, matches) = check_patterns(headline);
        // curiosity_gap ×2 ("you won't believe", "happened next") +
        // exaggeration ×1 ("shocking").
        assert_eq!(matches.len(), 3);
        assert_eq!(score, 30);
        assert_eq!(
            matches
                .iter()
                .filter(|m| m.category == PatternCategory::CuriosityGap)
                .count(),
            2
        );
    }

    #[test]
    fn matches_carry_category_severity() {
        let (_, matches) = check_patterns("you won't believe this heartbreaking story");
        let curiosity = matches
            .iter()
            .find(|m| m.pattern == "you won't believe")
            .unwrap();
        assert_eq!(curiosity.severity, PatternSeverity::High);
        let emotional = matches
            .iter()
            .find(|m| m.pattern == "heartbreaking")
            .unwrap();
        assert_eq!(emotional.severity, PatternSeverity::High);
    }

    #[test]
    fn problematic_phrases_capped_at_three() {
        let hits = find_problematic_phrases("crisis crash collapse scandal outrage");
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn problematic_phrase_carries_context() {
        let hits = find_problematic_phrases("Minister slams new housing policy");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].phrase, "slams");
        assert!(hits[0].context.contains("slams"));
    }

    #[test]
    fn no_problematic_phrases_in_calm_text() {
        assert!(find_problematic_phrases("Garden show opens this weekend").is_empty());
    }
}
