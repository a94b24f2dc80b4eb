//! Heuristics for deciding when an AI conversation should go to a human broker.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const EXPLICIT_KEYWORDS: &[&str] = &[
    "schedule a call",
    "schedule a meeting",
    "book a call",
    "call me",
    "speak to someone",
    "speak to a human",
    "speak to human",
    "talk to a human",
    "real person",
    "human agent",
    "appointment",
    "ready to proceed",
    "ready to apply",
    "apply now",
    "start application",
    "start my application",
    "sign up",
    "lets proceed",
    "let's proceed",
    "move forward",
    "meet in person",
];

const FRUSTRATION_KEYWORDS: &[&str] = &[
    "frustrated",
    "not helpful",
    "speak to someone else",
    "waste time",
    "wasting my time",
    "useless",
];

const COMPLEX_KEYWORDS: &[&str] = &[
    "divorce",
    "bankruptcy",
    "bankrupt",
    "foreigner",
    "overseas",
    "complicated",
];

const URGENT_TIMELINES: &[&str] = &["urgent", "immediate", "asap"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSignals {
    pub message: String,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub lead_score: i32,
    pub timeline: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionAssessment {
    pub should_transfer: bool,
    pub confidence: f64,
    pub reason: String,
    pub urgency: Urgency,
    pub matched_keywords: Vec<String>,
}

struct KeywordSet {
    pattern: Option<Regex>,
}

impl KeywordSet {
    fn new(keywords: &[&str]) -> Self {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"\b(?:{})\b", alternation)).ok();
        Self { pattern }
    }

    fn matches(&self, text: &str) -> Vec<String> {
        match &self.pattern {
            Some(pattern) => pattern
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect(),
            None => Vec::new(),
        }
    }
}

fn explicit() -> &'static KeywordSet {
    static SET: OnceLock<KeywordSet> = OnceLock::new();
    SET.get_or_init(|| KeywordSet::new(EXPLICIT_KEYWORDS))
}

fn frustration() -> &'static KeywordSet {
    static SET: OnceLock<KeywordSet> = OnceLock::new();
    SET.get_or_init(|| KeywordSet::new(FRUSTRATION_KEYWORDS))
}

fn complex() -> &'static KeywordSet {
    static SET: OnceLock<KeywordSet> = OnceLock::new();
    SET.get_or_init(|| KeywordSet::new(COMPLEX_KEYWORDS))
}

fn normalise(message: &str) -> String {
    message.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

struct Signal {
    confidence: f64,
    urgency: Urgency,
    reason: String,
}

pub fn detect(signals: &ConversionSignals) -> ConversionAssessment {
    let text = normalise(&signals.message);
    let mut found: Vec<Signal> = Vec::new();
    let mut matched_keywords: Vec<String> = Vec::new();

    let explicit_hits = explicit().matches(&text);
    if !explicit_hits.is_empty() {
        found.push(Signal {
            confidence: 0.95,
            urgency: Urgency::High,
            reason: "Lead explicitly asked to speak with a broker".to_string(),
        });
    }

    let frustration_hits = frustration().matches(&text);
    if !frustration_hits.is_empty() {
        found.push(Signal {
            confidence: 0.9,
            urgency: Urgency::Urgent,
            reason: "Lead is frustrated with the AI conversation".to_string(),
        });
    }

    let complex_hits = complex().matches(&text);
    if !complex_hits.is_empty() {
        found.push(Signal {
            confidence: 0.85,
            urgency: Urgency::High,
            reason: "Complex situation needs a human broker".to_string(),
        });
    }

    for hit in explicit_hits
        .into_iter()
        .chain(frustration_hits)
        .chain(complex_hits)
    {
        if !matched_keywords.contains(&hit) {
            matched_keywords.push(hit);
        }
    }

    let urgent_timeline = signals
        .timeline
        .as_deref()
        .map(|t| URGENT_TIMELINES.iter().any(|u| t.eq_ignore_ascii_case(u)))
        .unwrap_or(false);

    if urgent_timeline && signals.message_count >= 5 {
        found.push(Signal {
            confidence: 0.8,
            urgency: Urgency::High,
            reason: "Urgent timeline with sustained engagement".to_string(),
        });
    }
    if signals.message_count > 10 && signals.lead_score >= 75 {
        found.push(Signal {
            confidence: 0.75,
            urgency: Urgency::Medium,
            reason: "High-value lead with extended engagement".to_string(),
        });
    }
    if signals.message_count > 20 {
        found.push(Signal {
            confidence: 0.6,
            urgency: Urgency::Medium,
            reason: "Long conversation may benefit from a human touch".to_string(),
        });
    }

    let strongest = found
        .iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence));

    match strongest {
        Some(signal) => ConversionAssessment {
            should_transfer: true,
            confidence: signal.confidence,
            reason: signal.reason.clone(),
            urgency: found
                .iter()
                .map(|s| s.urgency)
                .max()
                .unwrap_or(signal.urgency),
            matched_keywords,
        },
        None => ConversionAssessment {
            should_transfer: false,
            confidence: 0.0,
            reason: "No conversion signals detected".to_string(),
            urgency: Urgency::Low,
            matched_keywords,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(message: &str, count: u32, score: i32, timeline: Option<&str>) -> ConversionSignals {
        ConversionSignals {
            message: message.to_string(),
            message_count: count,
            lead_score: score,
            timeline: timeline.map(str::to_string),
        }
    }

    #[test]
    fn test_explicit_request_transfers_with_high_confidence() {
        let result = detect(&signals("Can we schedule a call tomorrow?", 2, 40, None));
        assert!(result.should_transfer);
        assert!(result.confidence >= 0.9);
        assert_eq!(result.urgency, Urgency::High);
        assert_eq!(result.matched_keywords, vec!["schedule a call"]);
    }

    #[test]
    fn test_frustration_is_urgent() {
        let result = detect(&signals("This is not helpful at all", 3, 50, None));
        assert!(result.should_transfer);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.urgency, Urgency::Urgent);
    }

    #[test]
    fn test_explicit_wins_confidence_but_keeps_urgent_flag() {
        let result = detect(&signals("I'm frustrated, call me", 1, 50, None));
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.urgency, Urgency::Urgent);
        assert_eq!(result.matched_keywords.len(), 2);
    }

    #[test]
    fn test_complex_situation() {
        let result = detect(&signals("I'm going through a DIVORCE", 1, 50, None));
        assert!(result.should_transfer);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        let result = detect(&signals("The signage at the showflat was nice", 1, 50, None));
        assert!(!result.should_transfer);
        assert!(result.matched_keywords.is_empty());
    }

    #[test]
    fn test_engagement_thresholds() {
        assert_eq!(
            detect(&signals("ok", 5, 40, Some("urgent"))).confidence,
            0.8
        );
        assert!(!detect(&signals("ok", 4, 40, Some("urgent"))).should_transfer);
        assert_eq!(detect(&signals("ok", 11, 75, None)).confidence, 0.75);
        assert!(!detect(&signals("ok", 10, 90, None)).should_transfer);
        assert_eq!(detect(&signals("ok", 21, 10, None)).confidence, 0.6);
    }

    #[test]
    fn test_no_signal() {
        let result = detect(&signals("What is the current SORA rate?", 3, 60, Some("flexible")));
        assert!(!result.should_transfer);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.urgency, Urgency::Low);
    }

    #[test]
    fn test_curly_apostrophe_normalised() {
        let result = detect(&signals("Let\u{2019}s proceed", 1, 50, None));
        assert!(result.should_transfer);
    }
}
