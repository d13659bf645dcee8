//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier of a feedback record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when a stored or model-supplied label is outside its enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

/// Overall tone of a piece of feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sentiment::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownLabel {
                kind: "sentiment",
                value: s.to_string(),
            })
    }
}

/// How soon a piece of feedback needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::Low, Urgency::Medium, Urgency::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Urgency::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownLabel {
                kind: "urgency",
                value: s.to_string(),
            })
    }
}

/// Enrichment fields produced by a successful analysis
///
/// The three fields travel together; a record carries all of them or none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
}

/// One row of the feedback log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: RecordId,
    pub text: String,
    #[serde(flatten)]
    pub analysis: Option<Analysis>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn is_enriched(&self) -> bool {
        self.analysis.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_labels_parse_exact_names_only() {
        assert_eq!("Positive".parse::<Sentiment>(), Ok(Sentiment::Positive));
        assert_eq!("High".parse::<Urgency>(), Ok(Urgency::High));
        assert!("positive".parse::<Sentiment>().is_err());
        assert!("Angry".parse::<Sentiment>().is_err());
        assert!("Critical".parse::<Urgency>().is_err());
    }

    #[test]
    fn test_unknown_label_message() {
        let err = "Urgent".parse::<Urgency>().unwrap_err();
        assert_eq!(err.to_string(), "unknown urgency 'Urgent'");
    }

    #[test]
    fn test_bare_record_serializes_without_enrichment() {
        let record = FeedbackRecord {
            id: RecordId(7),
            text: "The app crashes on login".to_string(),
            analysis: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["text"], "The app crashes on login");
        assert!(json.get("summary").is_none());
        assert!(json.get("sentiment").is_none());
        assert!(json.get("urgency").is_none());
    }

    #[test]
    fn test_enriched_record_serializes_flat() {
        let record = FeedbackRecord {
            id: RecordId(1),
            text: "Love the new dashboard".to_string(),
            analysis: Some(Analysis {
                summary: "User likes the dashboard.".to_string(),
                sentiment: Sentiment::Positive,
                urgency: Urgency::Low,
            }),
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["summary"], "User likes the dashboard.");
        assert_eq!(json["sentiment"], "Positive");
        assert_eq!(json["urgency"], "Low");
    }
}
