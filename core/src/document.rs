use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type DocId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    #[default]
    Active,
    Irrelevant,
    Banned,
    Removed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Active => "ACTIVE",
            DocumentStatus::Irrelevant => "IRRELEVANT",
            DocumentStatus::Banned => "BANNED",
            DocumentStatus::Removed => "REMOVED",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            // "ACTUAL" is accepted as an alias of ACTIVE
            "ACTIVE" | "ACTUAL" => Ok(DocumentStatus::Active),
            "IRRELEVANT" => Ok(DocumentStatus::Irrelevant),
            "BANNED" => Ok(DocumentStatus::Banned),
            "REMOVED" => Ok(DocumentStatus::Removed),
            other => Err(format!("unknown document status: {other}")),
        }
    }
}

/// One ranked hit of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}

/// Result of matching a query against a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedDocument {
    /// Plus terms of the query present in the document, in ascending order.
    pub terms: Vec<String>,
    pub status: DocumentStatus,
}

/// Mean of the samples truncated toward zero; 0 for no samples.
pub fn compute_average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    // i64 division truncates toward zero and the mean always fits back into i32
    (sum / ratings.len() as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rating_truncates_toward_zero() {
        assert_eq!(compute_average_rating(&[]), 0);
        assert_eq!(compute_average_rating(&[4]), 4);
        assert_eq!(compute_average_rating(&[1, 2, 3]), 2);
        assert_eq!(compute_average_rating(&[0, -1, 1]), 0);
        assert_eq!(compute_average_rating(&[-4, 2, -7, -7]), -4);
        // -3 / 2 is -1.5: toward zero gives -1, floor would give -2
        assert_eq!(compute_average_rating(&[-1, -2]), -1);
        assert_eq!(compute_average_rating(&[1, 2]), 1);
    }

    #[test]
    fn average_rating_does_not_overflow() {
        assert_eq!(compute_average_rating(&[i32::MAX, i32::MAX]), i32::MAX);
        assert_eq!(compute_average_rating(&[i32::MIN, i32::MIN]), i32::MIN);
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            DocumentStatus::Active,
            DocumentStatus::Irrelevant,
            DocumentStatus::Banned,
            DocumentStatus::Removed,
        ] {
            assert_eq!(status.to_string().parse::<DocumentStatus>(), Ok(status));
        }
        assert_eq!("actual".parse::<DocumentStatus>(), Ok(DocumentStatus::Active));
        assert!("archived".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn document_display_format() {
        let doc = Document { id: 1, relevance: 0.5, rating: 2 };
        assert_eq!(doc.to_string(), "{ document_id = 1, relevance = 0.5, rating = 2 }");
    }

    #[test]
    fn json_form_used_by_the_server() {
        assert_eq!(serde_json::to_value(DocumentStatus::Banned).unwrap(), serde_json::json!("BANNED"));
        let status: DocumentStatus = serde_json::from_str("\"IRRELEVANT\"").unwrap();
        assert_eq!(status, DocumentStatus::Irrelevant);
        assert!(serde_json::from_str::<DocumentStatus>("\"active\"").is_err());

        let doc = Document { id: 3, relevance: 0.25, rating: -1 };
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            serde_json::json!({ "id": 3, "relevance": 0.25, "rating": -1 })
        );

        let matched = MatchedDocument { terms: vec!["cat".into()], status: DocumentStatus::Active };
        let value = serde_json::to_value(&matched).unwrap();
        assert_eq!(value, serde_json::json!({ "terms": ["cat"], "status": "ACTIVE" }));
        assert_eq!(serde_json::from_value::<MatchedDocument>(value).unwrap(), matched);
    }
}
