use serde::{Deserialize, Serialize};
use std::fmt;

pub type DocId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "actual" => Ok(DocumentStatus::Actual),
            "irrelevant" => Ok(DocumentStatus::Irrelevant),
            "banned" => Ok(DocumentStatus::Banned),
            "removed" => Ok(DocumentStatus::Removed),
            other => Err(format!("unknown document status: {other}")),
        }
    }
}

/// A ranked search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

impl Document {
    pub fn new(id: DocId, relevance: f64, rating: i32) -> Self {
        Self { id, relevance, rating }
    }
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

/// Integer mean of the rating samples, truncated toward zero. Empty input rates 0.
pub fn compute_average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| r as i64).sum();
    (sum / ratings.len() as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_truncates_toward_zero() {
        assert_eq!(compute_average_rating(&[]), 0);
        assert_eq!(compute_average_rating(&[1, 2]), 1);
        assert_eq!(compute_average_rating(&[1, 2, -6]), -1);
        assert_eq!(compute_average_rating(&[i32::MAX, i32::MAX]), i32::MAX);
    }

    #[test]
    fn display_format() {
        let d = Document::new(3, 0.5, -2);
        assert_eq!(d.to_string(), "{ document_id = 3, relevance = 0.5, rating = -2 }");
    }

    #[test]
    fn status_from_str() {
        assert_eq!("BANNED".parse::<DocumentStatus>(), Ok(DocumentStatus::Banned));
        assert!("gone".parse::<DocumentStatus>().is_err());
    }
}
