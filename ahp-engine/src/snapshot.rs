//! JSON snapshot of engine inputs
//!
//! ```json
//! {
//!   "iteration": 5,
//!   "indicators": [{ "name": "A", "description": "...", "category": "IFE" }],
//!   "submissions": [{ "iteration": 5, "judgments": [{ "item_a": "A", "item_b": "B", "value": 0.5 }] }]
//! }
//! ```
//!
//! Ids and timestamps may be omitted and are generated on load.

use ahp_common::{Indicator, Iteration, Result, Submission};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current value of the iteration counter
    #[serde(default)]
    pub iteration: Iteration,
    #[serde(default)]
    pub indicators: Vec<Indicator>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

impl Snapshot {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            indicators = snapshot.indicators.len(),
            submissions = snapshot.submissions.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahp_common::Category;

    #[test]
    fn test_minimal_snapshot() {
        let snapshot = Snapshot::from_json_str(
            r#"{
                "iteration": 2,
                "indicators": [{"name": "A", "description": "a", "category": "ISL"}],
                "submissions": [{"iteration": 1, "judgments": []}]
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.iteration, 2);
        assert_eq!(snapshot.indicators[0].category, Category::SocialEnvironmental);
        assert_eq!(snapshot.submissions[0].iteration, 1);
        assert!(snapshot.submissions[0].criteria.is_empty());
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(Snapshot::from_json_str("{}").unwrap(), Snapshot::default());
    }

    #[test]
    fn test_malformed_json() {
        assert!(Snapshot::from_json_str("{ nope").is_err());
    }
}
