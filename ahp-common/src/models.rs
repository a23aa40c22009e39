//! Domain models shared by the engine and its callers

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Survey round identifier (non-negative, monotonically advanced)
pub type Iteration = u64;

/// Indicator name → priority weight in [0, 1]
pub type WeightMap = BTreeMap<String, f64>;

/// Weights may overshoot 1.0 by accumulated rounding only
const WEIGHT_TOLERANCE: f64 = 1e-12;

/// The two disjoint indicator groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Financial & economic indicators
    #[serde(rename = "IFE")]
    FinancialEconomic,
    /// Social & environmental indicators
    #[serde(rename = "ISL")]
    SocialEnvironmental,
}

impl Category {
    /// Both groups, in aggregation order
    pub const ALL: [Category; 2] = [Category::FinancialEconomic, Category::SocialEnvironmental];

    /// Short code used in stored documents
    pub fn code(&self) -> &'static str {
        match self {
            Category::FinancialEconomic => "IFE",
            Category::SocialEnvironmental => "ISL",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IFE" => Ok(Category::FinancialEconomic),
            "ISL" => Ok(Category::SocialEnvironmental),
            other => Err(Error::InvalidInput(format!("Unknown category: {}", other))),
        }
    }
}

/// Catalog entry; `name` is the key used in every comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: Category,
}

impl Indicator {
    pub fn new(name: impl Into<String>, description: impl Into<String>, category: Category) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            category,
        }
    }
}

/// "`item_a` is `value` times as important as `item_b`"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub item_a: String,
    pub item_b: String,
    pub value: f64,
}

impl Judgment {
    pub fn new(item_a: impl Into<String>, item_b: impl Into<String>, value: f64) -> Self {
        Self {
            item_a: item_a.into(),
            item_b: item_b.into(),
            value,
        }
    }

    /// Both sides of the pair belong to `keys`
    pub fn within(&self, keys: &HashSet<&str>) -> bool {
        keys.contains(self.item_a.as_str()) && keys.contains(self.item_b.as_str())
    }
}

/// Who answered the survey
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Respondent {
    pub name: String,
    pub title: String,
    pub institution: String,
}

/// Consistency Ratio recorded per group at submission time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupConsistency {
    #[serde(rename = "IFE")]
    pub financial_economic: f64,
    #[serde(rename = "ISL")]
    pub social_environmental: f64,
}

impl GroupConsistency {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::FinancialEconomic => self.financial_economic,
            Category::SocialEnvironmental => self.social_environmental,
        }
    }

    pub fn set(&mut self, category: Category, ratio: f64) {
        match category {
            Category::FinancialEconomic => self.financial_economic = ratio,
            Category::SocialEnvironmental => self.social_environmental = ratio,
        }
    }

    /// Largest ratio across both groups
    pub fn max(&self) -> f64 {
        self.financial_economic.max(self.social_environmental)
    }
}

/// One respondent's answers for one iteration (immutable once stored)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub respondent: Respondent,
    pub iteration: Iteration,
    /// Indicator names in the catalog when the answers were given
    #[serde(default)]
    pub criteria: Vec<String>,
    pub judgments: Vec<Judgment>,
    #[serde(default)]
    pub consistency: GroupConsistency,
    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(respondent: Respondent, iteration: Iteration, judgments: Vec<Judgment>) -> Self {
        Self {
            id: Uuid::new_v4(),
            respondent,
            iteration,
            criteria: Vec::new(),
            judgments,
            consistency: GroupConsistency::default(),
            submitted_at: Utc::now(),
        }
    }
}

/// Derived weights for one iteration (one document per iteration)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AhpResult {
    pub iteration: Iteration,
    pub weights: WeightMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AhpResult {
    /// Build a result document, rejecting weights outside [0, 1]
    pub fn new(iteration: Iteration, weights: WeightMap) -> Result<Self> {
        validate_weights(&weights)?;
        let now = Utc::now();
        Ok(Self {
            iteration,
            weights,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Every weight must be a finite real in [0, 1]
pub fn validate_weights(weights: &WeightMap) -> Result<()> {
    for (name, &w) in weights {
        if !w.is_finite() || w < 0.0 || w > 1.0 + WEIGHT_TOLERANCE {
            return Err(Error::InvalidInput(format!(
                "Weight for '{}' must be in [0, 1], got {}",
                name, w
            )));
        }
    }
    Ok(())
}
