//! In-memory store implementations
//!
//! Used by the snapshot CLI and the test suites. Each write takes a single
//! lock, so readers never observe a partially applied change.

use super::{
    IndicatorCatalog, IndicatorRegistry, IterationCounter, ResultStore, SubmissionRepository,
    SubmissionStore,
};
use ahp_common::models::{validate_weights, AhpResult};
use ahp_common::{Error, Indicator, Iteration, Result, Submission, WeightMap};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Indicator catalog kept in insertion order
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    indicators: RwLock<Vec<Indicator>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a catalog; later duplicates of a name are a `Conflict`
    pub fn with_indicators(indicators: Vec<Indicator>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for indicator in &indicators {
            if !seen.insert(indicator.name.as_str()) {
                return Err(Error::Conflict(format!(
                    "Indicator name must be unique: {}",
                    indicator.name
                )));
            }
        }
        Ok(Self {
            indicators: RwLock::new(indicators),
        })
    }
}

#[async_trait]
impl IndicatorCatalog for InMemoryCatalog {
    async fn list_indicators(&self) -> Result<Vec<Indicator>> {
        Ok(self.indicators.read().await.clone())
    }
}

#[async_trait]
impl IndicatorRegistry for InMemoryCatalog {
    async fn insert_indicator(&self, indicator: Indicator) -> Result<Indicator> {
        let mut indicators = self.indicators.write().await;
        if indicators.iter().any(|i| i.name == indicator.name) {
            return Err(Error::Conflict(format!(
                "Indicator name must be unique: {}",
                indicator.name
            )));
        }
        indicators.push(indicator.clone());
        Ok(indicator)
    }

    async fn update_indicator(&self, indicator: Indicator) -> Result<Indicator> {
        let mut indicators = self.indicators.write().await;
        if indicators
            .iter()
            .any(|i| i.name == indicator.name && i.id != indicator.id)
        {
            return Err(Error::Conflict(format!(
                "Indicator name must be unique: {}",
                indicator.name
            )));
        }
        let slot = indicators
            .iter_mut()
            .find(|i| i.id == indicator.id)
            .ok_or_else(|| Error::NotFound(format!("Indicator {}", indicator.id)))?;
        *slot = indicator.clone();
        Ok(indicator)
    }

    async fn remove_indicator(&self, id: Uuid) -> Result<Indicator> {
        let mut indicators = self.indicators.write().await;
        let pos = indicators
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("Indicator {}", id)))?;
        Ok(indicators.remove(pos))
    }
}

/// Submissions kept in arrival order
#[derive(Debug, Default)]
pub struct InMemorySubmissions {
    submissions: RwLock<Vec<Submission>>,
}

impl InMemorySubmissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submissions(submissions: Vec<Submission>) -> Self {
        Self {
            submissions: RwLock::new(submissions),
        }
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissions {
    async fn find_by_iteration(&self, iteration: Iteration) -> Result<Vec<Submission>> {
        Ok(self
            .submissions
            .read()
            .await
            .iter()
            .filter(|s| s.iteration == iteration)
            .cloned()
            .collect())
    }

    async fn distinct_iterations(&self) -> Result<Vec<Iteration>> {
        let iterations: BTreeSet<Iteration> = self
            .submissions
            .read()
            .await
            .iter()
            .map(|s| s.iteration)
            .collect();
        Ok(iterations.into_iter().collect())
    }

    async fn list_submissions(&self) -> Result<Vec<Submission>> {
        Ok(self.submissions.read().await.clone())
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissions {
    async fn insert_submission(&self, submission: Submission) -> Result<()> {
        let mut submissions = self.submissions.write().await;
        if submissions.iter().any(|s| s.id == submission.id) {
            return Err(Error::Conflict(format!("Submission {} already exists", submission.id)));
        }
        submissions.push(submission);
        Ok(())
    }

    async fn delete_submission(&self, id: Uuid) -> Result<Option<Submission>> {
        let mut submissions = self.submissions.write().await;
        Ok(submissions
            .iter()
            .position(|s| s.id == id)
            .map(|pos| submissions.remove(pos)))
    }
}

/// Results keyed by iteration
#[derive(Debug, Default)]
pub struct InMemoryResults {
    results: RwLock<BTreeMap<Iteration, AhpResult>>,
}

impl InMemoryResults {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for InMemoryResults {
    async fn upsert(&self, iteration: Iteration, weights: WeightMap) -> Result<AhpResult> {
        validate_weights(&weights)?;
        let mut results = self.results.write().await;
        let now = Utc::now();
        let result = match results.get(&iteration) {
            Some(existing) => AhpResult {
                iteration,
                weights,
                created_at: existing.created_at,
                updated_at: now,
            },
            None => AhpResult::new(iteration, weights)?,
        };
        results.insert(iteration, result.clone());
        Ok(result)
    }

    async fn delete_by_iteration(&self, iteration: Iteration) -> Result<bool> {
        Ok(self.results.write().await.remove(&iteration).is_some())
    }

    async fn get(&self, iteration: Iteration) -> Result<Option<AhpResult>> {
        Ok(self.results.read().await.get(&iteration).cloned())
    }

    async fn list(&self) -> Result<Vec<AhpResult>> {
        Ok(self.results.read().await.values().cloned().collect())
    }
}

/// Lock-free iteration counter
#[derive(Debug, Default)]
pub struct AtomicIterationCounter {
    value: AtomicU64,
}

impl AtomicIterationCounter {
    pub fn new(initial: Iteration) -> Self {
        Self {
            value: AtomicU64::new(initial),
        }
    }
}

#[async_trait]
impl IterationCounter for AtomicIterationCounter {
    async fn current(&self) -> Result<Iteration> {
        Ok(self.value.load(Ordering::SeqCst))
    }

    async fn increment(&self) -> Result<Iteration> {
        let previous = self.value.fetch_add(1, Ordering::SeqCst);
        Ok(previous + 1)
    }

    async fn set(&self, value: Iteration) -> Result<Iteration> {
        self.value.store(value, Ordering::SeqCst);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahp_common::models::Respondent;
    use ahp_common::Category;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_catalog_rejects_duplicate_names() {
        let catalog = InMemoryCatalog::new();
        catalog
            .insert_indicator(Indicator::new("A", "first", Category::FinancialEconomic))
            .await
            .unwrap();
        let err = catalog
            .insert_indicator(Indicator::new("A", "again", Category::SocialEnvironmental))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_catalog_update_and_remove() {
        let catalog = InMemoryCatalog::new();
        let a = catalog
            .insert_indicator(Indicator::new("A", "a", Category::FinancialEconomic))
            .await
            .unwrap();
        catalog
            .insert_indicator(Indicator::new("B", "b", Category::FinancialEconomic))
            .await
            .unwrap();

        let mut renamed = a.clone();
        renamed.name = "B".to_string();
        assert!(matches!(
            catalog.update_indicator(renamed).await,
            Err(Error::Conflict(_))
        ));

        let mut moved = a.clone();
        moved.category = Category::SocialEnvironmental;
        catalog.update_indicator(moved).await.unwrap();

        let removed = catalog.remove_indicator(a.id).await.unwrap();
        assert_eq!(removed.category, Category::SocialEnvironmental);
        assert!(matches!(
            catalog.remove_indicator(a.id).await,
            Err(Error::NotFound(_))
        ));
        assert_eq!(catalog.list_indicators().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seeded_catalog_rejects_duplicates() {
        let result = InMemoryCatalog::with_indicators(vec![
            Indicator::new("A", "a", Category::FinancialEconomic),
            Indicator::new("A", "b", Category::SocialEnvironmental),
        ]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_submissions_by_iteration() {
        let store = InMemorySubmissions::new();
        for iteration in [3, 1, 3] {
            store
                .insert_submission(Submission::new(Respondent::default(), iteration, vec![]))
                .await
                .unwrap();
        }
        assert_eq!(store.distinct_iterations().await.unwrap(), vec![1, 3]);
        assert_eq!(store.find_by_iteration(3).await.unwrap().len(), 2);
        assert!(store.find_by_iteration(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_submission() {
        let store = InMemorySubmissions::new();
        assert!(store.delete_submission(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_result_upsert_keeps_created_at() {
        let store = InMemoryResults::new();
        let mut weights = WeightMap::new();
        weights.insert("A".to_string(), 1.0);

        let first = store.upsert(2, weights.clone()).await.unwrap();
        weights.insert("A".to_string(), 0.5);
        let second = store.upsert(2, weights).await.unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(store.get(2).await.unwrap().unwrap().weights["A"], 0.5);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_result_upsert_rejects_invalid_weights_without_writing() {
        let store = InMemoryResults::new();
        let mut good = WeightMap::new();
        good.insert("A".to_string(), 0.4);
        store.upsert(1, good).await.unwrap();

        let mut bad = WeightMap::new();
        bad.insert("A".to_string(), -0.1);
        assert!(store.upsert(1, bad).await.is_err());
        assert_eq!(store.get(1).await.unwrap().unwrap().weights["A"], 0.4);
    }

    #[tokio::test]
    async fn test_result_delete() {
        let store = InMemoryResults::new();
        store.upsert(5, WeightMap::new()).await.unwrap();
        assert!(store.delete_by_iteration(5).await.unwrap());
        assert!(!store.delete_by_iteration(5).await.unwrap());
    }

    #[tokio::test]
    async fn test_counter_concurrent_increments() {
        let counter = Arc::new(AtomicIterationCounter::new(0));
        let mut handles = Vec::new();
        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move { counter.increment().await.unwrap() }));
        }
        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort();
        assert_eq!(seen, (1..=50).collect::<Vec<_>>());
        assert_eq!(counter.current().await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_counter_set() {
        let counter = AtomicIterationCounter::new(9);
        assert_eq!(counter.set(2).await.unwrap(), 2);
        assert_eq!(counter.increment().await.unwrap(), 3);
    }
}
