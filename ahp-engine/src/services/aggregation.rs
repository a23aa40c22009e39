//! Aggregation orchestrator
//!
//! Drives builder → aggregator → normalizer/weights for every indicator group
//! of one iteration and persists the merged weight map.
//!
//! # State per iteration
//! NoData ⇄ Computed. A run with submissions upserts the result (Computed);
//! a run without submissions deletes it (NoData).
//!
//! # Ordering
//! Runs for the same iteration are serialized through a per-iteration lock
//! (read submissions → compute → upsert). Different iterations never wait on
//! each other; a lock entry is dropped once no run holds it. Every run re-reads all submissions, so repeating it converges
//! to the same result.

use crate::ahp::{
    build_pairwise_matrix, derive_weights, filter_judgments, mean_matrix, ConsistencyChecker,
    ConsistencyReport, Matrix,
};
use crate::stores::{IndicatorCatalog, ResultStore, SubmissionStore};
use ahp_common::events::{AhpEvent, EventBus};
use ahp_common::{Category, Indicator, Iteration, Result, Submission, WeightMap};
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Aggregated outcome for one indicator group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComputation {
    pub category: Category,
    /// Ordered indicator names (matrix row/column labels)
    pub keys: Vec<String>,
    pub mean_matrix: Matrix,
    pub normalized_matrix: Matrix,
    pub weights: Vec<f64>,
    /// Consistency of the aggregated matrix
    pub consistency: ConsistencyReport,
    /// Mean of the CR values respondents recorded for this group
    pub mean_reported_ratio: f64,
}

impl GroupComputation {
    /// No indicators in this group (or nothing to aggregate)
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Everything computed for one iteration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationComputation {
    pub iteration: Iteration,
    pub respondent_count: usize,
    /// Indicator name → weight across both groups
    pub weights: WeightMap,
    pub groups: Vec<GroupComputation>,
}

impl IterationComputation {
    pub fn group(&self, category: Category) -> Option<&GroupComputation> {
        self.groups.iter().find(|g| g.category == category)
    }
}

/// Split the catalog into one ordered, duplicate-free key list per group
pub fn partition_indicators(indicators: &[Indicator]) -> Vec<(Category, Vec<String>)> {
    Category::ALL
        .iter()
        .map(|&category| {
            let mut seen = HashSet::new();
            let keys = indicators
                .iter()
                .filter(|i| i.category == category)
                .filter(|i| {
                    let fresh = seen.insert(i.name.as_str());
                    if !fresh {
                        warn!(%category, name = %i.name, "Duplicate indicator name ignored");
                    }
                    fresh
                })
                .map(|i| i.name.clone())
                .collect();
            (category, keys)
        })
        .collect()
}

/// Aggregate one group across all respondents of an iteration
pub fn compute_group(
    category: Category,
    keys: &[String],
    submissions: &[Submission],
    checker: &ConsistencyChecker,
) -> Result<GroupComputation> {
    let key_set: HashSet<&str> = keys.iter().map(String::as_str).collect();

    let matrices: Vec<Matrix> = if keys.is_empty() {
        Vec::new()
    } else {
        submissions
            .iter()
            .map(|s| build_pairwise_matrix(keys, filter_judgments(&s.judgments, &key_set)))
            .collect()
    };

    let mean_reported_ratio = if submissions.is_empty() {
        0.0
    } else {
        submissions
            .iter()
            .map(|s| s.consistency.get(category))
            .sum::<f64>()
            / submissions.len() as f64
    };

    let mean = mean_matrix(&matrices)?;
    let (normalized, weights) = derive_weights(&mean);
    let consistency = checker.check(&mean, &weights)?;

    Ok(GroupComputation {
        category,
        keys: if mean.is_empty() { Vec::new() } else { keys.to_vec() },
        mean_matrix: mean,
        normalized_matrix: normalized,
        weights,
        consistency,
        mean_reported_ratio,
    })
}

/// Sole writer of AHP results
pub struct AggregationOrchestrator {
    catalog: Arc<dyn IndicatorCatalog>,
    submissions: Arc<dyn SubmissionStore>,
    results: Arc<dyn ResultStore>,
    checker: ConsistencyChecker,
    event_bus: EventBus,
    iteration_locks: Mutex<HashMap<Iteration, Arc<Mutex<()>>>>,
}

impl AggregationOrchestrator {
    pub fn new(
        catalog: Arc<dyn IndicatorCatalog>,
        submissions: Arc<dyn SubmissionStore>,
        results: Arc<dyn ResultStore>,
        checker: ConsistencyChecker,
        event_bus: EventBus,
    ) -> Self {
        Self {
            catalog,
            submissions,
            results,
            checker,
            event_bus,
            iteration_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn checker(&self) -> &ConsistencyChecker {
        &self.checker
    }

    async fn iteration_lock(&self, iteration: Iteration) -> Arc<Mutex<()>> {
        let mut locks = self.iteration_locks.lock().await;
        Arc::clone(locks.entry(iteration).or_default())
    }

    /// Drop the lock entry once no other run holds or awaits it
    async fn release_iteration_lock(&self, iteration: Iteration, lock: Arc<Mutex<()>>) {
        let mut locks = self.iteration_locks.lock().await;
        // One reference in the map, one held here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&iteration);
        }
    }

    /// Recompute and persist the weights of one iteration
    ///
    /// Returns `Ok(None)` when the iteration has no submissions; any stored
    /// result for it is deleted. A store failure aborts the run before the
    /// result store is touched, leaving the previous result in place.
    pub async fn compute_iteration(&self, iteration: Iteration) -> Result<Option<IterationComputation>> {
        let lock = self.iteration_lock(iteration).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.compute_locked(iteration).await
        };
        self.release_iteration_lock(iteration, lock).await;
        outcome
    }

    async fn compute_locked(&self, iteration: Iteration) -> Result<Option<IterationComputation>> {
        let indicators = self.catalog.list_indicators().await?;
        let groups = partition_indicators(&indicators);

        let submissions = self.submissions.find_by_iteration(iteration).await?;
        if submissions.is_empty() {
            let removed = self.results.delete_by_iteration(iteration).await?;
            info!(iteration, removed, "No submissions for iteration; result cleared");
            if removed {
                self.event_bus.emit_lossy(AhpEvent::ResultCleared {
                    iteration,
                    timestamp: Utc::now(),
                });
            }
            return Ok(None);
        }

        let mut weights = WeightMap::new();
        let mut computed = Vec::with_capacity(groups.len());
        for (category, keys) in &groups {
            let group = compute_group(*category, keys, &submissions, &self.checker)?;
            debug!(
                iteration,
                %category,
                dimension = group.keys.len(),
                respondents = submissions.len(),
                ratio = group.consistency.ratio,
                "Group aggregated"
            );
            if !group.consistency.is_acceptable() {
                warn!(
                    iteration,
                    %category,
                    ratio = group.consistency.ratio,
                    threshold = group.consistency.threshold,
                    "Aggregated judgments are inconsistent"
                );
            }
            weights.extend(group.keys.iter().cloned().zip(group.weights.iter().copied()));
            computed.push(group);
        }

        self.results.upsert(iteration, weights.clone()).await?;
        info!(
            iteration,
            respondents = submissions.len(),
            indicators = weights.len(),
            "AHP weights computed"
        );
        self.event_bus.emit_lossy(AhpEvent::ResultComputed {
            iteration,
            respondent_count: submissions.len(),
            timestamp: Utc::now(),
        });

        Ok(Some(IterationComputation {
            iteration,
            respondent_count: submissions.len(),
            weights,
            groups: computed,
        }))
    }

    /// Recompute every iteration that has submissions, in ascending order
    ///
    /// Returns only the last computed payload. Use [`Self::compute_all_detailed`]
    /// to get every iteration's payload.
    pub async fn compute_all(&self) -> Result<Option<IterationComputation>> {
        Ok(self.compute_all_detailed().await?.pop())
    }

    /// Recompute every iteration that has submissions; one payload each
    pub async fn compute_all_detailed(&self) -> Result<Vec<IterationComputation>> {
        let mut iterations = self.submissions.distinct_iterations().await?;
        iterations.sort_unstable();
        iterations.dedup();

        let mut computed = Vec::with_capacity(iterations.len());
        for iteration in iterations {
            if let Some(payload) = self.compute_iteration(iteration).await? {
                computed.push(payload);
            }
        }
        Ok(computed)
    }
}
