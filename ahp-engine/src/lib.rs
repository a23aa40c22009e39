//! ahp-engine library - AHP weight aggregation
//!
//! Builds reciprocal pairwise matrices from respondent judgments, averages
//! them per indicator group and iteration, and derives priority weights with
//! a Saaty consistency check.

use ahp_common::config::EngineConfig;
use ahp_common::events::EventBus;
use ahp_common::Result;
use std::sync::Arc;

pub mod ahp;
pub mod services;
pub mod snapshot;
pub mod stores;

use ahp::ConsistencyChecker;
use services::{AggregationOrchestrator, CatalogService, SubmissionService};
use snapshot::Snapshot;
use stores::{AtomicIterationCounter, InMemoryCatalog, InMemoryResults, InMemorySubmissions, ResultStore};

/// Stores and services wired together
#[derive(Clone)]
pub struct EngineState {
    pub results: Arc<dyn ResultStore>,
    pub orchestrator: Arc<AggregationOrchestrator>,
    pub catalog: Arc<CatalogService>,
    pub submissions: Arc<SubmissionService>,
    pub event_bus: EventBus,
}

impl EngineState {
    /// Empty in-memory engine
    pub fn in_memory(config: &EngineConfig) -> Self {
        Self::wire(
            InMemoryCatalog::new(),
            InMemorySubmissions::new(),
            AtomicIterationCounter::new(0),
            config,
        )
    }

    /// In-memory engine seeded from a snapshot
    pub fn from_snapshot(snapshot: Snapshot, config: &EngineConfig) -> Result<Self> {
        Ok(Self::wire(
            InMemoryCatalog::with_indicators(snapshot.indicators)?,
            InMemorySubmissions::with_submissions(snapshot.submissions),
            AtomicIterationCounter::new(snapshot.iteration),
            config,
        ))
    }

    fn wire(
        catalog: InMemoryCatalog,
        submissions: InMemorySubmissions,
        counter: AtomicIterationCounter,
        config: &EngineConfig,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let submissions = Arc::new(submissions);
        let counter = Arc::new(counter);
        let results = Arc::new(InMemoryResults::new());
        let event_bus = EventBus::new(config.event_capacity);

        let orchestrator = Arc::new(AggregationOrchestrator::new(
            catalog.clone(),
            submissions.clone(),
            results.clone(),
            ConsistencyChecker::new(config.consistency_threshold),
            event_bus.clone(),
        ));
        let catalog_service = CatalogService::new(catalog.clone(), counter.clone(), event_bus.clone());
        let submission_service = SubmissionService::new(
            catalog,
            submissions,
            counter,
            orchestrator.clone(),
            event_bus.clone(),
        );

        Self {
            results,
            orchestrator,
            catalog: Arc::new(catalog_service),
            submissions: Arc::new(submission_service),
            event_bus,
        }
    }
}
