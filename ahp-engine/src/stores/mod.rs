//! External collaborators of the aggregation core
//!
//! The orchestrator only ever reads the catalog and submissions and writes
//! results. Mutation paths (indicator CRUD, submission insert/delete) live in
//! the `*Registry` / `*Repository` extension traits used by the services.

use ahp_common::models::AhpResult;
use ahp_common::{Indicator, Iteration, Result, Submission, WeightMap};
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;

pub use memory::{AtomicIterationCounter, InMemoryCatalog, InMemoryResults, InMemorySubmissions};

/// Read-only view of the indicator catalog
#[async_trait]
pub trait IndicatorCatalog: Send + Sync {
    /// All indicators in catalog order
    async fn list_indicators(&self) -> Result<Vec<Indicator>>;
}

/// Catalog with admin mutations
///
/// Names are unique: inserting or renaming onto an existing name is a
/// `Conflict`; an unknown id is `NotFound`.
#[async_trait]
pub trait IndicatorRegistry: IndicatorCatalog {
    async fn insert_indicator(&self, indicator: Indicator) -> Result<Indicator>;
    async fn update_indicator(&self, indicator: Indicator) -> Result<Indicator>;
    async fn remove_indicator(&self, id: Uuid) -> Result<Indicator>;
}

/// Read-only view of respondent submissions
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn find_by_iteration(&self, iteration: Iteration) -> Result<Vec<Submission>>;

    /// Every iteration value that has at least one submission
    async fn distinct_iterations(&self) -> Result<Vec<Iteration>>;

    async fn list_submissions(&self) -> Result<Vec<Submission>>;
}

/// Submission store with insert/delete
#[async_trait]
pub trait SubmissionRepository: SubmissionStore {
    async fn insert_submission(&self, submission: Submission) -> Result<()>;

    /// Returns the removed submission, `None` if the id was unknown
    async fn delete_submission(&self, id: Uuid) -> Result<Option<Submission>>;
}

/// Derived weights, one document per iteration
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Create or overwrite the result for `iteration` in one step
    async fn upsert(&self, iteration: Iteration, weights: WeightMap) -> Result<AhpResult>;

    /// Returns whether a result existed
    async fn delete_by_iteration(&self, iteration: Iteration) -> Result<bool>;

    async fn get(&self, iteration: Iteration) -> Result<Option<AhpResult>>;

    /// All results ordered by iteration
    async fn list(&self) -> Result<Vec<AhpResult>>;
}

/// Monotonic version id shared by the catalog and submission paths
///
/// `increment` must be atomic with respect to concurrent callers.
#[async_trait]
pub trait IterationCounter: Send + Sync {
    async fn current(&self) -> Result<Iteration>;
    async fn increment(&self) -> Result<Iteration>;
    async fn set(&self, value: Iteration) -> Result<Iteration>;
}
