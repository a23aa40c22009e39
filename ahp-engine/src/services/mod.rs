//! Engine services
//!
//! - [`AggregationOrchestrator`]: computes and persists per-iteration weights
//! - [`CatalogService`]: indicator CRUD, advances the iteration counter
//! - [`SubmissionService`]: CR preview, submit, delete (recomputes)

pub mod aggregation;
pub mod catalog;
pub mod submission;

pub use aggregation::{
    compute_group, partition_indicators, AggregationOrchestrator, GroupComputation,
    IterationComputation,
};
pub use catalog::CatalogService;
pub use submission::{ConsistencyPreview, SubmissionDraft, SubmissionReceipt, SubmissionService};
