//! Analytic Hierarchy Process math
//!
//! Pure functions of (ordered keys, judgments). Nothing in here knows how
//! many indicators exist or what they are called; callers always pass the
//! current key list explicitly.
//!
//! Pipeline per group: [`adjust_value`] → [`build_pairwise_matrix`] →
//! [`mean_matrix`] → [`normalize_matrix`] → [`priority_weights`] →
//! [`ConsistencyChecker::check`].

pub mod adjust;
pub mod aggregate;
pub mod assess;
pub mod builder;
pub mod consistency;
pub mod weights;

pub use adjust::{
    adjust_value, clamp_to_scale, judgments_from_pairs, split_pair_key, SCALE_MAX, SCALE_MIN,
};
pub use aggregate::mean_matrix;
pub use assess::{assess_group, GroupAssessment};
pub use builder::{build_pairwise_matrix, filter_judgments};
pub use consistency::{random_index, ConsistencyChecker, ConsistencyReport};
pub use weights::{derive_weights, normalize_matrix, priority_weights};

/// Square matrix stored row-major as nested vectors
pub type Matrix = Vec<Vec<f64>>;
