//! Single-respondent assessment of one indicator group
//!
//! The live preview and the value stored at submission time both go through
//! [`assess_group`], so the two can never diverge.

use super::{build_pairwise_matrix, derive_weights, ConsistencyChecker, ConsistencyReport, Matrix};
use ahp_common::{Judgment, Result};
use serde::Serialize;

/// Matrix, weights and CR for one respondent and one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAssessment {
    pub keys: Vec<String>,
    pub matrix: Matrix,
    pub weights: Vec<f64>,
    pub report: ConsistencyReport,
}

/// Build, weigh and check one group from already-adjusted judgments
pub fn assess_group(
    keys: &[String],
    judgments: &[Judgment],
    checker: &ConsistencyChecker,
) -> Result<GroupAssessment> {
    let matrix = build_pairwise_matrix(keys, judgments);
    let (_, weights) = derive_weights(&matrix);
    let report = checker.check(&matrix, &weights)?;
    Ok(GroupAssessment {
        keys: keys.to_vec(),
        matrix,
        weights,
        report,
    })
}
