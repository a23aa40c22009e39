//! Consensus matrix across respondents

use super::Matrix;
use ahp_common::{Error, Result};

/// Element-wise arithmetic mean of equal-dimension matrices
///
/// An empty input yields an empty matrix ("no data for this group"); a
/// matrix whose size differs from the first one is a `DimensionMismatch`.
pub fn mean_matrix(matrices: &[Matrix]) -> Result<Matrix> {
    let Some(first) = matrices.first() else {
        return Ok(Vec::new());
    };
    let n = first.len();

    let mut sum = vec![vec![0.0; n]; n];
    for matrix in matrices {
        if matrix.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: matrix.len(),
            });
        }
        for (acc_row, row) in sum.iter_mut().zip(matrix) {
            if row.len() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    found: row.len(),
                });
            }
            for (acc, value) in acc_row.iter_mut().zip(row) {
                *acc += value;
            }
        }
    }

    let count = matrices.len() as f64;
    for row in sum.iter_mut() {
        for value in row.iter_mut() {
            *value /= count;
        }
    }
    Ok(sum)
}
