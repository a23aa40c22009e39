//! Saaty Consistency Ratio
//!
//! CR above the configured threshold (0.1 by convention) marks a judgment
//! matrix as inconsistent. The checker only reports; it never rejects input.

use super::Matrix;
use ahp_common::config::DEFAULT_CONSISTENCY_THRESHOLD;
use ahp_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Saaty Random Index for N = 1..=10
pub const RANDOM_INDEX: [f64; 10] = [0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49];

/// Approximation used for N > 10
pub const RANDOM_INDEX_FALLBACK: f64 = 1.49;

/// Random Index for an N×N matrix
pub fn random_index(n: usize) -> f64 {
    match n {
        0 => 0.0,
        n => RANDOM_INDEX.get(n - 1).copied().unwrap_or(RANDOM_INDEX_FALLBACK),
    }
}

/// Full breakdown of one consistency check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub dimension: usize,
    /// Principal eigenvalue estimate
    pub lambda_max: f64,
    pub consistency_index: f64,
    pub random_index: f64,
    /// Non-negative; 0 means perfectly consistent
    pub ratio: f64,
    pub threshold: f64,
}

impl ConsistencyReport {
    /// Report for matrices too small to hold a three-way cycle
    fn trivially_consistent(dimension: usize, threshold: f64) -> Self {
        Self {
            dimension,
            lambda_max: dimension as f64,
            consistency_index: 0.0,
            random_index: random_index(dimension),
            ratio: 0.0,
            threshold,
        }
    }

    /// CR at or below the threshold
    pub fn is_acceptable(&self) -> bool {
        self.ratio <= self.threshold
    }
}

/// Consistency checker with a configurable acceptance threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsistencyChecker {
    threshold: f64,
}

impl Default for ConsistencyChecker {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONSISTENCY_THRESHOLD,
        }
    }
}

impl ConsistencyChecker {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compute the CR of `matrix` given its derived `weights`
    ///
    /// 1. N < 3 → CR = 0
    /// 2. `ws[i] = Σ_j m[i][j] * w[j]`
    /// 3. `λmax = (1/N) Σ_i ws[i] / w[i]`
    /// 4. `CI = (λmax − N) / (N − 1)`
    /// 5. `CR = CI / RI(N)`
    ///
    /// Rows whose weight is not a positive finite number contribute nothing to
    /// the λmax sum, which is still divided by N. Rounding noise that would make CR negative (or a
    /// degenerate matrix that would make it non-finite) reports 0.
    pub fn check(&self, matrix: &Matrix, weights: &[f64]) -> Result<ConsistencyReport> {
        let n = matrix.len();
        if weights.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: weights.len(),
            });
        }
        if n < 3 {
            return Ok(ConsistencyReport::trivially_consistent(n, self.threshold));
        }

        let mut quotient_sum = 0.0;
        let mut counted = 0usize;
        for (row, &w) in matrix.iter().zip(weights) {
            if row.len() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    found: row.len(),
                });
            }
            if !(w.is_finite() && w > 0.0) {
                continue;
            }
            let weighted_sum: f64 = row.iter().zip(weights).map(|(m, w)| m * w).sum();
            quotient_sum += weighted_sum / w;
            counted += 1;
        }
        if counted == 0 {
            return Ok(ConsistencyReport::trivially_consistent(n, self.threshold));
        }

        let lambda_max = quotient_sum / n as f64;
        let consistency_index = (lambda_max - n as f64) / (n as f64 - 1.0);
        let ri = random_index(n);
        let raw_ratio = consistency_index / ri;
        let ratio = if raw_ratio.is_finite() { raw_ratio.max(0.0) } else { 0.0 };

        Ok(ConsistencyReport {
            dimension: n,
            lambda_max,
            consistency_index,
            random_index: ri,
            ratio,
            threshold: self.threshold,
        })
    }

    /// Shortcut returning only the ratio
    pub fn ratio(&self, matrix: &Matrix, weights: &[f64]) -> Result<f64> {
        Ok(self.check(matrix, weights)?.ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ahp::derive_weights;

    fn report(matrix: &Matrix) -> ConsistencyReport {
        let (_, weights) = derive_weights(matrix);
        ConsistencyChecker::default().check(matrix, &weights).unwrap()
    }

    #[test]
    fn test_random_index_table() {
        assert_eq!(random_index(0), 0.0);
        assert_eq!(random_index(1), 0.0);
        assert_eq!(random_index(2), 0.0);
        assert_eq!(random_index(3), 0.58);
        assert_eq!(random_index(10), 1.49);
        assert_eq!(random_index(11), RANDOM_INDEX_FALLBACK);
        assert_eq!(random_index(40), RANDOM_INDEX_FALLBACK);
    }

    #[test]
    fn test_small_matrices_are_always_consistent() {
        let checker = ConsistencyChecker::default();
        assert_eq!(checker.ratio(&Vec::new(), &[]).unwrap(), 0.0);
        assert_eq!(checker.ratio(&vec![vec![1.0]], &[1.0]).unwrap(), 0.0);
        // Arbitrary (even non-reciprocal) 2×2 content
        let m = vec![vec![1.0, 9.0], vec![3.0, 1.0]];
        assert_eq!(checker.ratio(&m, &[0.9, 0.1]).unwrap(), 0.0);
    }

    #[test]
    fn test_consistent_matrix_has_zero_ratio() {
        let m = vec![
            vec![1.0, 2.0, 4.0],
            vec![0.5, 1.0, 2.0],
            vec![0.25, 0.5, 1.0],
        ];
        let r = report(&m);
        assert!(r.ratio < 1e-9);
        assert!((r.lambda_max - 3.0).abs() < 1e-9);
        assert!(r.is_acceptable());
    }

    #[test]
    fn test_inconsistent_matrix_is_flagged() {
        // A > B, B > C, but C >> A
        let m = vec![
            vec![1.0, 5.0, 1.0 / 7.0],
            vec![0.2, 1.0, 5.0],
            vec![7.0, 0.2, 1.0],
        ];
        let r = report(&m);
        assert!(r.ratio > 0.1, "ratio was {}", r.ratio);
        assert!(!r.is_acceptable());
        assert_eq!(r.random_index, 0.58);
    }

    #[test]
    fn test_ratio_matches_hand_computation() {
        let m = vec![
            vec![1.0, 3.0, 0.5],
            vec![1.0 / 3.0, 1.0, 0.25],
            vec![2.0, 4.0, 1.0],
        ];
        let (_, w) = derive_weights(&m);
        let ws: Vec<f64> = (0..3)
            .map(|i| (0..3).map(|j| m[i][j] * w[j]).sum())
            .collect();
        let lambda = (0..3).map(|i| ws[i] / w[i]).sum::<f64>() / 3.0;
        let expected = ((lambda - 3.0) / 2.0 / 0.58).max(0.0);

        let r = report(&m);
        assert!((r.ratio - expected).abs() < 1e-12);
    }

    #[test]
    fn test_weight_length_mismatch() {
        let m = vec![vec![1.0; 3]; 3];
        let err = ConsistencyChecker::default().check(&m, &[0.5, 0.5]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, found: 2 }));
    }

    #[test]
    fn test_lambda_max_averages_over_dimension() {
        // Third row has no usable weight: sum = 2 + 2, divided by N = 3
        let m = vec![vec![1.0; 3]; 3];
        let r = ConsistencyChecker::default().check(&m, &[0.5, 0.5, 0.0]).unwrap();
        assert!((r.lambda_max - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(r.ratio, 0.0);
    }

    #[test]
    fn test_ratio_is_never_negative() {
        let m = vec![vec![1.0; 4]; 4];
        assert!(report(&m).ratio >= 0.0);
    }

    #[test]
    fn test_custom_threshold() {
        let m = vec![
            vec![1.0, 5.0, 1.0 / 7.0],
            vec![0.2, 1.0, 5.0],
            vec![7.0, 0.2, 1.0],
        ];
        let (_, w) = derive_weights(&m);
        let lenient = ConsistencyChecker::new(100.0).check(&m, &w).unwrap();
        assert!(lenient.is_acceptable());
        assert_eq!(lenient.threshold, 100.0);
    }
}
