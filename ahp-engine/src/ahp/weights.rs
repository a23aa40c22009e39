//! Column normalization and priority weight extraction

use super::Matrix;

/// Divide every entry by its column sum
///
/// A zero column sum divides by 1 instead, leaving that column unchanged.
pub fn normalize_matrix(matrix: &Matrix) -> Matrix {
    let n = matrix.len();
    if n == 0 {
        return Vec::new();
    }

    let mut column_sums = vec![0.0; n];
    for row in matrix {
        for (sum, value) in column_sums.iter_mut().zip(row) {
            *sum += value;
        }
    }

    matrix
        .iter()
        .map(|row| {
            row.iter()
                .zip(&column_sums)
                .map(|(value, &sum)| if sum == 0.0 { *value } else { value / sum })
                .collect()
        })
        .collect()
}

/// Row means of a normalized matrix
///
/// Sums to 1 whenever every column sum of the source matrix was nonzero.
pub fn priority_weights(normalized: &Matrix) -> Vec<f64> {
    let n = normalized.len();
    if n == 0 {
        return Vec::new();
    }
    normalized
        .iter()
        .map(|row| row.iter().sum::<f64>() / n as f64)
        .collect()
}

/// Normalize then extract weights; returns `(normalized, weights)`
pub fn derive_weights(matrix: &Matrix) -> (Matrix, Vec<f64>) {
    let normalized = normalize_matrix(matrix);
    let weights = priority_weights(&normalized);
    (normalized, weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matrix() {
        let (normalized, weights) = derive_weights(&Vec::new());
        assert!(normalized.is_empty());
        assert!(weights.is_empty());
    }

    #[test]
    fn test_columns_sum_to_one_after_normalization() {
        let m = vec![
            vec![1.0, 2.0, 4.0],
            vec![0.5, 1.0, 2.0],
            vec![0.25, 0.5, 1.0],
        ];
        let normalized = normalize_matrix(&m);
        for j in 0..3 {
            let sum: f64 = normalized.iter().map(|row| row[j]).sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_consistent_matrix_weights() {
        // Perfectly consistent: weights proportional to 4:2:1
        let m = vec![
            vec![1.0, 2.0, 4.0],
            vec![0.5, 1.0, 2.0],
            vec![0.25, 0.5, 1.0],
        ];
        let (_, weights) = derive_weights(&m);
        assert!((weights[0] - 4.0 / 7.0).abs() < 1e-12);
        assert!((weights[1] - 2.0 / 7.0).abs() < 1e-12);
        assert!((weights[2] - 1.0 / 7.0).abs() < 1e-12);
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_column_left_unchanged() {
        let m = vec![vec![1.0, 0.0], vec![3.0, 0.0]];
        let normalized = normalize_matrix(&m);
        assert_eq!(normalized, vec![vec![0.25, 0.0], vec![0.75, 0.0]]);
        assert!(normalized.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_all_ones_gives_uniform_weights() {
        let m = vec![vec![1.0; 5]; 5];
        let (_, weights) = derive_weights(&m);
        assert!(weights.iter().all(|w| (w - 0.2).abs() < 1e-12));
    }
}
