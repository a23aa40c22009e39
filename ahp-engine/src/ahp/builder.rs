//! Reciprocal pairwise comparison matrix construction

use super::adjust::clamp_to_scale;
use super::Matrix;
use ahp_common::Judgment;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Keep only judgments whose both items are in `keys`
///
/// Judgments naming indicators outside the current catalog are dropped
/// silently; the catalog may have changed since the answers were given.
pub fn filter_judgments<'a>(judgments: &'a [Judgment], keys: &HashSet<&str>) -> Vec<&'a Judgment> {
    judgments.iter().filter(|j| j.within(keys)).collect()
}

/// Build the N×N reciprocal matrix for `keys` from sparse judgments
///
/// - diagonal is 1, `m[j][i] = 1 / m[i][j]`
/// - for `i < j` the forward judgment `(key_i, key_j)` wins; the reverse
///   `(key_j, key_i)` is only used (inverted) when the forward one is absent
/// - missing pairs default to 1
/// - non-finite or non-positive values are replaced by 1
/// - other values are clamped to the Saaty scale `[1/9, 9]`
/// - judgments naming keys outside `keys` are ignored
///
/// Returns an empty matrix when `keys` is empty.
pub fn build_pairwise_matrix<'a, I>(keys: &[String], judgments: I) -> Matrix
where
    I: IntoIterator<Item = &'a Judgment>,
{
    let n = keys.len();
    if n == 0 {
        return Vec::new();
    }

    let index: HashMap<&str, usize> = keys
        .iter()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect();

    // Directional lookup; a repeated pair keeps its last value
    let mut lookup: HashMap<(usize, usize), f64> = HashMap::new();
    for judgment in judgments {
        let (Some(&a), Some(&b)) = (
            index.get(judgment.item_a.as_str()),
            index.get(judgment.item_b.as_str()),
        ) else {
            continue;
        };
        if a != b {
            lookup.insert((a, b), judgment.value);
        }
    }

    let mut matrix = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let value = match (lookup.get(&(i, j)), lookup.get(&(j, i))) {
                (Some(&forward), _) => sanitize(forward),
                (None, Some(&reverse)) => 1.0 / sanitize(reverse),
                (None, None) => 1.0,
            };
            matrix[i][j] = value;
            matrix[j][i] = 1.0 / value;
        }
    }

    matrix
}

/// Replace values that cannot be a ratio of importance with 1
fn sanitize(value: f64) -> f64 {
    if !(value.is_finite() && value > 0.0) {
        warn!("Coercing invalid comparison value {} to 1", value);
        return 1.0;
    }
    let bounded = clamp_to_scale(value);
    if bounded != value {
        warn!("Clamping comparison value {} to {}", value, bounded);
    }
    bounded
}
