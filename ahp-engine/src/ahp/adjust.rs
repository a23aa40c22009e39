//! Slider value coercion and pair-key parsing
//!
//! Every raw comparison value passes through [`adjust_value`] exactly once,
//! whether it is used for a live CR preview or stored with a submission.

use ahp_common::Judgment;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Strongest preference on the Saaty scale
pub const SCALE_MAX: f64 = 9.0;

/// Reciprocal of [`SCALE_MAX`]
pub const SCALE_MIN: f64 = 1.0 / SCALE_MAX;

/// Bound a positive ratio to `[SCALE_MIN, SCALE_MAX]`
///
/// Keeps every matrix entry and its reciprocal small enough that sums over
/// any number of respondents stay finite.
pub fn clamp_to_scale(value: f64) -> f64 {
    value.clamp(SCALE_MIN, SCALE_MAX)
}

/// Force a raw slider value onto the reciprocal-consistent basis
///
/// - non-finite, `0` and `-1` are neutral (`1`)
/// - other negatives are taken by absolute value
/// - values above `1` are folded to their reciprocal
/// - the result is clamped to the Saaty scale
///
/// # Examples
/// ```
/// use ahp_engine::ahp::adjust_value;
///
/// assert_eq!(adjust_value(4.0), 0.25);
/// assert_eq!(adjust_value(0.0), 1.0);
/// assert_eq!(adjust_value(-1.0), 1.0);
/// assert_eq!(adjust_value(-3.0), 3.0);
/// assert_eq!(adjust_value(1e308), 1.0 / 9.0);
/// ```
pub fn adjust_value(raw: f64) -> f64 {
    if !raw.is_finite() || raw == 0.0 || raw == -1.0 {
        return 1.0;
    }
    let value = if raw < 0.0 {
        raw.abs()
    } else if raw > 1.0 {
        1.0 / raw
    } else {
        raw
    };
    clamp_to_scale(value)
}

/// Split `"<itemA>_<itemB>"` into its two indicator names
///
/// Names may themselves contain `_`, so the split point whose halves are both
/// in `known` wins. Without such a split the first `_` is used. Returns
/// `None` when the key holds no separator or either half is empty.
pub fn split_pair_key<'a>(key: &'a str, known: &HashSet<&str>) -> Option<(&'a str, &'a str)> {
    let mut first = None;
    for (pos, _) in key.match_indices('_') {
        let (a, b) = (&key[..pos], &key[pos + 1..]);
        if a.is_empty() || b.is_empty() {
            continue;
        }
        if known.contains(a) && known.contains(b) {
            return Some((a, b));
        }
        first.get_or_insert((a, b));
    }
    first
}

/// Turn a flat pair-key map into adjusted judgments
pub fn judgments_from_pairs(pairs: &BTreeMap<String, f64>, known: &HashSet<&str>) -> Vec<Judgment> {
    pairs
        .iter()
        .filter_map(|(key, &raw)| match split_pair_key(key, known) {
            Some((a, b)) => Some(Judgment::new(a, b, adjust_value(raw))),
            None => {
                debug!("Dropping comparison with unparseable key '{}'", key);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_neutral_values() {
        assert_eq!(adjust_value(0.0), 1.0);
        assert_eq!(adjust_value(-1.0), 1.0);
        assert_eq!(adjust_value(f64::NAN), 1.0);
        assert_eq!(adjust_value(f64::INFINITY), 1.0);
        assert_eq!(adjust_value(f64::NEG_INFINITY), 1.0);
    }

    #[test]
    fn test_adjust_folds_large_values_into_unit_interval() {
        for v in [1.0000001, 2.0, 3.0, 9.0, 1e6, f64::MAX] {
            let adjusted = adjust_value(v);
            assert!(adjusted > 0.0 && adjusted <= 1.0, "{} -> {}", v, adjusted);
        }
        assert_eq!(adjust_value(5.0), 0.2);
    }

    #[test]
    fn test_adjust_negative_takes_absolute_value() {
        assert_eq!(adjust_value(-0.5), 0.5);
        assert_eq!(adjust_value(-7.0), 7.0);
    }

    #[test]
    fn test_adjust_clamps_extreme_magnitudes() {
        assert_eq!(adjust_value(1e308), SCALE_MIN);
        assert_eq!(adjust_value(f64::MAX), SCALE_MIN);
        assert_eq!(adjust_value(1e-300), SCALE_MIN);
        assert_eq!(adjust_value(-1e300), SCALE_MAX);
        assert_eq!(adjust_value(-f64::MIN_POSITIVE), SCALE_MIN);
    }

    #[test]
    fn test_adjust_keeps_values_in_unit_interval() {
        assert_eq!(adjust_value(1.0), 1.0);
        assert_eq!(adjust_value(0.25), 0.25);
    }

    #[test]
    fn test_split_simple_key() {
        let known: HashSet<&str> = ["A", "B"].into_iter().collect();
        assert_eq!(split_pair_key("A_B", &known), Some(("A", "B")));
    }

    #[test]
    fn test_split_prefers_known_names_with_underscores() {
        let known: HashSet<&str> = ["net_income", "jobs"].into_iter().collect();
        assert_eq!(
            split_pair_key("net_income_jobs", &known),
            Some(("net_income", "jobs"))
        );
    }

    #[test]
    fn test_split_falls_back_to_first_separator() {
        let known: HashSet<&str> = HashSet::new();
        assert_eq!(split_pair_key("X_Y_Z", &known), Some(("X", "Y_Z")));
    }

    #[test]
    fn test_split_rejects_keys_without_separator() {
        let known: HashSet<&str> = HashSet::new();
        assert_eq!(split_pair_key("AB", &known), None);
        assert_eq!(split_pair_key("_B", &known), None);
        assert_eq!(split_pair_key("A_", &known), None);
    }

    #[test]
    fn test_judgments_from_pairs_adjusts_values() {
        let known: HashSet<&str> = ["A", "B", "C"].into_iter().collect();
        let mut pairs = BTreeMap::new();
        pairs.insert("A_B".to_string(), 3.0);
        pairs.insert("A_C".to_string(), 0.0);
        pairs.insert("garbage".to_string(), 2.0);

        let judgments = judgments_from_pairs(&pairs, &known);
        assert_eq!(judgments.len(), 2);
        assert_eq!(judgments[0], Judgment::new("A", "B", 1.0 / 3.0));
        assert_eq!(judgments[1], Judgment::new("A", "C", 1.0));
    }
}
