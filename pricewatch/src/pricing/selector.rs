//! Disambiguation among several price candidates.

use tracing::debug;

use super::PriceCandidate;

/// Chooses one price out of many raw matches.
///
/// Candidates are deduplicated by value, keeping the first occurrence. Two
/// distinct values resolve to the lower one (selling price over list price);
/// three resolve to the middle one. Larger sets drop values outside
/// `[0.1 × median, 10 × median]` and return the lowest survivor, preferring
/// candidates whose source key names a price field.
#[must_use]
pub fn select_price(candidates: &[PriceCandidate]) -> Option<f64> {
    let unique = dedup_by_value(candidates);

    let mut values: Vec<f64> = unique.iter().map(|c| c.value).collect();
    values.sort_by(f64::total_cmp);

    match values.len() {
        0 => None,
        1 | 2 => values.first().copied(),
        3 => values.get(1).copied(),
        _ => {
            let median = median(&values);
            let survivors: Vec<&PriceCandidate> = unique
                .iter()
                .copied()
                .filter(|c| (0.1 * median..=10.0 * median).contains(&c.value))
                .collect();

            debug!(
                candidates = values.len(),
                survivors = survivors.len(),
                median,
                "Filtered price outliers"
            );

            let keyed = lowest(survivors.iter().filter(|c| c.has_price_key()).map(|c| c.value));
            keyed
                .or_else(|| lowest(survivors.iter().map(|c| c.value)))
                .or_else(|| values.first().copied())
        }
    }
}

fn dedup_by_value(candidates: &[PriceCandidate]) -> Vec<&PriceCandidate> {
    let mut unique: Vec<&PriceCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.iter().any(|seen| seen.value == candidate.value) {
            unique.push(candidate);
        }
    }
    unique
}

/// Median of sorted, non-empty values; even counts average the middle pair.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn lowest(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::StrategyKind;

    fn candidates(values: &[f64]) -> Vec<PriceCandidate> {
        values
            .iter()
            .map(|v| PriceCandidate::new(*v, StrategyKind::AggressiveRegex, v.to_string()))
            .collect()
    }

    #[test]
    fn test_small_sets() {
        assert_eq!(select_price(&[]), None);
        assert_eq!(select_price(&candidates(&[499.0])), Some(499.0));
        assert_eq!(select_price(&candidates(&[500.0, 100.0])), Some(100.0));
        assert_eq!(select_price(&candidates(&[500.0, 100.0, 300.0])), Some(300.0));
    }

    #[test]
    fn test_duplicates_collapse() {
        // Two distinct values after dedup.
        assert_eq!(select_price(&candidates(&[500.0, 500.0, 100.0, 100.0])), Some(100.0));
        // Three distinct values after dedup.
        assert_eq!(
            select_price(&candidates(&[100.0, 500.0, 300.0, 300.0, 500.0])),
            Some(300.0)
        );
    }

    #[test]
    fn test_outlier_is_dropped() {
        // Median 25 excludes 5000; lowest survivor is 10.
        assert_eq!(select_price(&candidates(&[10.0, 20.0, 30.0, 5000.0])), Some(10.0));
        // A tiny outlier is dropped too.
        assert_eq!(
            select_price(&candidates(&[1.0, 900.0, 1000.0, 1100.0, 1200.0])),
            Some(900.0)
        );
    }

    #[test]
    fn test_price_keyed_candidates_preferred() {
        let mut set = candidates(&[800.0, 1000.0, 1200.0]);
        set.push(
            PriceCandidate::new(1100.0, StrategyKind::AggressiveRegex, "1100")
                .with_source_key("json_sellingPrice"),
        );

        assert_eq!(select_price(&set), Some(1100.0));
    }

    #[test]
    fn test_deterministic_under_reordering() {
        let forward = candidates(&[10.0, 20.0, 30.0, 5000.0, 40.0]);
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(select_price(&forward), select_price(&backward));
    }
}
