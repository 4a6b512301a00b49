use std::collections::BTreeMap;

use crate::dataset::Response;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of the present values, skipping `None`. Returns `None` when nothing
/// is present.
pub fn mean_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(mean(&present))
    }
}

/// Splits responses into partitions keyed by `key`, keeping source order
/// inside each partition. Only keys that actually occur get a partition.
pub fn partition<'a, K: Ord>(
    responses: impl IntoIterator<Item = &'a Response>,
    key: impl Fn(&Response) -> K,
) -> BTreeMap<K, Vec<&'a Response>> {
    let mut groups: BTreeMap<K, Vec<&'a Response>> = BTreeMap::new();
    for response in responses {
        groups.entry(key(response)).or_default().push(response);
    }
    groups
}
