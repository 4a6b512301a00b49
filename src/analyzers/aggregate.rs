use std::collections::BTreeMap;

use tracing::debug;

use crate::analyzers::types::{GroupKey, GroupValue, Metric};
use crate::analyzers::utility::partition;
use crate::dataset::{DimensionRef, Response, ResponseSet};
use crate::error::AnalysisError;

/// Metric value per partition.
pub type Aggregation = BTreeMap<GroupKey, i64>;

/// Resolves a dimension name against the set's schema.
pub fn resolve_dimension(set: &ResponseSet<'_>, name: &str) -> Result<DimensionRef, AnalysisError> {
    set.schema()
        .dimension(name)
        .ok_or_else(|| AnalysisError::UnknownDimension(name.to_string()))
}

fn value(response: &Response, dimension: DimensionRef) -> GroupValue {
    GroupValue::from(response.dimension(dimension))
}

/// Partitions `set` by one dimension, or by the pair `primary` × `secondary`,
/// and reduces every partition with `metric`.
///
/// Only combinations present in the data produce a partition. Blank values
/// share one [`GroupValue::Blank`] partition, so counts always sum to the
/// size of the set. A `secondary` equal to `primary` is treated as unset.
pub fn aggregate(
    set: &ResponseSet<'_>,
    primary: &str,
    secondary: Option<&str>,
    metric: Metric,
) -> Result<Aggregation, AnalysisError> {
    let first = resolve_dimension(set, primary)?;
    let second = match secondary.filter(|s| *s != primary) {
        Some(name) => Some(resolve_dimension(set, name)?),
        None => None,
    };

    let groups = partition(set.iter(), |r| GroupKey {
        primary: value(r, first),
        secondary: second.map(|d| value(r, d)),
    });

    let result: Aggregation = groups
        .into_iter()
        .map(|(key, members)| (key, metric.evaluate(&members)))
        .collect();

    debug!(
        primary,
        secondary = secondary.unwrap_or(""),
        ?metric,
        groups = result.len(),
        "Grouped aggregation computed"
    );
    Ok(result)
}
