use chrono::Datelike;

use crate::analyzers::types::{Metric, TrendPoint};
use crate::analyzers::utility::partition;
use crate::dataset::ResponseSet;

/// Buckets responses by calendar month and reduces each bucket with `metric`.
///
/// Buckets are ordered chronologically; months without responses are not
/// emitted.
pub fn trend(set: &ResponseSet<'_>, metric: Metric) -> Vec<TrendPoint> {
    partition(set.iter(), |r| (r.timestamp().year(), r.timestamp().month()))
        .into_iter()
        .map(|((year, month), members)| TrendPoint {
            month: format!("{year:04}-{month:02}"),
            value: metric.evaluate(&members),
        })
        .collect()
}
