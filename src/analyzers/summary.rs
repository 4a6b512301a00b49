use crate::analyzers::types::{DetractorComment, KpiSummary};
use crate::classify::Classification;
use crate::dataset::ResponseSet;
use crate::stats;

/// KPI numbers for the set, or `None` when it is empty.
pub fn kpis(set: &ResponseSet<'_>) -> Option<KpiSummary> {
    if set.is_empty() {
        return None;
    }
    Some(KpiSummary::from_counts(&stats::counts(set.iter())))
}

/// The last `limit` detractor responses, in source order, that carry a
/// comment.
pub fn detractor_comments(set: &ResponseSet<'_>, limit: usize) -> Vec<DetractorComment> {
    let with_comment: Vec<DetractorComment> = set
        .iter()
        .filter(|r| r.classification() == Classification::Detractor)
        .filter_map(|r| {
            r.comment().map(|comment| DetractorComment {
                timestamp: r.timestamp(),
                rating: r.rating(),
                comment: comment.to_string(),
            })
        })
        .collect();

    let skip = with_comment.len().saturating_sub(limit);
    with_comment.into_iter().skip(skip).collect()
}
