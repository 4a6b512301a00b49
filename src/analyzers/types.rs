//! Data types shared by the aggregation pipeline.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::classify::Classification;
use crate::dataset::Response;
use crate::stats::{self, NpsCounts};

/// Group label used for responses whose grouping dimension is blank.
pub const MISSING_LABEL: &str = "(blank)";

/// Reduction applied to each partition of responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Count,
    NpsScore,
}

impl Metric {
    pub fn evaluate(self, responses: &[&Response]) -> i64 {
        match self {
            Metric::Count => responses.len() as i64,
            Metric::NpsScore => i64::from(stats::score(responses.iter().copied())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Count => "Response count",
            Metric::NpsScore => "NPS score",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A grouping value as read from the data. Blank cells stay distinct from
/// any text, including text equal to [`MISSING_LABEL`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupValue {
    Blank,
    Value(String),
}

impl GroupValue {
    /// Display text; blank cells render as [`MISSING_LABEL`].
    pub fn label(&self) -> &str {
        match self {
            GroupValue::Blank => MISSING_LABEL,
            GroupValue::Value(value) => value,
        }
    }
}

impl From<Option<&str>> for GroupValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(GroupValue::Blank, |v| GroupValue::Value(v.to_string()))
    }
}

impl From<&str> for GroupValue {
    fn from(value: &str) -> Self {
        GroupValue::Value(value.to_string())
    }
}

impl From<String> for GroupValue {
    fn from(value: String) -> Self {
        GroupValue::Value(value)
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One or two categorical values identifying a partition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub primary: GroupValue,
    pub secondary: Option<GroupValue>,
}

impl GroupKey {
    pub fn single(primary: impl Into<GroupValue>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
        }
    }

    pub fn pair(primary: impl Into<GroupValue>, secondary: impl Into<GroupValue>) -> Self {
        Self {
            primary: primary.into(),
            secondary: Some(secondary.into()),
        }
    }
}

/// Headline numbers for a non-empty working set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub score: i32,
    pub total: usize,
    pub detractors: usize,
    pub passives: usize,
    pub promoters: usize,
    pub detractor_share: f64,
    pub passive_share: f64,
    pub promoter_share: f64,
}

impl KpiSummary {
    pub fn from_counts(counts: &NpsCounts) -> Self {
        KpiSummary {
            score: counts.score(),
            total: counts.total,
            detractors: counts.detractors,
            passives: counts.passives,
            promoters: counts.promoters,
            detractor_share: counts.share(Classification::Detractor),
            passive_share: counts.share(Classification::Passive),
            promoter_share: counts.share(Classification::Promoter),
        }
    }
}

/// Value of a metric for one `YYYY-MM` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub value: i64,
}

/// A detractor's rating and free-text justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetractorComment {
    pub timestamp: NaiveDate,
    pub rating: u8,
    pub comment: String,
}
