//! Aggregations over a working set of survey responses.
//!
//! Every analyzer is a pure function of a [`ResponseSet`](crate::dataset::ResponseSet):
//! grouped counts or scores for charts, monthly trends, per-entity radar
//! profiles, KPI numbers and the tail of detractor comments. All of them
//! partition through [`utility::partition`] and reduce with a [`types::Metric`].

pub mod aggregate;
pub mod chart;
pub mod radar;
pub mod summary;
pub mod trend;
pub mod types;
pub mod utility;
