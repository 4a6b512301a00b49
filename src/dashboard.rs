//! Assembly of every analysis section for one filter configuration.
//!
//! A load failure never reaches this module. Everything here degrades per
//! section: an empty working set short-circuits to [`Dashboard::Empty`], and
//! a section that cannot be computed carries a notice instead of data.

use serde::Serialize;
use tracing::{info, warn};

use crate::analyzers::chart::{ChartRequest, ChartSeries, build_chart};
use crate::analyzers::radar::{RadarProfile, radar};
use crate::analyzers::summary::{detractor_comments, kpis};
use crate::analyzers::trend::trend;
use crate::analyzers::types::{DetractorComment, KpiSummary, Metric, TrendPoint};
use crate::config::DEFAULT_COMMENT_TAIL;
use crate::dataset::Dataset;
use crate::filter::{Filter, FilterStep, apply_traced};

pub const EMPTY_NOTICE: &str =
    "No responses match the selected filters. Adjust the filters or the search term.";
pub const RADAR_COLUMNS_NOTICE: &str = "The radar chart needs numeric criterion columns (e.g. service, price) and categorical columns (e.g. company, sector) in the data.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarRequest {
    pub dimension: String,
    pub entities: Vec<String>,
    /// Criteria to plot; every criterion of the dataset when `None`.
    pub criteria: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRequest {
    pub filters: Vec<Filter>,
    pub chart: Option<ChartRequest>,
    pub radar: Option<RadarRequest>,
    pub trend_metric: Metric,
    pub comment_tail: usize,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            chart: None,
            radar: None,
            trend_metric: Metric::NpsScore,
            comment_tail: DEFAULT_COMMENT_TAIL,
        }
    }
}

/// Either computed data or the reason it could not be shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    Notice(String),
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Notice(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSections {
    pub kpis: KpiSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Section<ChartSeries>>,
    pub radar: Section<RadarProfile>,
    pub trend: Vec<TrendPoint>,
    /// `None` when the data has no comment column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detractor_comments: Option<Vec<DetractorComment>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Dashboard {
    Empty {
        notice: String,
        filters: Vec<FilterStep>,
    },
    Ready {
        total_responses: usize,
        filters: Vec<FilterStep>,
        sections: Box<DashboardSections>,
    },
}

impl Dashboard {
    pub fn sections(&self) -> Option<&DashboardSections> {
        match self {
            Dashboard::Ready { sections, .. } => Some(&**sections),
            Dashboard::Empty { .. } => None,
        }
    }

    pub fn filters(&self) -> &[FilterStep] {
        match self {
            Dashboard::Empty { filters, .. } | Dashboard::Ready { filters, .. } => filters,
        }
    }
}

/// Filters `dataset` and computes every requested section.
#[tracing::instrument(skip_all, fields(source = dataset.len(), filters = request.filters.len()))]
pub fn build_dashboard(dataset: &Dataset, request: &DashboardRequest) -> Dashboard {
    let (working, filters) = apply_traced(&dataset.all(), &request.filters);

    let Some(kpis) = kpis(&working) else {
        info!("Working set is empty after filtering");
        return Dashboard::Empty {
            notice: EMPTY_NOTICE.to_string(),
            filters,
        };
    };

    let chart = request.chart.as_ref().map(|chart| {
        build_chart(&working, chart).map_or_else(
            |e| {
                warn!(error = %e, "Chart section degraded");
                Section::Notice(e.to_string())
            },
            Section::Ready,
        )
    });

    let radar = radar_section(&working, request.radar.as_ref());

    let detractor_comments = working
        .schema()
        .has_comments()
        .then(|| detractor_comments(&working, request.comment_tail));

    info!(responses = working.len(), score = kpis.score, "Dashboard built");
    Dashboard::Ready {
        total_responses: working.len(),
        filters,
        sections: Box::new(DashboardSections {
            kpis,
            chart,
            radar,
            trend: trend(&working, request.trend_metric),
            detractor_comments,
        }),
    }
}

fn radar_section(
    working: &crate::dataset::ResponseSet<'_>,
    request: Option<&RadarRequest>,
) -> Section<RadarProfile> {
    let schema = working.schema();
    if schema.criteria().is_empty() || schema.dimensions().is_empty() {
        warn!("Radar section disabled: missing criterion or categorical columns");
        return Section::Notice(RADAR_COLUMNS_NOTICE.to_string());
    }

    let Some(request) = request.filter(|r| !r.entities.is_empty()) else {
        return Section::Notice(
            "Select one or more items of a category to draw the radar chart.".to_string(),
        );
    };

    let criteria = request
        .criteria
        .clone()
        .unwrap_or_else(|| schema.criteria().to_vec());
    match radar(working, &request.dimension, &request.entities, &criteria) {
        Ok(profile) if profile.entities.is_empty() => Section::Notice(format!(
            "None of the selected items of '{}' have responses in the current selection.",
            request.dimension
        )),
        Ok(profile) => Section::Ready(profile),
        Err(e) => {
            warn!(error = %e, "Radar section degraded");
            Section::Notice(e.to_string())
        }
    }
}
