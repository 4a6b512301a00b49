//! Series data for the configurable bar / donut chart.

use serde::Serialize;
use tracing::warn;

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::Metric;
use crate::dataset::ResponseSet;
use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Donut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x: String,
    pub metric: Metric,
    pub color: Option<String>,
}

/// Adjustments made to a request that the chart kind cannot honour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartWarning {
    /// Donut charts only show response counts.
    MetricForcedToCount,
    /// The color dimension was dropped.
    ColorIgnored,
}

impl ChartWarning {
    pub fn message(self) -> &'static str {
        match self {
            ChartWarning::MetricForcedToCount => {
                "Donut charts show response counts best; the metric was switched to response count."
            }
            ChartWarning::ColorIgnored => "The color grouping does not apply to this chart and was ignored.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub category: String,
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub kind: ChartKind,
    pub metric: Metric,
    pub x: String,
    pub color: Option<String>,
    pub points: Vec<ChartPoint>,
    pub warnings: Vec<ChartWarning>,
}

/// Aggregates `set` for the requested chart.
///
/// Bar charts group by `x` and optionally `color`. Donut charts always group
/// by `x` alone and count responses; the overrides are reported as warnings.
pub fn build_chart(
    set: &ResponseSet<'_>,
    request: &ChartRequest,
) -> Result<ChartSeries, AnalysisError> {
    let mut warnings = Vec::new();
    let mut metric = request.metric;
    let mut color = request.color.clone();

    if color.as_deref() == Some(request.x.as_str()) {
        color = None;
        warnings.push(ChartWarning::ColorIgnored);
    }

    if request.kind == ChartKind::Donut {
        if metric != Metric::Count {
            metric = Metric::Count;
            warnings.push(ChartWarning::MetricForcedToCount);
        }
        if color.take().is_some() {
            warnings.push(ChartWarning::ColorIgnored);
        }
    }

    for warning in &warnings {
        warn!(x = %request.x, ?warning, "Chart request adjusted");
    }

    let groups = aggregate(set, &request.x, color.as_deref(), metric)?;
    let points = groups
        .into_iter()
        .map(|(key, value)| ChartPoint {
            category: key.primary.label().to_string(),
            value,
            color: key.secondary.map(|c| c.label().to_string()),
        })
        .collect();

    let mut title = format!("{} by {}", metric.label(), request.x);
    if let Some(color) = &color {
        title.push_str(&format!(" grouped by {color}"));
    }

    Ok(ChartSeries {
        title,
        kind: request.kind,
        metric,
        x: request.x.clone(),
        color,
        points,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Response, Schema};
    use chrono::NaiveDate;

    fn schema() -> Schema {
        Schema::new(vec![], vec!["Plano".into(), "Canal".into()], None)
    }

    fn row(rating: u8, plano: &str, canal: &str) -> Response {
        Response::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            rating,
            vec![],
            vec![Some(plano.into()), Some(canal.into())],
            None,
        )
    }

    fn rows() -> Vec<Response> {
        vec![
            row(10, "Gold", "Email"),
            row(2, "Gold", "Chat"),
            row(9, "Basic", "Email"),
        ]
    }

    fn request(kind: ChartKind, metric: Metric, color: Option<&str>) -> ChartRequest {
        ChartRequest {
            kind,
            x: "Plano".into(),
            metric,
            color: color.map(str::to_string),
        }
    }

    #[test]
    fn test_bar_chart_with_score() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let series = build_chart(&set, &request(ChartKind::Bar, Metric::NpsScore, None)).unwrap();
        assert_eq!(series.title, "NPS score by Plano");
        assert!(series.warnings.is_empty());
        assert_eq!(
            series.points,
            vec![
                ChartPoint {
                    category: "Basic".into(),
                    value: 100,
                    color: None
                },
                ChartPoint {
                    category: "Gold".into(),
                    value: 0,
                    color: None
                },
            ]
        );
    }

    #[test]
    fn test_bar_chart_with_color() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let series =
            build_chart(&set, &request(ChartKind::Bar, Metric::Count, Some("Canal"))).unwrap();
        assert_eq!(series.title, "Response count by Plano grouped by Canal");
        assert_eq!(series.points.len(), 3);
        assert!(series
            .points
            .iter()
            .any(|p| p.category == "Gold" && p.color.as_deref() == Some("Chat") && p.value == 1));
    }

    #[test]
    fn test_donut_forces_count_and_warns() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let series = build_chart(
            &set,
            &request(ChartKind::Donut, Metric::NpsScore, Some("Canal")),
        )
        .unwrap();
        assert_eq!(series.metric, Metric::Count);
        assert_eq!(series.color, None);
        assert_eq!(
            series.warnings,
            vec![ChartWarning::MetricForcedToCount, ChartWarning::ColorIgnored]
        );
        assert_eq!(series.points.iter().map(|p| p.value).sum::<i64>(), 3);
    }

    #[test]
    fn test_donut_with_count_has_no_warning() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let series = build_chart(&set, &request(ChartKind::Donut, Metric::Count, None)).unwrap();
        assert!(series.warnings.is_empty());
        assert_eq!(series.title, "Response count by Plano");
    }

    #[test]
    fn test_unknown_x_is_an_error() {
        let schema = schema();
        let set = ResponseSet::new(&schema, vec![]);
        let mut req = request(ChartKind::Bar, Metric::Count, None);
        req.x = "Região".into();
        assert_eq!(
            build_chart(&set, &req),
            Err(AnalysisError::UnknownDimension("Região".into()))
        );
    }
}
