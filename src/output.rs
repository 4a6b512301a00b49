//! Output formatting for analysis results.
//!
//! Supports pretty debug logging, JSON serialization, and a plain text report.

use std::fmt::Write;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::analyzers::chart::ChartSeries;
use crate::analyzers::radar::RadarProfile;
use crate::analyzers::types::{DetractorComment, KpiSummary, TrendPoint};
use crate::dashboard::{Dashboard, Section};
use crate::dataset::Schema;

/// Logs a value using Rust's debug pretty-print format.
pub fn log_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Serializes a value as pretty-printed JSON.
pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn schema_text(schema: &Schema) -> String {
    let mut out = String::new();
    let list = |items: &[String]| {
        if items.is_empty() {
            "(none)".to_string()
        } else {
            items.join(", ")
        }
    };
    let _ = writeln!(out, "Criteria: {}", list(schema.criteria()));
    let _ = writeln!(out, "Dimensions: {}", list(schema.dimensions()));
    let _ = writeln!(
        out,
        "Comment column: {}",
        schema.comment_column().unwrap_or("(none)")
    );
    out
}

pub fn kpi_text(kpis: &KpiSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "NPS score: {}", kpis.score);
    let _ = writeln!(out, "Total responses: {}", kpis.total);
    let _ = writeln!(
        out,
        "Detractors: {} ({:.1}%)",
        kpis.detractors,
        kpis.detractor_share * 100.0
    );
    let _ = writeln!(
        out,
        "Passives: {} ({:.1}%)",
        kpis.passives,
        kpis.passive_share * 100.0
    );
    let _ = writeln!(
        out,
        "Promoters: {} ({:.1}%)",
        kpis.promoters,
        kpis.promoter_share * 100.0
    );
    out
}

pub fn chart_text(chart: &ChartSeries) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", chart.title);
    for warning in &chart.warnings {
        let _ = writeln!(out, "  note: {}", warning.message());
    }
    for point in &chart.points {
        match &point.color {
            Some(color) => {
                let _ = writeln!(out, "  {} / {}: {}", point.category, color, point.value);
            }
            None => {
                let _ = writeln!(out, "  {}: {}", point.category, point.value);
            }
        }
    }
    out
}

pub fn radar_text(profile: &RadarProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Average criterion scores by '{}'", profile.dimension);
    for entity in &profile.entities {
        let labels = entity.polygon.labels();
        let values = entity.polygon.value_labels();
        // closing point is implied in text
        let cells: Vec<String> = labels
            .iter()
            .zip(&values)
            .take(labels.len().saturating_sub(1))
            .map(|(label, value)| format!("{label} {value}"))
            .collect();
        let _ = writeln!(out, "  {}: {}", entity.entity, cells.join(", "));
    }
    out
}

pub fn trend_text(points: &[TrendPoint]) -> String {
    let mut out = String::new();
    for point in points {
        let _ = writeln!(out, "  {}: {}", point.month, point.value);
    }
    out
}

pub fn comments_text(comments: &[DetractorComment]) -> String {
    let mut out = String::new();
    if comments.is_empty() {
        let _ = writeln!(out, "  No detractor comments in this selection.");
    }
    for comment in comments {
        let _ = writeln!(
            out,
            "  {} [{}] {}",
            comment.timestamp, comment.rating, comment.comment
        );
    }
    out
}

fn section_text<T>(section: &Section<T>, render: impl Fn(&T) -> String) -> String {
    match section {
        Section::Ready(value) => render(value),
        Section::Notice(notice) => format!("  {notice}\n"),
    }
}

/// Renders the whole dashboard as a plain text report.
pub fn dashboard_text(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# NPS Analysis");

    let sections = match dashboard {
        Dashboard::Empty { notice, .. } => {
            let _ = writeln!(out, "{notice}");
            return out;
        }
        Dashboard::Ready { sections, .. } => sections,
    };

    let _ = writeln!(out);
    let _ = writeln!(out, "## Overview");
    out.push_str(&kpi_text(&sections.kpis));

    if let Some(chart) = &sections.chart {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Chart");
        out.push_str(&section_text(chart, chart_text));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Criteria Radar");
    out.push_str(&section_text(&sections.radar, radar_text));

    let _ = writeln!(out);
    let _ = writeln!(out, "## Monthly Trend");
    out.push_str(&trend_text(&sections.trend));

    if let Some(comments) = &sections.detractor_comments {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Recent Detractor Feedback");
        out.push_str(&comments_text(comments));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::chart::{ChartKind, ChartPoint, ChartWarning};
    use crate::analyzers::types::Metric;
    use crate::filter::FilterStep;

    fn kpis() -> KpiSummary {
        KpiSummary {
            score: 25,
            total: 4,
            detractors: 1,
            passives: 1,
            promoters: 2,
            detractor_share: 0.25,
            passive_share: 0.25,
            promoter_share: 0.5,
        }
    }

    #[test]
    fn test_log_pretty_does_not_panic() {
        log_pretty(&kpis());
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&kpis()).unwrap();
        assert!(json.contains("\"score\": 25"));
    }

    #[test]
    fn test_kpi_text() {
        let text = kpi_text(&kpis());
        assert!(text.contains("NPS score: 25"));
        assert!(text.contains("Promoters: 2 (50.0%)"));
    }

    #[test]
    fn test_chart_text_includes_warnings() {
        let chart = ChartSeries {
            title: "Response count by Plano".into(),
            kind: ChartKind::Donut,
            metric: Metric::Count,
            x: "Plano".into(),
            color: None,
            points: vec![ChartPoint {
                category: "Gold".into(),
                value: 3,
                color: None,
            }],
            warnings: vec![ChartWarning::MetricForcedToCount],
        };
        let text = chart_text(&chart);
        assert!(text.contains("Gold: 3"));
        assert!(text.contains("note: Donut charts"));
    }

    #[test]
    fn test_empty_dashboard_text() {
        let dashboard = Dashboard::Empty {
            notice: "nothing here".into(),
            filters: vec![FilterStep {
                kind: "date_range",
                field: None,
                options: None,
                applied: true,
                remaining: 0,
            }],
        };
        let text = dashboard_text(&dashboard);
        assert!(text.contains("nothing here"));
        assert!(!text.contains("## Overview"));
    }
}
