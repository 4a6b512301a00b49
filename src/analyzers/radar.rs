//! Per-entity criterion averages drawn as closed radar polygons.

use serde::Serialize;
use tracing::debug;

use crate::analyzers::aggregate::resolve_dimension;
use crate::analyzers::utility::{mean_present, partition};
use crate::dataset::ResponseSet;
use crate::error::AnalysisError;

/// A polygon whose last point repeats the first one.
///
/// `labels` and `values` always have the same length, one more than the
/// number of criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedPolygon {
    labels: Vec<String>,
    values: Vec<Option<f64>>,
}

impl ClosedPolygon {
    /// Closes an open sequence of `(label, value)` points. Returns `None`
    /// for an empty sequence.
    pub fn close(points: Vec<(String, Option<f64>)>) -> Option<Self> {
        let (first_label, first_value) = points.first().cloned()?;
        let (mut labels, mut values): (Vec<String>, Vec<Option<f64>>) = points.into_iter().unzip();
        labels.push(first_label);
        values.push(first_value);
        Some(Self { labels, values })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Mean per criterion; `None` where no response of the entity scored it.
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Values formatted with one decimal, for point annotations.
    pub fn value_labels(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| match v {
                Some(v) => format!("{v:.1}"),
                None => "-".to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPolygon {
    pub entity: String,
    pub polygon: ClosedPolygon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarProfile {
    pub dimension: String,
    pub criteria: Vec<String>,
    pub entities: Vec<EntityPolygon>,
}

/// Builds one polygon per requested entity of `dimension`, averaging each
/// criterion over that entity's responses.
///
/// Entities keep their requested order; duplicates are ignored and entities
/// without responses are left out.
pub fn radar(
    set: &ResponseSet<'_>,
    dimension: &str,
    entities: &[String],
    criteria: &[String],
) -> Result<RadarProfile, AnalysisError> {
    let dim = resolve_dimension(set, dimension)?;
    let columns = criteria
        .iter()
        .map(|name| {
            set.schema()
                .criterion(name)
                .ok_or_else(|| AnalysisError::UnknownCriterion(name.clone()))
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let mut profile = RadarProfile {
        dimension: dimension.to_string(),
        criteria: criteria.to_vec(),
        entities: Vec::new(),
    };
    if entities.is_empty() {
        return Ok(profile);
    }
    if columns.is_empty() {
        return Err(AnalysisError::NoCriteria);
    }

    let selected = set.iter().filter(|r| {
        r.dimension(dim)
            .is_some_and(|value| entities.iter().any(|e| e == value))
    });
    let groups = partition(selected, |r| r.dimension(dim).map(str::to_string));

    let mut seen: Vec<&String> = Vec::new();
    for entity in entities {
        if seen.contains(&entity) {
            continue;
        }
        seen.push(entity);

        let Some(members) = groups.get(&Some(entity.clone())) else {
            debug!(entity = %entity, "No responses for radar entity, skipping");
            continue;
        };
        let points = criteria
            .iter()
            .zip(&columns)
            .map(|(name, &column)| {
                let avg = mean_present(members.iter().map(|r| r.criterion(column)));
                (name.clone(), avg)
            })
            .collect();
        if let Some(polygon) = ClosedPolygon::close(points) {
            profile.entities.push(EntityPolygon {
                entity: entity.clone(),
                polygon,
            });
        }
    }

    Ok(profile)
}
