//! Column discovery for survey tables.
//!
//! The schema is inferred once per load and handed to every downstream
//! component, so nothing else has to guess which columns are criteria and
//! which are categorical dimensions.

use serde::Serialize;

/// Canonical name of the rating column after renaming.
pub const RATING_COLUMN: &str = "rating";
/// Canonical name of the date column after renaming.
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Name of the virtual dimension backed by each response's classification.
pub const CLASSIFICATION_DIMENSION: &str = "classification";

/// Names a column may not take as a criterion or dimension.
pub const RESERVED_COLUMNS: [&str; 3] = [RATING_COLUMN, TIMESTAMP_COLUMN, CLASSIFICATION_DIMENSION];

/// Typed descriptor of the non-reserved columns of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    criteria: Vec<String>,
    dimensions: Vec<String>,
    comment: Option<String>,
}

/// Resolved handle to a groupable dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionRef {
    Classification,
    Column(usize),
}

/// How a single non-reserved column was classified during inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Criterion,
    Dimension,
}

impl Schema {
    pub fn new(criteria: Vec<String>, dimensions: Vec<String>, comment: Option<String>) -> Self {
        Self {
            criteria,
            dimensions,
            comment,
        }
    }

    /// Numeric criterion columns, in source order.
    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    /// Categorical columns, in source order. Does not include the virtual
    /// classification dimension.
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub fn comment_column(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn has_comments(&self) -> bool {
        self.comment.is_some()
    }

    /// Every dimension a chart may group by: the categorical columns followed
    /// by the classification.
    pub fn grouping_dimensions(&self) -> Vec<&str> {
        self.dimensions
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(CLASSIFICATION_DIMENSION))
            .collect()
    }

    pub fn dimension(&self, name: &str) -> Option<DimensionRef> {
        if name == CLASSIFICATION_DIMENSION {
            return Some(DimensionRef::Classification);
        }
        self.dimensions
            .iter()
            .position(|d| d == name)
            .map(DimensionRef::Column)
    }

    pub fn criterion(&self, name: &str) -> Option<usize> {
        self.criteria.iter().position(|c| c == name)
    }
}

/// Decides whether a column holds criterion scores or categorical values.
///
/// A column is a criterion when it has at least one non-blank value and every
/// non-blank value parses as a number.
pub fn infer_kind<'a>(values: impl IntoIterator<Item = &'a str>) -> ColumnKind {
    let mut seen = false;
    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if parse_number(value).is_none() {
            return ColumnKind::Dimension;
        }
        seen = true;
    }
    if seen {
        ColumnKind::Criterion
    } else {
        ColumnKind::Dimension
    }
}

/// Parses a finite number, ignoring surrounding whitespace.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED_COLUMNS.contains(&name)
}
