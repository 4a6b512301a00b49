//! Predicate filters that narrow a response set.
//!
//! Filters compose by logical AND. Each one either narrows or preserves the
//! set, so the order they run in changes intermediate option lists but
//! never the final result.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::analyzers::types::MISSING_LABEL;
use crate::dataset::{DimensionRef, Response, ResponseSet};
use crate::error::FilterError;

/// Which values of a categorical field a multi-select keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Keeps responses dated within `start..=end`.
    DateRange { start: NaiveDate, end: NaiveDate },
    /// Case-insensitive substring match on a categorical field. Responses
    /// with a blank value never match. An empty needle keeps everything.
    TextSearch { field: String, needle: String },
    /// Keeps responses whose field value is selected. Selecting
    /// [`MISSING_LABEL`] keeps responses with a blank value.
    Select { field: String, selection: Selection },
}

impl Filter {
    /// Date range filter whose open ends default to `bounds`, the earliest
    /// and latest response dates. `None` when neither end is given or there
    /// is no data to take a default from.
    pub fn date_range(
        bounds: Option<(NaiveDate, NaiveDate)>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Option<Filter> {
        if from.is_none() && to.is_none() {
            return None;
        }
        let (min, max) = bounds?;
        Some(Filter::DateRange {
            start: from.unwrap_or(min),
            end: to.unwrap_or(max),
        })
    }

    /// Parses a `COLUMN=V1,V2` multi-select. Values are trimmed and empty
    /// ones dropped.
    pub fn parse_select(raw: &str) -> Result<Filter, FilterError> {
        let (field, values) = raw
            .split_once('=')
            .ok_or_else(|| FilterError::MalformedSelect(raw.to_string()))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(FilterError::MalformedSelect(raw.to_string()));
        }
        let values = values.split(',').map(str::trim).filter(|v| !v.is_empty());
        Ok(Filter::Select {
            field: field.to_string(),
            selection: Selection::only(values),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Filter::DateRange { .. } => "date_range",
            Filter::TextSearch { .. } => "text_search",
            Filter::Select { .. } => "select",
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Filter::DateRange { .. } => None,
            Filter::TextSearch { field, .. } | Filter::Select { field, .. } => Some(field),
        }
    }

    /// Builds the predicate for this filter, or `None` when it cannot narrow
    /// anything (unconstrained selection, empty search, or a field the
    /// dataset does not have).
    fn predicate(&self, set: &ResponseSet<'_>) -> Option<Box<dyn Fn(&Response) -> bool + '_>> {
        match self {
            Filter::DateRange { start, end } => {
                let (start, end) = (*start, *end);
                Some(Box::new(move |r: &Response| (start..=end).contains(&r.timestamp())))
            }
            Filter::TextSearch { field, needle } => {
                if needle.trim().is_empty() {
                    return None;
                }
                let needle = needle.to_lowercase();
                let dim = lookup(set, field)?;
                Some(Box::new(move |r: &Response| {
                    r.dimension(dim)
                        .is_some_and(|v| v.to_lowercase().contains(&needle))
                }))
            }
            Filter::Select { field, selection } => match selection {
                Selection::All => None,
                Selection::Only(values) => {
                    let dim = lookup(set, field)?;
                    Some(Box::new(move |r: &Response| match r.dimension(dim) {
                        Some(v) => values.contains(v),
                        None => values.contains(MISSING_LABEL),
                    }))
                }
            },
        }
    }
}

fn lookup(set: &ResponseSet<'_>, field: &str) -> Option<DimensionRef> {
    let dim = set.schema().dimension(field);
    if dim.is_none() {
        warn!(field, "Filter refers to a column the data does not have, skipping");
    }
    dim
}

/// Outcome of one filter stage, for populating filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterStep {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Values offered for the field, taken from the set before this filter
    /// ran. Only filled for multi-selects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub applied: bool,
    pub remaining: usize,
}

/// Runs every filter in order and returns the narrowed set.
pub fn apply<'a>(source: &ResponseSet<'a>, filters: &[Filter]) -> ResponseSet<'a> {
    apply_traced(source, filters).0
}

/// Like [`apply`], also reporting what each stage saw and kept.
pub fn apply_traced<'a>(
    source: &ResponseSet<'a>,
    filters: &[Filter],
) -> (ResponseSet<'a>, Vec<FilterStep>) {
    let mut current = source.clone();
    let mut steps = Vec::with_capacity(filters.len());

    for filter in filters {
        let options = match filter {
            Filter::Select { field, .. } => options(&current, field),
            _ => None,
        };
        let applied = match filter.predicate(&current) {
            Some(keep) => {
                current = current.narrow(keep);
                true
            }
            None => false,
        };
        debug!(
            kind = filter.kind(),
            field = filter.field().unwrap_or(""),
            applied,
            remaining = current.len(),
            "Filter stage"
        );
        steps.push(FilterStep {
            kind: filter.kind(),
            field: filter.field().map(str::to_string),
            options,
            applied,
            remaining: current.len(),
        });
    }

    (current, steps)
}

/// Distinct values of `field` in first-seen order, or `None` when the
/// dataset has no such field. Blank values are offered as [`MISSING_LABEL`],
/// so selecting every option keeps every response.
pub fn options(set: &ResponseSet<'_>, field: &str) -> Option<Vec<String>> {
    let dim = set.schema().dimension(field)?;
    let mut seen = BTreeSet::new();
    let mut values = Vec::new();
    for value in set.iter().map(|r| r.dimension(dim).unwrap_or(MISSING_LABEL)) {
        if seen.insert(value) {
            values.push(value.to_string());
        }
    }
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Schema;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn schema() -> Schema {
        Schema::new(vec![], vec!["Empresa".into(), "Setor".into()], None)
    }

    fn row(m: u32, d: u32, rating: u8, empresa: Option<&str>, setor: &str) -> Response {
        Response::new(
            date(m, d),
            rating,
            vec![],
            vec![empresa.map(str::to_string), Some(setor.to_string())],
            None,
        )
    }

    fn rows() -> Vec<Response> {
        vec![
            row(1, 5, 9, Some("Acme Corp"), "Varejo"),
            row(1, 20, 3, Some("Beta Ltda"), "Saúde"),
            row(2, 1, 10, None, "Varejo"),
            row(2, 14, 7, Some("ACME Filial"), "Indústria"),
            row(3, 3, 5, Some("Gama"), "Saúde"),
        ]
    }

    fn ratings(set: &ResponseSet<'_>) -> Vec<u8> {
        set.iter().map(|r| r.rating()).collect()
    }

    #[test]
    fn test_date_range_defaults_open_ends() {
        let bounds = Some((date(1, 5), date(3, 3)));

        assert_eq!(Filter::date_range(bounds, None, None), None);
        assert_eq!(
            Filter::date_range(bounds, Some(date(2, 1)), None),
            Some(Filter::DateRange {
                start: date(2, 1),
                end: date(3, 3),
            })
        );
        assert_eq!(
            Filter::date_range(bounds, None, Some(date(1, 31))),
            Some(Filter::DateRange {
                start: date(1, 5),
                end: date(1, 31),
            })
        );
        assert_eq!(Filter::date_range(None, Some(date(2, 1)), None), None);
    }

    #[test]
    fn test_parse_select() {
        assert_eq!(
            Filter::parse_select(" Setor = Varejo, Saúde ,, "),
            Ok(Filter::Select {
                field: "Setor".into(),
                selection: Selection::only(["Varejo", "Saúde"]),
            })
        );
        assert_eq!(
            Filter::parse_select("Canal=Chat=Email"),
            Ok(Filter::Select {
                field: "Canal".into(),
                selection: Selection::only(["Chat=Email"]),
            })
        );
        assert_eq!(
            Filter::parse_select("Setor"),
            Err(FilterError::MalformedSelect("Setor".into()))
        );
        assert!(Filter::parse_select("=Varejo").is_err());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let filtered = apply(
            &set,
            &[Filter::DateRange {
                start: date(1, 20),
                end: date(2, 14),
            }],
        );
        assert_eq!(ratings(&filtered), vec![3, 10, 7]);
    }

    #[test]
    fn test_date_range_after_all_data_is_empty() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let filtered = apply(
            &set,
            &[Filter::DateRange {
                start: date(12, 1),
                end: date(12, 31),
            }],
        );
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_text_search_is_case_insensitive_and_skips_blank() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let filtered = apply(
            &set,
            &[Filter::TextSearch {
                field: "Empresa".into(),
                needle: "acme".into(),
            }],
        );
        assert_eq!(ratings(&filtered), vec![9, 7]);
    }

    #[test]
    fn test_search_keeps_inner_spaces_of_needle() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let search = |needle: &str| {
            apply(
                &set,
                &[Filter::TextSearch {
                    field: "Empresa".into(),
                    needle: needle.into(),
                }],
            )
        };
        assert_eq!(ratings(&search("acme ")), vec![9, 7]);
        assert_eq!(ratings(&search("gama")), vec![5]);
        assert!(search("gama ").is_empty());
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let filtered = apply(
            &set,
            &[Filter::TextSearch {
                field: "Empresa".into(),
                needle: "  ".into(),
            }],
        );
        assert_eq!(filtered.len(), 5);
    }

    #[test]
    fn test_select_only_and_all() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let only = apply(
            &set,
            &[Filter::Select {
                field: "Setor".into(),
                selection: Selection::only(["Saúde"]),
            }],
        );
        assert_eq!(ratings(&only), vec![3, 5]);

        let all = apply(
            &set,
            &[Filter::Select {
                field: "Setor".into(),
                selection: Selection::All,
            }],
        );
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_selecting_every_option_keeps_blank_rows() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let offered = options(&set, "Empresa").unwrap();
        assert_eq!(
            offered,
            vec!["Acme Corp", "Beta Ltda", MISSING_LABEL, "ACME Filial", "Gama"]
        );

        let kept = apply(
            &set,
            &[Filter::Select {
                field: "Empresa".into(),
                selection: Selection::only(offered),
            }],
        );
        assert_eq!(kept.len(), set.len());

        let blank_only = apply(
            &set,
            &[Filter::Select {
                field: "Empresa".into(),
                selection: Selection::only([MISSING_LABEL]),
            }],
        );
        assert_eq!(ratings(&blank_only), vec![10]);
    }

    #[test]
    fn test_unknown_field_is_skipped() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let (filtered, steps) = apply_traced(
            &set,
            &[Filter::TextSearch {
                field: "Canal".into(),
                needle: "email".into(),
            }],
        );
        assert_eq!(filtered.len(), 5);
        assert!(!steps[0].applied);
    }

    #[test]
    fn test_filters_commute() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let candidates = vec![
            Filter::DateRange {
                start: date(1, 10),
                end: date(3, 31),
            },
            Filter::TextSearch {
                field: "Empresa".into(),
                needle: "a".into(),
            },
            Filter::Select {
                field: "Setor".into(),
                selection: Selection::only(["Saúde", "Indústria"]),
            },
        ];

        for a in &candidates {
            for b in &candidates {
                let ab = apply(&set, &[a.clone(), b.clone()]);
                let ba = apply(&set, &[b.clone(), a.clone()]);
                assert_eq!(ratings(&ab), ratings(&ba));
            }
        }
    }

    #[test]
    fn test_options_reflect_earlier_filters() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        assert_eq!(
            options(&set, "Setor").unwrap(),
            vec!["Varejo", "Saúde", "Indústria"]
        );
        assert_eq!(options(&set, "Canal"), None);

        let (_, steps) = apply_traced(
            &set,
            &[
                Filter::TextSearch {
                    field: "Empresa".into(),
                    needle: "acme".into(),
                },
                Filter::Select {
                    field: "Setor".into(),
                    selection: Selection::All,
                },
            ],
        );
        assert_eq!(
            steps[1].options.as_deref(),
            Some(&["Varejo".to_string(), "Indústria".to_string()][..])
        );
        assert_eq!(steps[1].remaining, 2);
    }

    #[test]
    fn test_source_is_untouched() {
        let schema = schema();
        let data = rows();
        let set = ResponseSet::new(&schema, data.iter().collect());

        let _ = apply(
            &set,
            &[Filter::DateRange {
                start: date(12, 1),
                end: date(12, 2),
            }],
        );
        assert_eq!(set.len(), 5);
    }
}
