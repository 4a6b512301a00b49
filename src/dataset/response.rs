use chrono::NaiveDate;

use crate::classify::{Classification, classify};
use crate::dataset::schema::{DimensionRef, Schema};

/// One survey submission.
///
/// Criterion and dimension values are stored positionally, indexed the same
/// way as the owning dataset's [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    timestamp: NaiveDate,
    rating: u8,
    classification: Classification,
    criteria: Vec<Option<f64>>,
    dimensions: Vec<Option<String>>,
    comment: Option<String>,
}

impl Response {
    pub fn new(
        timestamp: NaiveDate,
        rating: u8,
        criteria: Vec<Option<f64>>,
        dimensions: Vec<Option<String>>,
        comment: Option<String>,
    ) -> Self {
        Self {
            timestamp,
            rating,
            classification: classify(rating),
            criteria,
            dimensions,
            comment,
        }
    }

    pub fn timestamp(&self) -> NaiveDate {
        self.timestamp
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn criterion(&self, index: usize) -> Option<f64> {
        self.criteria.get(index).copied().flatten()
    }

    /// Value of a dimension, or `None` when the cell was blank.
    pub fn dimension(&self, dimension: DimensionRef) -> Option<&str> {
        match dimension {
            DimensionRef::Classification => Some(self.classification.label()),
            DimensionRef::Column(index) => self.dimensions.get(index).and_then(|v| v.as_deref()),
        }
    }
}

/// An immutable view over some of a dataset's responses.
///
/// Filtering never mutates a set; it produces a narrower one that borrows the
/// same records.
#[derive(Debug, Clone)]
pub struct ResponseSet<'a> {
    schema: &'a Schema,
    records: Vec<&'a Response>,
}

impl<'a> ResponseSet<'a> {
    pub fn new(schema: &'a Schema, records: Vec<&'a Response>) -> Self {
        Self { schema, records }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[&'a Response] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Response> + '_ {
        self.records.iter().copied()
    }

    /// Keeps the records matching `keep`, preserving their order.
    pub fn narrow(&self, keep: impl Fn(&Response) -> bool) -> ResponseSet<'a> {
        ResponseSet {
            schema: self.schema,
            records: self.records.iter().copied().filter(|r| keep(*r)).collect(),
        }
    }

    /// Earliest and latest response dates, if any.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.timestamp;
        Some(self.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.timestamp), hi.max(r.timestamp))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_classification_follows_rating() {
        let r = Response::new(date(2025, 1, 1), 9, vec![], vec![], None);
        assert_eq!(r.classification(), Classification::Promoter);
        let r = Response::new(date(2025, 1, 1), 6, vec![], vec![], None);
        assert_eq!(r.classification(), Classification::Detractor);
    }

    #[test]
    fn test_dimension_values() {
        let r = Response::new(
            date(2025, 1, 1),
            7,
            vec![Some(8.0), None],
            vec![Some("Acme".into()), None],
            None,
        );
        assert_eq!(r.dimension(DimensionRef::Column(0)), Some("Acme"));
        assert_eq!(r.dimension(DimensionRef::Column(1)), None);
        assert_eq!(r.dimension(DimensionRef::Column(5)), None);
        assert_eq!(r.dimension(DimensionRef::Classification), Some("Passive"));
        assert_eq!(r.criterion(0), Some(8.0));
        assert_eq!(r.criterion(1), None);
    }

    #[test]
    fn test_narrow_and_bounds() {
        let schema = Schema::default();
        let rows = vec![
            Response::new(date(2025, 3, 10), 10, vec![], vec![], None),
            Response::new(date(2025, 1, 5), 3, vec![], vec![], None),
            Response::new(date(2025, 2, 1), 8, vec![], vec![], None),
        ];
        let set = ResponseSet::new(&schema, rows.iter().collect());
        assert_eq!(set.date_bounds(), Some((date(2025, 1, 5), date(2025, 3, 10))));

        let narrowed = set.narrow(|r| r.rating() >= 8);
        assert_eq!(narrowed.len(), 2);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_empty_set_has_no_bounds() {
        let schema = Schema::default();
        let set = ResponseSet::new(&schema, vec![]);
        assert!(set.is_empty());
        assert_eq!(set.date_bounds(), None);
    }
}
