//! Net Promoter Score arithmetic.

use serde::Serialize;

use crate::classify::Classification;
use crate::dataset::Response;

/// Per-classification tallies over a set of responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NpsCounts {
    pub detractors: usize,
    pub passives: usize,
    pub promoters: usize,
    pub total: usize,
}

impl NpsCounts {
    pub fn tally<'a>(responses: impl IntoIterator<Item = &'a Response>) -> Self {
        responses
            .into_iter()
            .fold(NpsCounts::default(), |acc, r| acc.with(r.classification()))
    }

    /// Adds one response of the given classification.
    pub fn with(mut self, class: Classification) -> Self {
        match class {
            Classification::Detractor => self.detractors += 1,
            Classification::Passive => self.passives += 1,
            Classification::Promoter => self.promoters += 1,
        }
        self.total += 1;
        self
    }

    pub fn count(&self, class: Classification) -> usize {
        match class {
            Classification::Detractor => self.detractors,
            Classification::Passive => self.passives,
            Classification::Promoter => self.promoters,
        }
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Fraction of responses in `class`, in `0.0..=1.0`.
    pub fn share(&self, class: Classification) -> f64 {
        Self::pct(self.count(class), self.total) / 100.0
    }

    /// `%promoters - %detractors`, rounded to the nearest integer with ties
    /// going to the even neighbour. Zero for an empty tally.
    pub fn score(&self) -> i32 {
        if self.total == 0 {
            return 0;
        }
        let raw = Self::pct(self.promoters, self.total) - Self::pct(self.detractors, self.total);
        raw.round_ties_even() as i32
    }
}

/// NPS of a set of responses, in `-100..=100`.
pub fn score<'a>(responses: impl IntoIterator<Item = &'a Response>) -> i32 {
    NpsCounts::tally(responses).score()
}

/// Classification counts of a set of responses.
pub fn counts<'a>(responses: impl IntoIterator<Item = &'a Response>) -> NpsCounts {
    NpsCounts::tally(responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn responses(ratings: &[u8]) -> Vec<Response> {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        ratings
            .iter()
            .map(|&r| Response::new(date, r, vec![], vec![], None))
            .collect()
    }

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(NpsCounts::pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(NpsCounts::pct(50, 100), 50.0);
        assert_eq!(NpsCounts::pct(1, 4), 25.0);
    }

    #[test]
    fn test_score_example() {
        let rows = responses(&[3, 7, 9, 10]);
        let counts = counts(&rows);
        assert_eq!(
            counts,
            NpsCounts {
                detractors: 1,
                passives: 1,
                promoters: 2,
                total: 4
            }
        );
        assert_eq!(score(&rows), 25);
    }

    #[test]
    fn test_score_empty_is_zero() {
        let rows: Vec<Response> = vec![];
        assert_eq!(score(&rows), 0);
    }

    #[test]
    fn test_score_extremes() {
        assert_eq!(score(&responses(&[9, 10, 10])), 100);
        assert_eq!(score(&responses(&[0, 1, 6])), -100);
        assert_eq!(score(&responses(&[7, 8])), 0);
    }

    #[test]
    fn test_score_rounding() {
        // 2 promoters, 1 detractor out of 3: 33.33 -> 33
        assert_eq!(score(&responses(&[9, 9, 1])), 33);
        // 2 promoters out of 3: 66.67 -> 67
        assert_eq!(score(&responses(&[9, 9, 7])), 67);
        // 1 promoter out of 8: 12.5 -> 12
        assert_eq!(score(&responses(&[9, 7, 7, 7, 7, 7, 7, 7])), 12);
        // 3 promoters out of 8: 37.5 -> 38
        assert_eq!(score(&responses(&[9, 9, 9, 7, 7, 7, 7, 7])), 38);
        // 1 detractor out of 8: -12.5 -> -12
        assert_eq!(score(&responses(&[1, 7, 7, 7, 7, 7, 7, 7])), -12);
    }

    #[test]
    fn test_score_matches_formula_for_all_small_sets() {
        for p in 0..6usize {
            for d in 0..6usize {
                for n in 0..6usize {
                    let mut ratings = vec![10u8; p];
                    ratings.extend(std::iter::repeat_n(2u8, d));
                    ratings.extend(std::iter::repeat_n(8u8, n));
                    let total = p + d + n;
                    let value = score(&responses(&ratings));
                    if total == 0 {
                        assert_eq!(value, 0);
                        continue;
                    }
                    assert!((-100..=100).contains(&value));
                    let expected = ((p as f64 / total as f64) * 100.0
                        - (d as f64 / total as f64) * 100.0)
                        .round_ties_even() as i32;
                    assert_eq!(value, expected, "p={p} d={d} n={n}");
                }
            }
        }
    }

    #[test]
    fn test_share() {
        let counts = counts(&responses(&[3, 7, 9, 10]));
        assert_eq!(counts.share(Classification::Promoter), 0.5);
        assert_eq!(counts.share(Classification::Detractor), 0.25);
        assert_eq!(NpsCounts::default().share(Classification::Passive), 0.0);
    }
}
