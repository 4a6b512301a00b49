use std::fmt;

use serde::Serialize;

/// Rating-derived category of a survey response.
///
/// | Rating | Classification |
/// |--------|----------------|
/// | 0–6    | Detractor      |
/// | 7–8    | Passive        |
/// | 9–10   | Promoter       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Classification {
    Detractor,
    Passive,
    Promoter,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::Detractor,
        Classification::Passive,
        Classification::Promoter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Classification::Detractor => "Detractor",
            Classification::Passive => "Passive",
            Classification::Promoter => "Promoter",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a rating onto its [`Classification`]. Total over `u8`.
pub fn classify(rating: u8) -> Classification {
    match rating {
        0..=6 => Classification::Detractor,
        7..=8 => Classification::Passive,
        _ => Classification::Promoter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0), Classification::Detractor);
        assert_eq!(classify(6), Classification::Detractor);
        assert_eq!(classify(7), Classification::Passive);
        assert_eq!(classify(8), Classification::Passive);
        assert_eq!(classify(9), Classification::Promoter);
        assert_eq!(classify(10), Classification::Promoter);
    }

    #[test]
    fn test_classify_every_rating() {
        for rating in 0..=10u8 {
            let expected = if rating <= 6 {
                Classification::Detractor
            } else if rating <= 8 {
                Classification::Passive
            } else {
                Classification::Promoter
            };
            assert_eq!(classify(rating), expected, "rating {rating}");
        }
    }

    #[test]
    fn test_label_matches_display() {
        for class in Classification::ALL {
            assert_eq!(class.to_string(), class.label());
        }
    }
}
