//! Year-bucket assignment.
//!
//! Buckets are anchored to multiples of the width measured from year 0
//! (width 3 produces `[0-2], [3-5], [6-8], ...`), not to the query's start
//! date. For a fixed width the year-to-bucket mapping is a deterministic,
//! total function; buckets never overlap.

use crate::AggregateError;

/// A contiguous span of calendar years used as the grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearBucket {
    /// First year of the bucket, inclusive.
    pub start: i32,
    /// Last year of the bucket, inclusive.
    pub end: i32,
}

impl YearBucket {
    /// Assigns `year` to its bucket for the given width.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::Validation`] if `width` is outside 1..=5.
    /// The closed set is driven by the product's reporting needs, not a
    /// general-purpose calendar feature.
    pub fn of(year: i32, width: u8) -> Result<Self, AggregateError> {
        if !(1..=5).contains(&width) {
            return Err(AggregateError::Validation(format!(
                "bucket width must be between 1 and 5 years, got {width}"
            )));
        }
        let width = i32::from(width);
        // div_euclid floors toward negative infinity, so pre-year-0 data
        // still lands in the right bucket.
        let start = year.div_euclid(width) * width;
        Ok(Self {
            start,
            end: start + width - 1,
        })
    }

    /// Renders the bucket for output: a bare year for single-year buckets,
    /// a `"start-end"` range otherwise.
    #[must_use]
    pub fn label(&self) -> String {
        if self.start == self.end {
            self.start.to_string()
        } else {
            format!("{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_contains_its_year_for_all_widths() {
        for year in [-7, 0, 1, 1899, 1990, 1991, 2023] {
            for width in 1..=5u8 {
                let bucket = YearBucket::of(year, width).unwrap();
                assert!(
                    bucket.start <= year && year <= bucket.end,
                    "{year} not in {bucket:?} for width {width}"
                );
                assert_eq!(bucket.end - bucket.start + 1, i32::from(width));
            }
        }
    }

    #[test]
    fn buckets_are_anchored_at_year_zero() {
        assert_eq!(
            YearBucket::of(1991, 2).unwrap(),
            YearBucket {
                start: 1990,
                end: 1991
            }
        );
        assert_eq!(
            YearBucket::of(5, 3).unwrap(),
            YearBucket { start: 3, end: 5 }
        );
        assert_eq!(
            YearBucket::of(6, 3).unwrap(),
            YearBucket { start: 6, end: 8 }
        );
    }

    #[test]
    fn width_one_is_the_trivial_annual_bucket() {
        let bucket = YearBucket::of(1991, 1).unwrap();
        assert_eq!(bucket.start, bucket.end);
        assert_eq!(bucket.label(), "1991");
    }

    #[test]
    fn wide_buckets_render_as_ranges() {
        assert_eq!(YearBucket::of(1991, 2).unwrap().label(), "1990-1991");
        assert_eq!(YearBucket::of(1994, 5).unwrap().label(), "1990-1994");
    }

    #[test]
    fn invalid_widths_are_rejected() {
        assert!(matches!(
            YearBucket::of(1991, 0),
            Err(AggregateError::Validation(_))
        ));
        assert!(matches!(
            YearBucket::of(1991, 6),
            Err(AggregateError::Validation(_))
        ));
    }

    #[test]
    fn negative_years_floor_correctly() {
        let bucket = YearBucket::of(-1, 2).unwrap();
        assert_eq!(
            bucket,
            YearBucket { start: -2, end: -1 }
        );
    }
}
