//! The aggregation engine.
//!
//! One engine parameterized by `(mode, bucket width)` replaces the original
//! platform's near-duplicate query methods per width. An invocation runs at
//! most two parameterized queries against the storage backend:
//!
//! 1. per-`(year, label)` sums over the full predicate set;
//! 2. for the per-bucket share modes, per-year totals over the predicate
//!    set minus the label equality, which supply the bucket denominators.
//!    The grand-total mode divides by the sum of the grouped rows instead,
//!    so no second query is needed there.
//!
//! Bucketing and the share arithmetic happen here, not in SQL, so the
//! reduction semantics are unit-testable without a database.

use std::collections::BTreeMap;

use agro_report_analytics_models::{AggregationMode, ChartQuery, StackedDatum};
use chrono::NaiveDate;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::Database;

use crate::bucket::YearBucket;
use crate::predicate::PredicateSet;
use crate::{AggregateError, project};

/// A `(year, label)` group sum as returned by the storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedRow {
    /// Calendar year of the observations.
    pub year: i32,
    /// Observation label.
    pub label: String,
    /// Sum of observation values in the group.
    pub total: i64,
}

/// A per-year total across all labels matching the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearTotal {
    /// Calendar year.
    pub year: i32,
    /// Sum of observation values in the year.
    pub total: i64,
}

/// Runs one aggregation request.
///
/// `today` is the upper date bound used when the request carries only a
/// start date; the caller supplies it so the engine stays deterministic.
///
/// # Errors
///
/// * [`AggregateError::Validation`] — missing `analysis`, malformed date,
///   or bucket width outside 1..=5, raised before any storage access.
/// * [`AggregateError::NotFound`] — no observations match the filters.
/// * [`AggregateError::Upstream`] — the storage backend failed.
pub async fn aggregate(
    db: &dyn Database,
    mode: AggregationMode,
    query: &ChartQuery,
    today: NaiveDate,
) -> Result<Vec<StackedDatum>, AggregateError> {
    // Validates the width up front; the same check guards YearBucket::of.
    YearBucket::of(0, query.bucket_years)?;
    let predicates = PredicateSet::for_query(query, today)?;

    log::debug!(
        "Aggregating {mode} over {} year(s): {query:?}",
        query.bucket_years
    );

    let rows = fetch_grouped(db, &predicates).await?;
    if rows.is_empty() {
        return Err(AggregateError::NotFound);
    }

    // Only the per-bucket share modes need denominators from a second
    // query: per-year totals unnarrowed by the label filter. Sum has no
    // denominator and the grand total comes from the grouped rows
    // themselves (the full predicate set, label included).
    let year_totals = match mode {
        AggregationMode::Sum | AggregationMode::GrandTotalShare => Vec::new(),
        AggregationMode::BucketShare | AggregationMode::LabelShare => {
            fetch_year_totals(db, &predicates.without_label()).await?
        }
    };

    compute(mode, query.bucket_years, &rows, &year_totals)
}

async fn fetch_grouped(
    db: &dyn Database,
    predicates: &PredicateSet,
) -> Result<Vec<GroupedRow>, AggregateError> {
    let (where_clause, params) = predicates.to_sql();
    let sql = format!(
        "SELECT EXTRACT(YEAR FROM period)::int AS year, label, SUM(value)::bigint AS total
         FROM observations
         WHERE {where_clause}
         GROUP BY year, label
         ORDER BY year, label"
    );

    let rows = db.query_raw_params(&sql, &params).await?;

    Ok(rows
        .iter()
        .map(|row| GroupedRow {
            year: row.to_value("year").unwrap_or(0),
            label: row.to_value("label").unwrap_or_default(),
            total: row.to_value("total").unwrap_or(0),
        })
        .collect())
}

async fn fetch_year_totals(
    db: &dyn Database,
    predicates: &PredicateSet,
) -> Result<Vec<YearTotal>, AggregateError> {
    let (where_clause, params) = predicates.to_sql();
    let sql = format!(
        "SELECT EXTRACT(YEAR FROM period)::int AS year, SUM(value)::bigint AS total
         FROM observations
         WHERE {where_clause}
         GROUP BY year
         ORDER BY year"
    );

    let rows = db.query_raw_params(&sql, &params).await?;

    Ok(rows
        .iter()
        .map(|row| YearTotal {
            year: row.to_value("year").unwrap_or(0),
            total: row.to_value("total").unwrap_or(0),
        })
        .collect())
}

/// Reduces grouped rows into ordered stacked chart rows.
///
/// Pure with respect to its inputs: invoking it twice over the same rows
/// yields identical output.
///
/// # Errors
///
/// Returns [`AggregateError::Validation`] if `width` is outside 1..=5, and
/// [`AggregateError::NotFound`] if `rows` is empty — an empty filtered set
/// is classified as "no data", never as an empty result list.
pub fn compute(
    mode: AggregationMode,
    width: u8,
    rows: &[GroupedRow],
    year_totals: &[YearTotal],
) -> Result<Vec<StackedDatum>, AggregateError> {
    if rows.is_empty() {
        return Err(AggregateError::NotFound);
    }

    let mut groups: BTreeMap<(YearBucket, String), i64> = BTreeMap::new();
    for row in rows {
        let bucket = YearBucket::of(row.year, width)?;
        *groups.entry((bucket, row.label.clone())).or_insert(0) += row.total;
    }

    if mode == AggregationMode::Sum {
        #[allow(clippy::cast_precision_loss)]
        return Ok(project::rows(
            groups.into_iter().map(|(key, sum)| (key, sum as f64)),
        ));
    }

    let mut bucket_totals: BTreeMap<YearBucket, i64> = BTreeMap::new();
    for yt in year_totals {
        let bucket = YearBucket::of(yt.year, width)?;
        *bucket_totals.entry(bucket).or_insert(0) += yt.total;
    }
    // The grand total spans all buckets but only rows matching the full
    // predicate set (label included), so grand-total shares sum to ~100
    // across the entire result even when a label filter is present.
    let grand_total: i64 = groups.values().sum();

    let decimals = if mode == AggregationMode::LabelShare {
        4
    } else {
        2
    };

    let mut shares = Vec::with_capacity(groups.len());
    for ((bucket, label), sum) in groups {
        let denominator = match mode {
            AggregationMode::GrandTotalShare => grand_total,
            _ => bucket_totals.get(&bucket).copied().unwrap_or(0),
        };
        // A zero denominator leaves the share undefined; the group is
        // omitted rather than erroring.
        if denominator == 0 {
            continue;
        }
        #[allow(clippy::cast_precision_loss)]
        let share = round_to(sum as f64 / denominator as f64 * 100.0, decimals);
        shares.push(((bucket, label), share));
    }

    Ok(project::rows(shares))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, label: &str, total: i64) -> GroupedRow {
        GroupedRow {
            year,
            label: label.to_string(),
            total,
        }
    }

    /// Per-year totals as the denominator query would return them when the
    /// request has no label filter.
    fn totals_of(rows: &[GroupedRow]) -> Vec<YearTotal> {
        let mut by_year: BTreeMap<i32, i64> = BTreeMap::new();
        for r in rows {
            *by_year.entry(r.year).or_insert(0) += r.total;
        }
        by_year
            .into_iter()
            .map(|(year, total)| YearTotal { year, total })
            .collect()
    }

    fn erosion_1991() -> Vec<GroupedRow> {
        vec![row(1991, "pastagem", 10), row(1991, "cultura", 30)]
    }

    #[test]
    fn sum_annual_groups_by_year_and_label() {
        let out = compute(AggregationMode::Sum, 1, &erosion_1991(), &[]).unwrap();
        assert_eq!(
            out,
            vec![
                StackedDatum {
                    period: "1991".to_string(),
                    entry: ("cultura".to_string(), 30.0),
                },
                StackedDatum {
                    period: "1991".to_string(),
                    entry: ("pastagem".to_string(), 10.0),
                },
            ]
        );
    }

    #[test]
    fn sum_biennial_merges_adjacent_years_per_label() {
        let out = compute(AggregationMode::Sum, 2, &erosion_1991(), &[]).unwrap();
        // floor(1991/2)*2 = 1990, so both rows land in [1990, 1991].
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|d| d.period == "1990-1991"));
    }

    #[test]
    fn sum_conserves_the_total() {
        let rows = vec![
            row(1990, "pastagem", 7),
            row(1991, "pastagem", 10),
            row(1991, "cultura", 30),
            row(1994, "cultura", -5),
        ];
        for width in 1..=5u8 {
            let out = compute(AggregationMode::Sum, width, &rows, &[]).unwrap();
            let total: f64 = out.iter().map(|d| d.entry.1).sum();
            let expected: i64 = rows.iter().map(|r| r.total).sum();
            #[allow(clippy::cast_precision_loss)]
            let expected = expected as f64;
            assert!((total - expected).abs() < f64::EPSILON, "width {width}");
        }
    }

    #[test]
    fn bucket_share_splits_the_bucket_total() {
        let rows = erosion_1991();
        let out = compute(AggregationMode::BucketShare, 1, &rows, &totals_of(&rows)).unwrap();
        assert_eq!(
            out,
            vec![
                StackedDatum {
                    period: "1991".to_string(),
                    entry: ("cultura".to_string(), 75.0),
                },
                StackedDatum {
                    period: "1991".to_string(),
                    entry: ("pastagem".to_string(), 25.0),
                },
            ]
        );
    }

    #[test]
    fn bucket_shares_sum_to_one_hundred_per_bucket() {
        let rows = vec![
            row(1990, "pastagem", 3),
            row(1990, "cultura", 11),
            row(1991, "pastagem", 7),
            row(1991, "cultura", 6),
            row(1993, "pastagem", 1),
        ];
        let out = compute(AggregationMode::BucketShare, 2, &rows, &totals_of(&rows)).unwrap();
        let mut per_bucket: BTreeMap<String, f64> = BTreeMap::new();
        for d in out {
            *per_bucket.entry(d.period).or_insert(0.0) += d.entry.1;
        }
        for (bucket, sum) in per_bucket {
            assert!((sum - 100.0).abs() < 0.1, "bucket {bucket} sums to {sum}");
        }
    }

    #[test]
    fn label_filter_shares_use_the_unfiltered_denominator() {
        // Request filtered to label=pastagem: the grouped rows contain only
        // that label, but the denominators still span all labels.
        let all = erosion_1991();
        let filtered = vec![row(1991, "pastagem", 10)];
        let out =
            compute(AggregationMode::BucketShare, 1, &filtered, &totals_of(&all)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].entry, ("pastagem".to_string(), 25.0));
    }

    #[test]
    fn zero_total_buckets_are_omitted() {
        let rows = vec![
            row(1990, "pastagem", 10),
            row(1990, "cultura", -10),
            row(1991, "pastagem", 5),
        ];
        let out = compute(AggregationMode::BucketShare, 1, &rows, &totals_of(&rows)).unwrap();
        assert!(out.iter().all(|d| d.period == "1991"));
    }

    #[test]
    fn grand_total_shares_sum_to_one_hundred_overall() {
        let rows = vec![
            row(1990, "pastagem", 25),
            row(1991, "cultura", 25),
            row(1994, "pastagem", 50),
        ];
        let out = compute(AggregationMode::GrandTotalShare, 1, &rows, &[]).unwrap();
        let sum: f64 = out.iter().map(|d| d.entry.1).sum();
        assert!((sum - 100.0).abs() < 0.1);
        assert_eq!(out[0].entry.1, 25.0);
    }

    #[test]
    fn label_filtered_grand_total_shares_still_sum_to_one_hundred() {
        // Request filtered to label=pastagem: the denominator spans the
        // filtered rows themselves, not the all-label totals, so the
        // result set as a whole still sums to ~100.
        let filtered = vec![row(1990, "pastagem", 10), row(1991, "pastagem", 30)];
        let out = compute(AggregationMode::GrandTotalShare, 1, &filtered, &[]).unwrap();
        let sum: f64 = out.iter().map(|d| d.entry.1).sum();
        assert!((sum - 100.0).abs() < 0.1);
        assert_eq!(out[0].entry, ("pastagem".to_string(), 25.0));
        assert_eq!(out[1].entry, ("pastagem".to_string(), 75.0));
    }

    #[test]
    fn empty_row_set_is_not_found() {
        for mode in [
            AggregationMode::Sum,
            AggregationMode::BucketShare,
            AggregationMode::GrandTotalShare,
            AggregationMode::LabelShare,
        ] {
            assert!(matches!(
                compute(mode, 1, &[], &[]),
                Err(AggregateError::NotFound)
            ));
        }
    }

    #[test]
    fn label_share_rounds_to_four_decimals() {
        let rows = vec![row(1991, "pastagem", 1), row(1991, "cultura", 2)];
        let out = compute(AggregationMode::LabelShare, 1, &rows, &totals_of(&rows)).unwrap();
        assert_eq!(out[0].entry.1, 66.6667);
        assert_eq!(out[1].entry.1, 33.3333);
    }

    #[test]
    fn output_is_ordered_by_bucket_then_label() {
        let rows = vec![
            row(1994, "cultura", 1),
            row(1990, "pastagem", 2),
            row(1990, "cultura", 3),
        ];
        let out = compute(AggregationMode::Sum, 1, &rows, &[]).unwrap();
        let keys: Vec<(String, String)> = out
            .into_iter()
            .map(|d| (d.period, d.entry.0))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn repeated_computation_is_byte_identical() {
        let rows = vec![
            row(1990, "pastagem", 3),
            row(1991, "cultura", 11),
            row(1995, "pastagem", 7),
        ];
        let totals = totals_of(&rows);
        let first = compute(AggregationMode::BucketShare, 3, &rows, &totals).unwrap();
        let second = compute(AggregationMode::BucketShare, 3, &rows, &totals).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn narrower_requests_yield_a_subset_with_smaller_sums() {
        let rows = vec![
            row(1990, "pastagem", 3),
            row(1990, "cultura", 11),
            row(1991, "pastagem", 7),
        ];
        // An added equality filter can only remove source rows.
        let narrowed: Vec<GroupedRow> =
            rows.iter().filter(|r| r.year == 1990).cloned().collect();

        let wide = compute(AggregationMode::Sum, 1, &rows, &[]).unwrap();
        let narrow = compute(AggregationMode::Sum, 1, &narrowed, &[]).unwrap();

        for d in &narrow {
            let wide_value = wide
                .iter()
                .find(|w| w.period == d.period && w.entry.0 == d.entry.0)
                .map(|w| w.entry.1)
                .unwrap();
            assert!(d.entry.1 <= wide_value);
        }
    }

    #[test]
    fn invalid_width_is_rejected_before_grouping() {
        assert!(matches!(
            compute(AggregationMode::Sum, 0, &erosion_1991(), &[]),
            Err(AggregateError::Validation(_))
        ));
        assert!(matches!(
            compute(AggregationMode::Sum, 6, &erosion_1991(), &[]),
            Err(AggregateError::Validation(_))
        ));
    }
}
