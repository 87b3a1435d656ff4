#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation request and result types for agro-report analytics.
//!
//! These types define the contract of the aggregation engine: the filter
//! parameters of a query, the aggregation mode, and the stacked-chart row
//! shape returned to the API layer.

use serde::{Deserialize, Serialize};

/// How grouped observation values are reduced within each year bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Plain sum per `(bucket, label)` group.
    Sum,
    /// Each group's percentage of its own bucket's total, 2 decimal places.
    /// Shares within one bucket sum to ~100.
    BucketShare,
    /// Each group's percentage of the total across *all* buckets matching
    /// the filters, 2 decimal places. Shares across the whole result sum
    /// to ~100.
    GrandTotalShare,
    /// Each label's percentage contribution to its bucket, 4 decimal
    /// places. The original platform called this a "moving average" even
    /// though no sliding window is computed.
    LabelShare,
}

impl std::fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sum => write!(f, "sum"),
            Self::BucketShare => write!(f, "bucket share"),
            Self::GrandTotalShare => write!(f, "grand-total share"),
            Self::LabelShare => write!(f, "label share"),
        }
    }
}

/// Filter parameters for one aggregation query.
///
/// `analysis` is the only required filter; every other field narrows the
/// observation set when present and imposes no constraint when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartQuery {
    /// Analysis type (erosão, GEE, NH3, NPK, orgânicas, pesticidas,
    /// poluição). Required.
    pub analysis: Option<String>,
    /// Label within the analysis.
    pub label: Option<String>,
    /// Start date (`YYYY-MM-DD`). When given without `end_date`, the upper
    /// bound defaults to the evaluation date.
    pub start_date: Option<String>,
    /// End date (`YYYY-MM-DD`). When given without `start_date`, the lower
    /// bound defaults to 1900-01-01.
    pub end_date: Option<String>,
    /// Country code (ISO 3166-1 alpha-2).
    pub country: Option<String>,
    /// State code (ISO 3166-2).
    pub state: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// Research source (OCDE, IAC, UNB, ...).
    pub source: Option<String>,
    /// Bucket width in calendar years, 1 through 5.
    pub bucket_years: u8,
}

/// One row of a stacked chart: a period label and a `(label, value)` entry.
///
/// Serializes to `{ "period": "1990-1991", "entry": ["pastagem", 42.0] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackedDatum {
    /// The bucket this row belongs to: a bare year for width 1, or a
    /// `"start-end"` range for wider buckets.
    pub period: String,
    /// Label and aggregated value.
    pub entry: (String, f64),
}
