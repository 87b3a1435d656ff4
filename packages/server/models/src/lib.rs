#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the agro-report server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the engine's own types so the API contract can evolve independently.

use agro_report_analytics_models::ChartQuery;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Flat query parameters for the chart endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartQueryParams {
    /// Analysis type (required; its absence is a 400).
    pub analysis: Option<String>,
    /// Label within the analysis.
    pub label: Option<String>,
    /// Start date, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// End date, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Country code.
    pub country: Option<String>,
    /// State code.
    pub state: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// Research source.
    pub source: Option<String>,
    /// Bucket width in years, 1-5. Defaults to 1 (annual).
    pub bucket_years: Option<u8>,
}

impl From<ChartQueryParams> for ChartQuery {
    fn from(params: ChartQueryParams) -> Self {
        Self {
            analysis: params.analysis,
            label: params.label,
            start_date: params.start_date,
            end_date: params.end_date,
            country: params.country,
            state: params.state,
            city: params.city,
            source: params.source,
            bucket_years: params.bucket_years.unwrap_or(1),
        }
    }
}

/// Query parameters for the label menu endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelMenuParams {
    /// The analysis whose labels should be returned.
    pub analysis: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_years_defaults_to_annual() {
        let params = ChartQueryParams {
            analysis: Some("erosão".to_string()),
            label: None,
            start_date: None,
            end_date: None,
            country: None,
            state: None,
            city: None,
            source: None,
            bucket_years: None,
        };
        let query: ChartQuery = params.into();
        assert_eq!(query.bucket_years, 1);
    }
}
