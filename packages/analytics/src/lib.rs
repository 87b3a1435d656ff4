#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Time-bucketed aggregation engine for agro-report observations.
//!
//! Turns a filtered set of dated numeric observations into grouped sums and
//! percentage shares over multi-year buckets (1 through 5 years wide). The
//! engine is stateless and read-only: it builds a typed predicate set from
//! the request, runs parameterized SQL against the storage backend, groups
//! the returned rows by year bucket, and reduces them according to the
//! requested [`AggregationMode`](agro_report_analytics_models::AggregationMode).

pub mod bucket;
pub mod engine;
pub mod predicate;
pub mod project;

use thiserror::Error;

/// Errors that can occur during aggregation.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// A required parameter is missing or invalid. Fatal to the request;
    /// raised before any storage access.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The request is well-formed but no observations match its filters.
    /// A normal, expected outcome, not a fault.
    #[error("No observations match the given filters")]
    NotFound,

    /// The storage backend failed or timed out. The caller may retry; the
    /// engine itself does not. Backend internals are reachable via
    /// `source()` for logging but are not part of the message.
    #[error("Storage backend unavailable")]
    Upstream(#[from] switchy_database::DatabaseError),
}
