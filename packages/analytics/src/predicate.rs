//! Typed predicate construction for the observation fact table.
//!
//! An aggregation request is normalized into a list of tagged predicates
//! (`Equals`, `Between`) that render to `$n` placeholder fragments plus a
//! parallel parameter list. Filter values are always bound as parameters,
//! never interpolated into the SQL text.

use agro_report_analytics_models::ChartQuery;
use chrono::NaiveDate;
use switchy_database::DatabaseValue;

use crate::AggregateError;

/// Lower bound applied when only an end date is given.
const EPOCH_FLOOR: &str = "1900-01-01";

/// A filterable dimension of the observation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Analysis type.
    Analysis,
    /// Label within the analysis.
    Label,
    /// Country code.
    Country,
    /// State code.
    State,
    /// City name.
    City,
    /// Research source.
    Source,
    /// Observation date.
    Period,
}

impl Field {
    const fn column(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Label => "label",
            Self::Country => "country",
            Self::State => "state",
            Self::City => "city",
            Self::Source => "source",
            Self::Period => "period",
        }
    }
}

/// A single normalized constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact match on a dimension value.
    Equals(Field, String),
    /// Inclusive date range.
    Between(Field, NaiveDate, NaiveDate),
}

/// The normalized, conjunctive (AND) constraint set for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    /// Builds the predicate set for an aggregation request.
    ///
    /// `today` is the upper date bound applied when only a start date is
    /// given. It is caller-supplied rather than read from the ambient clock
    /// so identical requests against unchanged data stay reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::Validation`] if `analysis` is missing or
    /// blank, or if a date string is not `YYYY-MM-DD`.
    pub fn for_query(query: &ChartQuery, today: NaiveDate) -> Result<Self, AggregateError> {
        let analysis = query
            .analysis
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                AggregateError::Validation("required parameter missing: analysis".to_string())
            })?;

        let mut predicates = vec![Predicate::Equals(Field::Analysis, analysis.to_string())];

        for (field, value) in [
            (Field::Label, &query.label),
            (Field::Country, &query.country),
            (Field::State, &query.state),
            (Field::City, &query.city),
            (Field::Source, &query.source),
        ] {
            if let Some(value) = value {
                predicates.push(Predicate::Equals(field, value.clone()));
            }
        }

        let start = query.start_date.as_deref().map(parse_date).transpose()?;
        let end = query.end_date.as_deref().map(parse_date).transpose()?;
        match (start, end) {
            (Some(start), Some(end)) => {
                predicates.push(Predicate::Between(Field::Period, start, end));
            }
            // Open-ended window: data up to the evaluation date.
            (Some(start), None) => {
                predicates.push(Predicate::Between(Field::Period, start, today));
            }
            (None, Some(end)) => {
                let floor = parse_date(EPOCH_FLOOR).unwrap_or_default();
                predicates.push(Predicate::Between(Field::Period, floor, end));
            }
            (None, None) => {}
        }

        Ok(Self { predicates })
    }

    /// Returns a copy of this set with the label equality removed.
    ///
    /// Share denominators span all labels within a bucket, so the
    /// denominator query must not be narrowed by the request's label filter.
    #[must_use]
    pub fn without_label(&self) -> Self {
        Self {
            predicates: self
                .predicates
                .iter()
                .filter(|p| !matches!(p, Predicate::Equals(Field::Label, _)))
                .cloned()
                .collect(),
        }
    }

    /// Returns the predicates in this set.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Renders the set to a `WHERE` clause body and bound parameters.
    ///
    /// Placeholders are numbered from `$1`. The fragments join with ` AND `.
    #[must_use]
    pub fn to_sql(&self) -> (String, Vec<DatabaseValue>) {
        let mut frags = Vec::with_capacity(self.predicates.len());
        let mut params = Vec::new();
        let mut idx = 1u32;

        for predicate in &self.predicates {
            match predicate {
                Predicate::Equals(field, value) => {
                    frags.push(format!("{} = ${idx}", field.column()));
                    params.push(DatabaseValue::String(value.clone()));
                    idx += 1;
                }
                Predicate::Between(field, lo, hi) => {
                    frags.push(format!(
                        "{} BETWEEN ${idx} AND ${}",
                        field.column(),
                        idx + 1
                    ));
                    params.push(date_param(*lo));
                    params.push(date_param(*hi));
                    idx += 2;
                }
            }
        }

        (frags.join(" AND "), params)
    }
}

/// Binds a date as a midnight timestamp; Postgres cannot decode raw UTF-8
/// bytes as a binary date parameter.
fn date_param(date: NaiveDate) -> DatabaseValue {
    DatabaseValue::DateTime(date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

fn parse_date(s: &str) -> Result<NaiveDate, AggregateError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        AggregateError::Validation(format!("invalid date '{s}': {e}. Expected format: YYYY-MM-DD"))
    })
}
