//! Result projection.
//!
//! Maps reduced `(bucket, label, value)` groups into the external stacked
//! chart shape. Rounding happens in the engine before projection, so
//! projecting the same groups twice yields identical output.

use agro_report_analytics_models::StackedDatum;

use crate::bucket::YearBucket;

/// Projects ordered groups into stacked chart rows.
///
/// The caller provides groups in bucket-ascending, label-ascending order
/// (a `BTreeMap` keyed by `(YearBucket, label)` iterates exactly that way).
pub fn rows<I>(groups: I) -> Vec<StackedDatum>
where
    I: IntoIterator<Item = ((YearBucket, String), f64)>,
{
    groups
        .into_iter()
        .map(|((bucket, label), value)| StackedDatum {
            period: bucket.label(),
            entry: (label, value),
        })
        .collect()
}
