//! Aggregation of verdicts into summary statistics.
//!
//! A [`Summary`] is always recomputed from the full verdict slice. Rates are
//! left unrounded; only the mean latency is rounded to three decimals.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::types::Verdict;

/// A summary was requested over zero verdicts.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Cannot summarize an empty batch: no verdicts to aggregate")]
pub struct EmptyBatchError;

/// Derived counters over a verdict collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of verdicts
    pub total: usize,

    /// Verdicts whose candidate parsed
    pub valid_count: usize,

    /// Verdicts whose candidate shape-matched its schema
    pub schema_count: usize,

    /// Sum of per-verdict latencies
    pub total_latency: f64,

    /// `valid_count / total`
    pub valid_rate: f64,

    /// `schema_count / total`
    pub schema_rate: f64,

    /// `total_latency / total`, rounded to 3 decimals
    pub mean_latency: f64,
}

/// Reduce verdicts into a [`Summary`].
///
/// # Errors
///
/// Returns [`EmptyBatchError`] when `verdicts` is empty, since no rate is
/// meaningful over zero samples.
pub fn summarize(verdicts: &[Verdict]) -> Result<Summary, EmptyBatchError> {
    if verdicts.is_empty() {
        warn!("summary requested over an empty batch");
        return Err(EmptyBatchError);
    }

    let total = verdicts.len();
    let valid_count = verdicts.iter().filter(|v| v.is_valid).count();
    let schema_count = verdicts.iter().filter(|v| v.matches_schema).count();
    let total_latency: f64 = verdicts.iter().map(|v| v.latency_seconds).sum();

    let summary = Summary {
        total,
        valid_count,
        schema_count,
        total_latency,
        valid_rate: valid_count as f64 / total as f64,
        schema_rate: schema_count as f64 / total as f64,
        mean_latency: round3(total_latency / total as f64),
    };

    info!(
        total,
        valid_rate = summary.valid_rate,
        schema_rate = summary.schema_rate,
        mean_latency = summary.mean_latency,
        "summarized verdicts"
    );

    Ok(summary)
}

/// Round to three decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
