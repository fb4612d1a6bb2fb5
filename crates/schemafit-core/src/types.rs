//! Core types for schemafit evaluations.
//!
//! Field names on the wire follow the camelCase layout the persistence and
//! presentation layers expect (`isValid`, `matchesSchema`, `errorKind`,
//! `latencySeconds`, `batchSize`, `rawText`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a candidate failed to parse as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The candidate parsed.
    #[default]
    None,

    /// Text before the opening brace (or no opening brace at all).
    Prefix,

    /// Opens with a brace but does not close with one.
    Suffix,

    /// Braces are in place; something inside does not parse.
    Invalid,
}

impl ErrorKind {
    /// Display label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::None => "none",
            ErrorKind::Prefix => "prefix",
            ErrorKind::Suffix => "suffix",
            ErrorKind::Invalid => "invalid",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, ErrorKind::None)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The immutable per-sample evaluation outcome.
///
/// Built once by [`crate::Classifier::classify`] and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// The candidate parsed as JSON
    pub is_valid: bool,

    /// Parsed and shape-matches the schema
    pub matches_schema: bool,

    /// Failure classification; `None` whenever `is_valid` is true
    pub error_kind: ErrorKind,

    /// Wall-clock time attributed to producing the candidate
    pub latency_seconds: f64,

    /// Batch size in effect when the candidate was generated
    pub batch_size: usize,

    /// The candidate text as it was handed to the JSON parser
    pub raw_text: String,
}

/// One input to the batch evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub raw_text: String,
    pub schema: serde_json::Value,
    pub elapsed_seconds: f64,
    pub batch_size: usize,
}

impl Sample {
    pub fn new(
        raw_text: impl Into<String>,
        schema: serde_json::Value,
        elapsed_seconds: f64,
        batch_size: usize,
    ) -> Self {
        Self {
            raw_text: raw_text.into(),
            schema,
            elapsed_seconds,
            batch_size,
        }
    }
}
