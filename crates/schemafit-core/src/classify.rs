//! Result classification: one candidate text in, one [`Verdict`] out.
//!
//! Classification never fails. Parse errors become an [`ErrorKind`], and a
//! structural mismatch is just `matches_schema = false`.
//!
//! # Quote normalization
//!
//! Models often answer with Python-style dicts (`{'a': 1}`). By default every
//! single quote is rewritten to a double quote before parsing so that such
//! near-JSON output still parses. The rewrite is lossy: an apostrophe inside
//! a string value (`{"name": "O'Brien"}`) becomes a stray quote and the
//! candidate is then reported as unparseable. Disable it with
//! [`Classifier::with_quote_normalization`] when exact-string fidelity
//! matters.

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use crate::shape;
use crate::types::{ErrorKind, Sample, Verdict};

/// Turns candidate text into verdicts.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    normalize_quotes: bool,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            normalize_quotes: true,
        }
    }

    /// Enable or disable the single-to-double quote rewrite.
    pub fn with_quote_normalization(mut self, enabled: bool) -> Self {
        self.normalize_quotes = enabled;
        self
    }

    pub fn normalizes_quotes(&self) -> bool {
        self.normalize_quotes
    }

    /// Trim the candidate and, if enabled, rewrite single quotes.
    pub fn normalize(&self, raw_text: &str) -> String {
        let trimmed = raw_text.trim();
        if self.normalize_quotes {
            trimmed.replace('\'', "\"")
        } else {
            trimmed.to_string()
        }
    }

    /// Classify one candidate against its expected schema.
    ///
    /// `schema` must already be a decoded JSON value.
    pub fn classify(
        &self,
        raw_text: &str,
        schema: &Value,
        elapsed_seconds: f64,
        batch_size: usize,
    ) -> Verdict {
        let text = self.normalize(raw_text);

        let (is_valid, matches_schema, error_kind) = match parse_unbounded(&text) {
            Ok(decoded) => (true, shape::matches(&decoded, schema), ErrorKind::None),
            Err(err) => {
                trace!(error = %err, "candidate failed to parse");
                (false, false, error_kind_of(&text))
            }
        };

        Verdict {
            is_valid,
            matches_schema,
            error_kind,
            latency_seconds: elapsed_seconds,
            batch_size,
            raw_text: text,
        }
    }

    pub fn classify_sample(&self, sample: &Sample) -> Verdict {
        self.classify(
            &sample.raw_text,
            &sample.schema,
            sample.elapsed_seconds,
            sample.batch_size,
        )
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a complete JSON document with no nesting limit.
///
/// The stack grows on demand while deserializing, so deep documents cannot
/// overflow it.
fn parse_unbounded(text: &str) -> Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Classify an unparseable, already-normalized text by its outer characters.
///
/// Empty text has no brace to inspect and is reported as `Invalid`.
fn error_kind_of(text: &str) -> ErrorKind {
    let text = text.trim();
    let (Some(first), Some(last)) = (text.chars().next(), text.chars().next_back()) else {
        return ErrorKind::Invalid;
    };

    if first != '{' {
        ErrorKind::Prefix
    } else if last != '}' {
        ErrorKind::Suffix
    } else {
        ErrorKind::Invalid
    }
}
