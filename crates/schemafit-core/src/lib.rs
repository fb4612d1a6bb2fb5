//! # schemafit-core
//!
//! Schema-conformance evaluation for generated JSON.
//!
//! Given free-text candidates from a generative model and the schema each
//! one was asked to follow, this crate answers:
//! - Did the candidate parse as JSON?
//! - Does it have the expected shape?
//! - If it did not parse, how did it fail?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same verdict
//! 2. **Total**: Classification never fails; malformed text becomes an error kind
//! 3. **Order-preserving**: One verdict per sample, in input order
//! 4. **Shallow shape**: Key sets and object nesting are compared; scalar
//!    types and array contents are not
//!
//! ## Example
//!
//! ```rust
//! use schemafit_core::{evaluate_batch, summarize, Sample};
//! use serde_json::json;
//!
//! let samples = vec![
//!     Sample::new(r#"{"name": "Bob"}"#, json!({"name": "str"}), 0.8, 1),
//!     Sample::new(r#"Here you go: {"name": "Ann"}"#, json!({"name": "str"}), 1.2, 1),
//! ];
//! let verdicts = evaluate_batch(samples);
//! let summary = summarize(&verdicts).unwrap();
//!
//! assert_eq!(summary.valid_count, 1);
//! assert_eq!(summary.mean_latency, 1.0);
//! ```

pub mod batch;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod report;
pub mod runner;
pub mod shape;
pub mod summary;
pub mod types;

// Re-export main types at crate root
pub use batch::{evaluate_batch, BatchEvaluator};
pub use classify::Classifier;
pub use config::{ConfigError, EvaluatorConfig};
pub use dataset::{
    build_prompt, load_dataset, load_samples, DatasetError, DatasetRecord, GeneratedOutput,
    SampleRecord,
};
pub use report::{
    render_table, write_generations_jsonl, write_verdicts_jsonl, EvaluationReport, ReportError,
    ReportOptions,
};
pub use runner::{run, GeneratedRecord, GenerationError, Generator, RunError, RunOutput};
pub use shape::{matches, JsonKind};
pub use summary::{summarize, EmptyBatchError, Summary};
pub use types::{ErrorKind, Sample, Verdict};

/// Classify one candidate against its schema with default settings.
///
/// Single quotes are rewritten to double quotes before parsing; use
/// [`Classifier`] directly to turn that off.
pub fn classify(
    raw_text: &str,
    schema: &serde_json::Value,
    elapsed_seconds: f64,
    batch_size: usize,
) -> Verdict {
    Classifier::new().classify(raw_text, schema, elapsed_seconds, batch_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_end_to_end_evaluation() {
        let schema = json!({"person": {"name": "str", "age": "int"}, "tags": []});
        let samples = vec![
            Sample::new(r#"{"person": {"name": "Bob", "age": 30}, "tags": ["a"]}"#, schema.clone(), 1.0, 2),
            Sample::new(r#"{"person": {"name": "Bob"}, "tags": []}"#, schema.clone(), 2.0, 2),
            Sample::new(r#"{"person": {"name": "Bob", "age": 30}, "tags": [}"#, schema.clone(), 3.0, 2),
            Sample::new("I cannot help with that.", schema, 4.0, 2),
        ];

        let verdicts = evaluate_batch(samples);
        let kinds: Vec<ErrorKind> = verdicts.iter().map(|v| v.error_kind).collect();
        assert_eq!(
            kinds,
            vec![ErrorKind::None, ErrorKind::None, ErrorKind::Invalid, ErrorKind::Prefix]
        );

        let summary = summarize(&verdicts).unwrap();
        assert_eq!(summary.valid_count, 2);
        assert_eq!(summary.schema_count, 1);
        assert_eq!(summary.valid_rate, 0.5);
        assert_eq!(summary.schema_rate, 0.25);
        assert_eq!(summary.mean_latency, 2.5);
    }

    #[test]
    fn test_classify_helper() {
        let verdict = classify("{'a': 1}", &json!({"a": 0}), 0.1, 1);
        assert!(verdict.matches_schema);
    }
}
