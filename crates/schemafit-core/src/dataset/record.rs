//! JSON Lines records for datasets and pre-generated samples.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::types::Sample;

/// Errors that can occur when loading datasets or samples.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read input: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse line {line}: {source}")]
    JsonError {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required field on line {line}: {field}")]
    MissingField { line: usize, field: String },
}

/// One item the backend returns for a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedOutput {
    pub generated_text: String,
}

impl GeneratedOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            generated_text: text.into(),
        }
    }
}

/// A source passage and the schema a model should extract from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Optional caller-supplied identifier
    #[serde(default)]
    pub id: Option<String>,

    pub passage: String,

    /// Expected shape of the extraction
    pub schema: Value,
}

/// A candidate produced earlier, ready to be classified.
///
/// The candidate comes from `generated_text`, or else from the first entry
/// of a backend `generation` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    #[serde(default)]
    pub generated_text: Option<String>,

    #[serde(default)]
    pub generation: Option<Vec<GeneratedOutput>>,

    pub schema: Value,

    #[serde(default)]
    pub elapsed_seconds: f64,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    1
}

impl SampleRecord {
    /// The candidate text; an empty envelope yields the empty string.
    pub fn candidate_text(&self) -> &str {
        if let Some(text) = &self.generated_text {
            return text;
        }
        self.generation
            .as_deref()
            .and_then(|outputs| outputs.first())
            .map(|output| output.generated_text.as_str())
            .unwrap_or("")
    }

    pub fn into_sample(self) -> Sample {
        let raw_text = self.candidate_text().to_string();
        Sample {
            raw_text,
            schema: self.schema,
            elapsed_seconds: self.elapsed_seconds,
            batch_size: self.batch_size,
        }
    }
}

/// Parse JSON Lines, skipping blank lines. Line numbers are 1-based.
fn read_jsonl<T, R>(reader: R) -> Result<Vec<(usize, T)>, DatasetError>
where
    T: DeserializeOwned,
    R: BufRead,
{
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        if line.trim().is_empty() {
            debug!(line = number, "skipping blank line");
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| DatasetError::JsonError {
            line: number,
            source,
        })?;
        records.push((number, record));
    }
    Ok(records)
}

/// Read dataset records from a JSON Lines reader.
pub fn read_dataset<R: BufRead>(reader: R) -> Result<Vec<DatasetRecord>, DatasetError> {
    Ok(read_jsonl(reader)?.into_iter().map(|(_, r)| r).collect())
}

pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<DatasetRecord>, DatasetError> {
    read_dataset(BufReader::new(File::open(path)?))
}

/// Read pre-generated samples from a JSON Lines reader.
///
/// Every line must carry either `generated_text` or `generation`.
pub fn read_samples<R: BufRead>(reader: R) -> Result<Vec<SampleRecord>, DatasetError> {
    read_jsonl::<SampleRecord, _>(reader)?
        .into_iter()
        .map(|(line, record)| {
            if record.generated_text.is_none() && record.generation.is_none() {
                return Err(DatasetError::MissingField {
                    line,
                    field: "generated_text".to_string(),
                });
            }
            Ok(record)
        })
        .collect()
}

pub fn load_samples(path: impl AsRef<Path>) -> Result<Vec<SampleRecord>, DatasetError> {
    read_samples(BufReader::new(File::open(path)?))
}
