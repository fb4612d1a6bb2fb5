//! Generation run driver.
//!
//! Connects a [`Generator`] backend to the batch evaluator: prompts are built
//! from dataset records, sent to the backend `batch_size` at a time, timed,
//! and the resulting candidates classified in dataset order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

use crate::batch::BatchEvaluator;
use crate::config::EvaluatorConfig;
use crate::dataset::{build_prompt, DatasetRecord, GeneratedOutput};
use crate::summary::round3;
use crate::types::{Sample, Verdict};

/// Errors from a generation backend.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation backend failed: {0}")]
    Backend(String),

    #[error("Backend returned {actual} outputs for {expected} prompts")]
    CountMismatch { expected: usize, actual: usize },
}

/// Errors from a generation run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
}

/// A model-serving backend that turns prompts into completions.
///
/// For every prompt the backend returns the list of outputs it produced;
/// only the first output is evaluated.
pub trait Generator {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Generate completions for one batch of prompts.
    fn generate(
        &mut self,
        prompts: &[String],
        batch_size: usize,
    ) -> Result<Vec<Vec<GeneratedOutput>>, GenerationError>;
}

/// What the backend produced for one dataset record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub passage: String,
    pub schema: Value,
    pub generated_text: String,
}

/// Result of [`run`]: generations and verdicts, both in dataset order.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub generations: Vec<GeneratedRecord>,
    pub verdicts: Vec<Verdict>,
}

/// Generate and evaluate a completion for every dataset record.
///
/// Each batch's wall-clock time is split evenly across its prompts.
pub fn run<G: Generator + ?Sized>(
    generator: &mut G,
    records: &[DatasetRecord],
    config: &EvaluatorConfig,
) -> Result<RunOutput, RunError> {
    let batch_size = config.batch_size;
    if batch_size == 0 {
        return Err(RunError::InvalidBatchSize);
    }

    info!(
        backend = generator.name(),
        records = records.len(),
        batch_size,
        "starting generation run"
    );

    let mut generations = Vec::with_capacity(records.len());
    let mut samples = Vec::with_capacity(records.len());

    for (batch_index, chunk) in records.chunks(batch_size).enumerate() {
        let prompts: Vec<String> = chunk
            .iter()
            .map(|r| build_prompt(&r.passage, &r.schema))
            .collect();

        let started = Instant::now();
        let outputs = generator.generate(&prompts, batch_size)?;
        let elapsed = started.elapsed().as_secs_f64();

        if outputs.len() != prompts.len() {
            return Err(GenerationError::CountMismatch {
                expected: prompts.len(),
                actual: outputs.len(),
            }
            .into());
        }

        let per_sample = round3(elapsed / prompts.len() as f64);
        debug!(batch_index, prompts = prompts.len(), elapsed, "batch generated");

        for (record, output) in chunk.iter().zip(outputs) {
            let generated_text = output
                .into_iter()
                .next()
                .map(|o| o.generated_text)
                .unwrap_or_default();

            samples.push(Sample::new(
                generated_text.clone(),
                record.schema.clone(),
                per_sample,
                batch_size,
            ));
            generations.push(GeneratedRecord {
                id: record.id.clone(),
                passage: record.passage.clone(),
                schema: record.schema.clone(),
                generated_text,
            });
        }
    }

    let verdicts = BatchEvaluator::new(config.classifier()).evaluate(samples);
    Ok(RunOutput {
        generations,
        verdicts,
    })
}
