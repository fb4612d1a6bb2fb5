//! Batch evaluation: classify an ordered run of samples.
//!
//! Output order always equals input order. Batch size on each sample is a
//! label describing the upstream generation request; no grouping happens
//! here.

use tracing::{debug, info};

use crate::classify::Classifier;
use crate::types::{Sample, Verdict};

/// Drives the [`Classifier`] over a sequence of samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchEvaluator {
    classifier: Classifier,
}

impl BatchEvaluator {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classify every sample, one verdict per sample, in input order.
    ///
    /// An empty input yields an empty output.
    pub fn evaluate<I>(&self, samples: I) -> Vec<Verdict>
    where
        I: IntoIterator<Item = Sample>,
    {
        let verdicts: Vec<Verdict> = samples
            .into_iter()
            .enumerate()
            .map(|(index, sample)| {
                let verdict = self.classifier.classify_sample(&sample);
                debug!(
                    index,
                    is_valid = verdict.is_valid,
                    matches_schema = verdict.matches_schema,
                    error_kind = %verdict.error_kind,
                    "classified sample"
                );
                verdict
            })
            .collect();

        info!(samples = verdicts.len(), "batch evaluated");
        verdicts
    }
}

/// Classify samples with the default classifier.
pub fn evaluate_batch<I>(samples: I) -> Vec<Verdict>
where
    I: IntoIterator<Item = Sample>,
{
    BatchEvaluator::default().evaluate(samples)
}
