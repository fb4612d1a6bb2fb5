//! Dataset and sample loading.
//!
//! Both inputs are JSON Lines files. A dataset line pairs a source passage
//! with the schema to extract from it; a sample line carries a candidate the
//! backend already produced.

mod prompt;
mod record;

pub use prompt::build_prompt;
pub use record::{
    load_dataset, load_samples, read_dataset, read_samples, DatasetError, DatasetRecord,
    GeneratedOutput, SampleRecord,
};
