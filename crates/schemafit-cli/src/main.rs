//! `schemafit` command-line front-end.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use schemafit_core::{
    build_prompt, load_dataset, load_samples, matches, write_verdicts_jsonl, BatchEvaluator,
    EvaluationReport, EvaluatorConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "schemafit", version, about = "Evaluate generated JSON against target schemas")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify pre-generated samples and print a report table
    Evaluate(EvaluateArgs),

    /// Render the extraction prompt for each dataset record as JSON Lines
    Prompts {
        /// Dataset file (JSON Lines with `passage` and `schema`)
        dataset: PathBuf,
    },

    /// Shape-match one JSON file against another; exits 1 on mismatch
    Match {
        /// Candidate JSON file
        output: PathBuf,

        /// Schema JSON file
        schema: PathBuf,
    },
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Samples file (JSON Lines with `generated_text` and `schema`)
    samples: PathBuf,

    /// Config file (YAML, or JSON by extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Include each candidate's text in the table
    #[arg(long)]
    show_generation: bool,

    /// Parse candidates exactly as given, without rewriting single quotes
    #[arg(long)]
    no_quote_normalization: bool,

    /// Write the full report as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write verdicts as JSON Lines
    #[arg(long)]
    verdicts: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Evaluate(args) => evaluate(args),
        Command::Prompts { dataset } => prompts(dataset),
        Command::Match { output, schema } => shape_match(output, schema),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn evaluate(args: EvaluateArgs) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => EvaluatorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EvaluatorConfig::default(),
    };
    if args.show_generation {
        config.show_generation = true;
    }
    if args.no_quote_normalization {
        config.normalize_quotes = false;
    }

    let records = load_samples(&args.samples)
        .with_context(|| format!("Failed to load samples {}", args.samples.display()))?;
    info!(samples = records.len(), path = %args.samples.display(), "loaded samples");

    let evaluator = BatchEvaluator::new(config.classifier());
    let verdicts = evaluator.evaluate(records.into_iter().map(|r| r.into_sample()));

    let report = EvaluationReport::new(verdicts).context("Nothing to report")?;

    if let Some(path) = &args.verdicts {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_verdicts_jsonl(BufWriter::new(file), &report.verdicts)?;
        info!(path = %path.display(), "wrote verdicts");
    }

    println!("{}", report.render_table(config.report_options()));

    if let Some(path) = &args.output {
        report.write_json(path)?;
        info!(path = %path.display(), "wrote report");
    }

    Ok(ExitCode::SUCCESS)
}

fn prompts(dataset: PathBuf) -> Result<ExitCode> {
    let records = load_dataset(&dataset)
        .with_context(|| format!("Failed to load dataset {}", dataset.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (index, record) in records.iter().enumerate() {
        let line = serde_json::json!({
            "index": index,
            "id": record.id,
            "prompt": build_prompt(&record.passage, &record.schema),
        });
        serde_json::to_writer(&mut out, &line)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    Ok(ExitCode::SUCCESS)
}

fn shape_match(output: PathBuf, schema: PathBuf) -> Result<ExitCode> {
    let read = |path: &PathBuf| -> Result<serde_json::Value> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
    };

    let candidate = read(&output)?;
    let target = read(&schema)?;

    if matches(&candidate, &target) {
        println!("match");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("mismatch");
        Ok(ExitCode::FAILURE)
    }
}
