//! Report rendering and persistence.
//!
//! Two outputs hang off a verdict collection: a console table for people and
//! an [`EvaluationReport`] for the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::runner::GeneratedRecord;
use crate::summary::{summarize, EmptyBatchError, Summary};
use crate::types::Verdict;

/// Errors from building or writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    EmptyBatch(#[from] EmptyBatchError),

    #[error("Failed to write report: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Options for the console table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Append a column with each candidate's text
    pub show_generation: bool,
}

/// A persisted evaluation: summary plus every verdict, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub evaluated_at: DateTime<Utc>,
    pub summary: Summary,
    pub verdicts: Vec<Verdict>,
}

impl EvaluationReport {
    /// Summarize `verdicts` and stamp the report with the current time.
    pub fn new(verdicts: Vec<Verdict>) -> Result<Self, EmptyBatchError> {
        let summary = summarize(&verdicts)?;
        Ok(Self {
            evaluated_at: Utc::now(),
            summary,
            verdicts,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as pretty JSON to `path`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn render_table(&self, options: ReportOptions) -> String {
        render_rows(&self.verdicts, &self.summary, options)
    }
}

/// Write verdicts as JSON Lines, one verdict per line.
pub fn write_verdicts_jsonl<W: Write>(writer: W, verdicts: &[Verdict]) -> Result<(), ReportError> {
    write_jsonl(writer, verdicts)
}

/// Write a run's generations as JSON Lines, in dataset order.
pub fn write_generations_jsonl<W: Write>(
    writer: W,
    generations: &[GeneratedRecord],
) -> Result<(), ReportError> {
    write_jsonl(writer, generations)
}

fn write_jsonl<W: Write, T: Serialize>(mut writer: W, items: &[T]) -> Result<(), ReportError> {
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Render the console table for a verdict collection.
///
/// # Errors
///
/// Refuses an empty collection with [`EmptyBatchError`].
pub fn render_table(verdicts: &[Verdict], options: ReportOptions) -> Result<String, EmptyBatchError> {
    let summary = summarize(verdicts)?;
    Ok(render_rows(verdicts, &summary, options))
}

const VALID_HEADER: &str = "Valid (✅/❌)";
const SCHEMA_HEADER: &str = "Matches Schema (✅/❌)";

fn mark(flag: bool) -> &'static str {
    if flag {
        "✅"
    } else {
        "❌"
    }
}

fn render_rows(verdicts: &[Verdict], summary: &Summary, options: ReportOptions) -> String {
    let mut header = vec![
        VALID_HEADER.to_string(),
        SCHEMA_HEADER.to_string(),
        "Batch Size".to_string(),
        "Time (s)".to_string(),
        "Error".to_string(),
    ];
    if options.show_generation {
        header.push("Generation".to_string());
    }

    let mut rows: Vec<Vec<String>> = verdicts
        .iter()
        .map(|v| {
            let mut row = vec![
                mark(v.is_valid).to_string(),
                mark(v.matches_schema).to_string(),
                v.batch_size.to_string(),
                format!("{:?}", v.latency_seconds),
                v.error_kind.label().to_string(),
            ];
            if options.show_generation {
                row.push(v.raw_text.replace(['\r', '\n'], " "));
            }
            row
        })
        .collect();

    let dash = |row: &mut Vec<String>| {
        if options.show_generation {
            row.push("-".to_string());
        }
    };

    let mut separator = vec!["-".to_string(); 5];
    dash(&mut separator);
    rows.push(separator);

    let mut footer = vec![
        format!("Accuracy: {:?}", summary.valid_rate),
        format!("Accuracy: {:?}", summary.schema_rate),
        "-".to_string(),
        format!("Average: {:?}", summary.mean_latency),
        "-".to_string(),
    ];
    dash(&mut footer);
    rows.push(footer);

    Table { header, rows }.render()
}

struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.header.len())
            .map(|col| {
                std::iter::once(&self.header)
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(col))
                    .map(|cell| display_width(cell))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let rule = {
            let mut line = String::from("+");
            for width in &widths {
                line.push_str(&"-".repeat(width + 2));
                line.push('+');
            }
            line
        };

        let mut out = String::new();
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&render_line(&self.header, &widths));
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_line(row, &widths));
            out.push('\n');
        }
        out.push_str(&rule);
        out
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width.saturating_sub(display_width(cell));
        let left = pad / 2;
        let right = pad - left;
        line.push(' ');
        line.push_str(&" ".repeat(left));
        line.push_str(cell);
        line.push_str(&" ".repeat(right));
        line.push_str(" |");
    }
    line
}

/// Terminal column width, counting the check/cross emoji as two columns.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| match c as u32 {
            0x2705 | 0x274C | 0x1F300..=0x1FAFF => 2,
            _ => 1,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    fn verdicts() -> Vec<Verdict> {
        vec![
            Verdict {
                is_valid: true,
                matches_schema: true,
                error_kind: ErrorKind::None,
                latency_seconds: 1.0,
                batch_size: 2,
                raw_text: "{\"a\": 1}".to_string(),
            },
            Verdict {
                is_valid: false,
                matches_schema: false,
                error_kind: ErrorKind::Prefix,
                latency_seconds: 3.0,
                batch_size: 2,
                raw_text: "Sure!\n{\"a\": 1}".to_string(),
            },
        ]
    }

    #[test]
    fn test_table_has_rows_and_footer() {
        let table = render_table(&verdicts(), ReportOptions::default()).unwrap();
        assert!(table.contains(VALID_HEADER));
        assert!(table.contains("prefix"));
        assert!(table.contains("none"));
        assert!(table.contains("Accuracy: 0.5"));
        assert!(table.contains("Average: 2.0"));
        assert!(table.contains(" 1.0 "));
        assert!(table.contains(" 3.0 "));
        assert!(!table.contains("Generation"));
        // rule + header + rule + 2 rows + separator + footer + rule
        assert_eq!(table.lines().count(), 8);
    }

    #[test]
    fn test_table_lines_are_aligned() {
        let table = render_table(&verdicts(), ReportOptions::default()).unwrap();
        let widths: Vec<usize> = table.lines().map(display_width).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_generation_column_is_opt_in() {
        let options = ReportOptions {
            show_generation: true,
        };
        let table = render_table(&verdicts(), options).unwrap();
        assert!(table.contains("Generation"));
        assert!(table.contains("Sure! {\"a\": 1}"));
    }

    #[test]
    fn test_empty_table_refused() {
        assert!(render_table(&[], ReportOptions::default()).is_err());
    }

    #[test]
    fn test_report_serializes_with_camel_case() {
        let report = EvaluationReport::new(verdicts()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["summary"]["validCount"], 1);
        assert_eq!(value["verdicts"][1]["errorKind"], "prefix");
        assert!(value["evaluatedAt"].is_string());
    }

    #[test]
    fn test_report_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        EvaluationReport::new(verdicts()).unwrap().write_json(&path).unwrap();

        let read: EvaluationReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.verdicts, verdicts());
        assert_eq!(read.summary.total, 2);
    }

    #[test]
    fn test_verdicts_jsonl() {
        let mut buf = Vec::new();
        write_verdicts_jsonl(&mut buf, &verdicts()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"isValid\":true"));
    }

    #[test]
    fn test_whole_number_rates_keep_decimal_point() {
        let mut all_valid = verdicts();
        all_valid.truncate(1);
        let table = render_table(&all_valid, ReportOptions::default()).unwrap();
        assert!(table.contains("Accuracy: 1.0"));
        assert!(table.contains("Average: 1.0"));
    }

    #[test]
    fn test_generations_jsonl_round_trip() {
        let generations = vec![
            GeneratedRecord {
                id: Some("r0".to_string()),
                passage: "Bob is 30.".to_string(),
                schema: serde_json::json!({"name": "str"}),
                generated_text: "{\"name\": \"Bob\"}".to_string(),
            },
            GeneratedRecord {
                id: None,
                passage: "Nothing.".to_string(),
                schema: serde_json::json!({}),
                generated_text: String::new(),
            },
        ];

        let mut buf = Vec::new();
        write_generations_jsonl(&mut buf, &generations).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let read: Vec<GeneratedRecord> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(read, generations);
        assert!(!text.lines().nth(1).unwrap().contains("\"id\""));
    }

    #[test]
    fn test_display_width_counts_emoji_as_two() {
        assert_eq!(display_width("✅"), 2);
        assert_eq!(display_width("ab"), 2);
    }
}
