//! Houses the `calculate` function
//!
use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::borrow::Cow;
use std::io;
use std::path::PathBuf;

use crate::algebra::{Outcome, SetOp};
use crate::args::Output;
use crate::io::{first_and_second, line_set_from_path, line_set_of, output_info, read_operand};
use crate::json::{JsonError, JsonFacade};

/// Calculates and prints the set operation named by `operation`, treating the
/// first and second file in `files` as sets of lines:
///
/// * `SetOp::Union` prints the lines that occur in either file,
/// * `SetOp::Intersect` prints the lines that occur in both files,
/// * `SetOp::Diff` prints the lines that occur in the first file but not the second,
/// * `SetOp::SymDiff` prints the lines that occur in exactly one file,
/// * `SetOp::Subset` prints whether every line of the first file is in the second, and
/// * `SetOp::Superset` prints whether every line of the second file is in the first.
///
/// Lines are printed in sorted (byte) order. A missing operand is an error.
pub fn calculate(
    operation: SetOp,
    files: &[PathBuf],
    output: &Output,
    mut out: impl io::Write,
) -> Result<()> {
    let (first_path, second_path) = first_and_second(files);

    // The first operand is read into memory in its entirety so its lines can be
    // borrowed, and so we can echo its Byte Order Mark and line terminator. For
    // the second we only keep its distinct lines.
    let first_contents = first_path.map(read_operand).transpose()?;
    let first = first_contents.as_deref().map(line_set_of);
    let second = second_path.map(line_set_from_path).transpose()?;

    let outcome = operation.apply_checked(first.as_ref(), second.as_ref())?;
    if let Outcome::Set(set) = &outcome {
        log::debug!("{operation}: {} lines in result", set.len());
    }

    match output {
        Output::Lines => match outcome {
            Outcome::Set(set) => {
                let info = output_info(first_contents.as_deref().unwrap_or_default());
                info.write_lines(set.iter().map(Cow::as_ref), out)
            }
            Outcome::Verdict(verdict) => {
                writeln!(out, "{verdict}")?;
                out.flush()?;
                Ok(())
            }
        },
        Output::Json { facade, timestamp } => {
            let report = Report::new(operation, files, &outcome, *timestamp, facade)?;
            writeln!(out, "{}", facade.to_json(&report)?)?;
            out.flush()?;
            Ok(())
        }
    }
}

/// What `--format json` prints
#[derive(Debug, Serialize)]
struct Report {
    operation: &'static str,
    operands: Vec<String>,
    result: ReportResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ReportResult {
    Lines(Vec<String>),
    Verdict(bool),
}

impl Report {
    fn new(
        operation: SetOp,
        files: &[PathBuf],
        outcome: &Outcome<Cow<'_, [u8]>>,
        timestamp: bool,
        facade: &JsonFacade,
    ) -> Result<Report, JsonError> {
        let result = match outcome {
            Outcome::Set(set) => ReportResult::Lines(
                set.iter().map(|line| String::from_utf8_lossy(line).into_owned()).collect(),
            ),
            Outcome::Verdict(verdict) => ReportResult::Verdict(*verdict),
        };
        let generated_at =
            timestamp.then(|| facade.format_date(&Local::now().naive_local())).transpose()?;
        Ok(Report {
            operation: operation.name(),
            operands: files.iter().map(|f| f.display().to_string()).collect(),
            result,
            generated_at,
        })
    }
}
