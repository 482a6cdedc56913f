//! Code to parse the command line using `clap`, merge it with defaults from an
//! optional properties file, and definitions of the parsed result
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::algebra::SetOp;
use crate::config::{invalid, Properties};
use crate::json::{check_date_format, FieldNaming, JsonFacade};

/// Returns the parsed command line, with anything it leaves unsaid filled in
/// from the `--config` file, if any.
pub fn parsed() -> Result<Args> {
    resolve(CliArgs::parse())
}

/// Like `parsed`, but from an explicit argument list (the first item is the
/// program name).
pub fn parsed_from<I, T>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    resolve(CliArgs::try_parse_from(args)?)
}

/// The settled configuration for one run.
#[derive(Debug, Clone)]
pub struct Args {
    /// `op` is the set operation requested
    pub op: SetOp,
    /// `files` is the list of files from the command line, at most two
    pub files: Vec<PathBuf>,
    /// How results are printed
    pub output: Output,
}

/// How results are printed
#[derive(Debug, Clone)]
pub enum Output {
    /// One line per element, or `true`/`false`
    Lines,
    /// A JSON report
    Json {
        /// Serialization policy for the report
        facade: JsonFacade,
        /// Include a `generated_at` field
        timestamp: bool,
    },
}

#[derive(Debug, Parser)]
#[command(name = "setwise", version, about)]
/// `setwise` treats each file as a set of lines and prints the union,
/// intersection, difference or symmetric difference of two of them, or tells
/// whether one is a subset or superset of the other.
struct CliArgs {
    #[arg(value_enum)]
    /// `op` is the set operation requested
    op: CliName,
    #[arg(name = "FILES")]
    /// The first and second operand
    files: Vec<PathBuf>,
    #[arg(long, value_name = "FILE")]
    /// Properties file supplying defaults for the options below
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    /// Output format [default: lines]
    format: Option<Format>,
    #[arg(long, conflicts_with = "compact")]
    /// Pretty-print JSON output (the default)
    pretty: bool,
    #[arg(long)]
    /// Print JSON output on a single line
    compact: bool,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, ValueEnum)]
/// Name of the requested operation
enum CliName {
    /// Print the lines present in either file
    Union,
    /// Print the lines present in both files
    Intersect,
    /// Print the lines present in the first file but not the second
    Diff,
    /// Print the lines present in exactly one of the files
    SymDiff,
    /// Tell whether every line of the first file is in the second
    Subset,
    /// Tell whether every line of the second file is in the first
    Superset,
}

impl From<CliName> for SetOp {
    fn from(name: CliName) -> Self {
        match name {
            CliName::Union => SetOp::Union,
            CliName::Intersect => SetOp::Intersect,
            CliName::Diff => SetOp::Diff,
            CliName::SymDiff => SetOp::SymDiff,
            CliName::Subset => SetOp::Subset,
            CliName::Superset => SetOp::Superset,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, ValueEnum)]
enum Format {
    Lines,
    Json,
}

// Keys read from the `--config` file
const OUTPUT_FORMAT: &str = "output.format";
const JSON_PRETTY: &str = "json.pretty";
const JSON_FIELD_NAMING: &str = "json.field-naming";
const JSON_DATE_FORMAT: &str = "json.date-format";
const JSON_TIMESTAMP: &str = "json.timestamp";

fn resolve(cli: CliArgs) -> Result<Args> {
    if cli.files.len() > 2 {
        bail!("Expected at most two files, got {}", cli.files.len());
    }
    let props = match &cli.config {
        None => Properties::default(),
        Some(path) => Properties::load(path)
            .with_context(|| format!("Can't load configuration: {}", path.display()))?,
    };

    let format = match cli.format {
        Some(format) => format,
        None => match props.get(OUTPUT_FORMAT) {
            None => Format::Lines,
            Some(name) => Format::from_str(name.trim(), true)
                .map_err(|reason| invalid(OUTPUT_FORMAT, name, &reason))?,
        },
    };

    let output = match format {
        Format::Lines => Output::Lines,
        Format::Json => {
            let pretty = if cli.pretty || cli.compact {
                cli.pretty
            } else {
                props.get_bool(JSON_PRETTY)?.unwrap_or(true)
            };
            let naming = props.get_parsed::<FieldNaming>(JSON_FIELD_NAMING)?.unwrap_or_default();
            let mut builder = JsonFacade::builder().pretty(pretty).field_naming(naming);
            if let Some(date_format) = props.get(JSON_DATE_FORMAT) {
                check_date_format(date_format)
                    .with_context(|| format!("Bad {JSON_DATE_FORMAT} in configuration"))?;
                builder = builder.date_format(date_format);
            }
            let timestamp = props.get_bool(JSON_TIMESTAMP)?.unwrap_or(false);
            Output::Json { facade: builder.build(), timestamp }
        }
    };
    log::debug!("operation {:?}, output {:?}", cli.op, output);

    Ok(Args { op: cli.op.into(), files: cli.files, output })
}
