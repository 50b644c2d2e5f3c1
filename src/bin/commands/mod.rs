use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use prettytable::{Table, format, row};

use helix_forge::ops::{BuildReport, DuplexGenerator, DuplexSpec, Warning};
use helix_forge::templates::{DirectoryTemplates, EmbeddedTemplates, TemplateProvider};
use helix_forge::{Assembly, Form, Handedness, ModelTier, Point};

pub mod build;
pub mod resize;
pub mod templates;

/// Helix and endpoint options shared by the commands that build a duplex.
#[derive(Debug, Clone, Args)]
pub struct DuplexArgs {
    /// Helix form (A-DNA, B-DNA, or Z-DNA).
    #[arg(long, default_value = "B-DNA", value_parser = parse_form)]
    pub form: Form,
    /// Model tier (PAM3 or PAM5).
    #[arg(short, long, default_value = "PAM3", value_parser = parse_model)]
    pub model: ModelTier,
    /// Number of base pairs.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: i32,
    /// Override the rise between base pairs (Å).
    #[arg(long)]
    pub rise: Option<f64>,
    /// Override the number of base pairs per helical turn.
    #[arg(long = "bases-per-turn", value_name = "BPT")]
    pub bases_per_turn: Option<f64>,
    /// Override the helix handedness (right or left).
    #[arg(long, value_parser = parse_handedness)]
    pub handedness: Option<Handedness>,
    /// Axis position of the first base pair, as "x,y,z".
    #[arg(long, default_value = "0,0,0", value_parser = parse_point, allow_hyphen_values = true)]
    pub end1: Point,
    /// Point further along the axis, as "x,y,z".
    #[arg(long, default_value = "0,0,10", value_parser = parse_point, allow_hyphen_values = true)]
    pub end2: Point,
    /// Read templates from this directory instead of the embedded set.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,
}

impl DuplexArgs {
    /// Helix parameters for `count` base pairs, with any overrides applied.
    pub fn spec(&self, count: i32) -> DuplexSpec {
        let mut spec = DuplexSpec::new(self.form, self.model, count);
        if let Some(rise) = self.rise {
            spec = spec.with_rise(rise);
        }
        if let Some(bpt) = self.bases_per_turn {
            spec = spec.with_bases_per_turn(bpt);
        }
        if let Some(handedness) = self.handedness {
            spec = spec.with_handedness(handedness);
        }
        spec
    }

    /// Builds the initial duplex into `assembly` using the configured template source.
    pub fn build_into(&self, assembly: &mut Assembly) -> Result<BuildReport> {
        match &self.templates {
            Some(dir) => {
                let generator = DuplexGenerator::new(DirectoryTemplates::new(dir));
                construct(&generator, assembly, self)
                    .with_context(|| format!("Failed to build duplex from {}", dir.display()))
            }
            None => construct(&DuplexGenerator::new(EmbeddedTemplates), assembly, self)
                .context("Failed to build duplex"),
        }
    }
}

fn construct<P: TemplateProvider>(
    generator: &DuplexGenerator<P>,
    assembly: &mut Assembly,
    args: &DuplexArgs,
) -> Result<BuildReport> {
    let spec = args.spec(args.count);
    let report = generator.construct(assembly, &spec, &args.end1, &args.end2)?;
    Ok(report)
}

/// Configures `env_logger`, defaulting to warnings and raising the level per `-v`.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

/// Parses a point written as three comma-separated numbers.
pub fn parse_point(value: &str) -> Result<Point> {
    let coords = value
        .split(',')
        .map(|c| {
            c.trim()
                .parse::<f64>()
                .map_err(|e| anyhow!("invalid coordinate '{}': {}", c.trim(), e))
        })
        .collect::<Result<Vec<_>>>()?;
    match coords.as_slice() {
        [x, y, z] => Ok(Point::new(*x, *y, *z)),
        _ => bail!("expected three coordinates as x,y,z, got '{value}'"),
    }
}

fn parse_form(value: &str) -> Result<Form, String> {
    value.parse()
}

fn parse_model(value: &str) -> Result<ModelTier, String> {
    value.parse()
}

fn parse_handedness(value: &str) -> Result<Handedness, String> {
    value.parse()
}

/// Wraps long-running operations with a spinner rendered to stderr.
pub fn run_with_spinner<T, F>(message: &str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    let result = work();

    match &result {
        Ok(_) => spinner.finish_with_message(format!("{} ✓", message)),
        Err(_) => spinner.abandon_with_message(format!("{} ✗", message)),
    }

    result
}

/// Prints one row per chunk with its atom and placeholder counts.
pub fn print_chunk_table<W: Write>(writer: &mut W, assembly: &Assembly) -> Result<()> {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Chunk", "Color", "Atoms", "Placeholders"]);
    for (_, chunk) in assembly.chunks() {
        let singlets = chunk
            .atoms()
            .iter()
            .filter(|id| assembly.atom(**id).is_some_and(|a| a.is_singlet()))
            .count();
        table.add_row(row![
            chunk.name,
            chunk.color,
            chunk.len() - singlets,
            singlets
        ]);
    }
    table
        .print(writer)
        .context("Failed to render chunk summary")?;
    Ok(())
}

/// Prints the warnings of one operation, or a single line saying there were none.
pub fn print_warnings<W: Write>(writer: &mut W, warnings: &[Warning]) -> io::Result<()> {
    if warnings.is_empty() {
        return writeln!(writer, "No warnings.");
    }
    for warning in warnings {
        writeln!(writer, "⚠ {warning}")?;
    }
    Ok(())
}

pub fn print_boxed_label<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    let inner = format!(" {title} ");
    let width = inner.chars().count();
    writeln!(writer, "╭{}╮", "─".repeat(width))?;
    writeln!(writer, "│{}│", inner)?;
    writeln!(writer, "╰{}╯", "─".repeat(width))?;
    Ok(())
}
