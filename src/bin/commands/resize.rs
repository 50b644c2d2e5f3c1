use std::io::{self, Write};

use anyhow::{Context, Result, anyhow};
use clap::{Args, ValueEnum};
use prettytable::{Table, format, row};

use helix_forge::ops::terminal;
use helix_forge::ops::{DuplexGenerator, ResizeReport};
use helix_forge::templates::{DirectoryTemplates, EmbeddedTemplates, TemplateProvider};
use helix_forge::{Assembly, AtomId};

use crate::commands::{DuplexArgs, print_boxed_label, print_warnings, run_with_spinner};

/// End of the duplex a resize is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DuplexEnd {
    /// The end at `--end1`.
    Start,
    /// The far end of the axis.
    End,
}

/// Builds a duplex, then grows or shrinks it at one end.
#[derive(Debug, Args)]
pub struct ResizeArgs {
    #[command(flatten)]
    pub duplex: DuplexArgs,
    /// Signed change in base pairs; negative values truncate.
    #[arg(short, long, allow_hyphen_values = true)]
    pub delta: i32,
    /// End of the duplex to resize.
    #[arg(long, value_enum, default_value_t = DuplexEnd::End)]
    pub at: DuplexEnd,
}

#[derive(Debug, Clone, Copy)]
struct Counts {
    atoms: usize,
    bonds: usize,
    chunks: usize,
}

impl Counts {
    fn of(assembly: &Assembly) -> Self {
        Self {
            atoms: assembly.real_atom_count(),
            bonds: assembly.bond_count(),
            chunks: assembly.chunk_count(),
        }
    }
}

pub fn run(args: &ResizeArgs) -> Result<()> {
    let mut assembly = Assembly::new();
    let built = run_with_spinner("Building duplex", || args.duplex.build_into(&mut assembly))?;
    let before = Counts::of(&assembly);

    let message = format!("Resizing by {:+} base pairs", args.delta);
    let report = run_with_spinner(&message, || match &args.duplex.templates {
        Some(dir) => resize(
            &DuplexGenerator::new(DirectoryTemplates::new(dir)),
            &mut assembly,
            args,
        ),
        None => resize(&DuplexGenerator::new(EmbeddedTemplates), &mut assembly, args),
    })?;
    let after = Counts::of(&assembly);

    let mut stderr = io::stderr().lock();
    print_boxed_label(&mut stderr, "HelixForge Resize Report")?;
    writeln!(&mut stderr)?;
    print_comparison(&mut stderr, &before, &after, &report)?;
    writeln!(&mut stderr)?;

    print_boxed_label(&mut stderr, "Warnings")?;
    let warnings: Vec<_> = built
        .warnings
        .iter()
        .chain(&report.warnings)
        .cloned()
        .collect();
    print_warnings(&mut stderr, &warnings)?;
    Ok(())
}

fn resize<P: TemplateProvider>(
    generator: &DuplexGenerator<P>,
    assembly: &mut Assembly,
    args: &ResizeArgs,
) -> Result<ResizeReport> {
    let boundary = find_boundary(assembly, args)?;
    let end1 = &args.duplex.end1;
    let end2 = &args.duplex.end2;
    let (behind, beyond) = match args.at {
        DuplexEnd::Start => (end2, end1),
        DuplexEnd::End => (end1, end2),
    };
    let spec = args.duplex.spec(args.delta);
    generator
        .modify(assembly, boundary, &spec, behind, beyond)
        .with_context(|| format!("Failed to resize duplex at atom {boundary}"))
}

fn find_boundary(assembly: &Assembly, args: &ResizeArgs) -> Result<AtomId> {
    let axis: Vec<AtomId> = assembly
        .chunks()
        .filter(|(_, chunk)| chunk.name == "Axis")
        .flat_map(|(_, chunk)| chunk.atoms().iter().copied())
        .collect();
    let start = terminal::nearest_axis_end(assembly, &axis, &args.duplex.end1)
        .ok_or_else(|| anyhow!("The built duplex has no axis ends"))?;
    match args.at {
        DuplexEnd::Start => Ok(start),
        // A single base pair has one axis atom serving as both ends.
        DuplexEnd::End => Ok(terminal::axis_ends(assembly, &axis)
            .into_iter()
            .find(|id| *id != start)
            .unwrap_or(start)),
    }
}

fn print_comparison<W: Write>(
    writer: &mut W,
    before: &Counts,
    after: &Counts,
    report: &ResizeReport,
) -> Result<()> {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Metric", "Before", "After"]);
    table.add_row(row!["Atoms", before.atoms, after.atoms]);
    table.add_row(row!["Bonds", before.bonds, after.bonds]);
    table.add_row(row!["Chunks", before.chunks, after.chunks]);
    table.add_row(row!["Base Pairs Added", "", report.added]);
    table.add_row(row!["Base Pairs Removed", "", report.removed]);
    table.add_row(row![
        "New Boundary",
        "",
        report
            .new_boundary
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string())
    ]);
    table
        .print(writer)
        .context("Failed to render resize summary")?;
    Ok(())
}
