use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use helix_forge::Assembly;
use helix_forge::ops::BuildReport;

use crate::commands::{
    DuplexArgs, print_boxed_label, print_chunk_table, print_warnings, run_with_spinner,
};

/// Builds one duplex and prints a summary of the result.
#[derive(Debug, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub duplex: DuplexArgs,
    /// Also print every atom with its kind, chunk, and position.
    #[arg(long)]
    pub atoms: bool,
}

pub fn run(args: &BuildArgs) -> Result<()> {
    let mut assembly = Assembly::new();
    let report = run_with_spinner("Building duplex", || args.duplex.build_into(&mut assembly))?;

    let mut stderr = io::stderr().lock();
    print_boxed_label(&mut stderr, "HelixForge Build Report")?;
    writeln!(&mut stderr)?;
    print_summary(&mut stderr, args, &assembly, &report)?;
    writeln!(&mut stderr)?;

    print_boxed_label(&mut stderr, "Chunks")?;
    print_chunk_table(&mut stderr, &assembly)?;
    writeln!(&mut stderr)?;

    if args.atoms {
        print_boxed_label(&mut stderr, "Atoms")?;
        print_atom_table(&mut stderr, &assembly)?;
        writeln!(&mut stderr)?;
    }

    print_boxed_label(&mut stderr, "Warnings")?;
    print_warnings(&mut stderr, &report.warnings)?;
    Ok(())
}

fn print_summary<W: Write>(
    writer: &mut W,
    args: &BuildArgs,
    assembly: &Assembly,
    report: &BuildReport,
) -> Result<()> {
    let spec = args.duplex.spec(args.duplex.count);
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Metric", "Value"]);
    table.add_row(row!["Form", format!("{} ({})", spec.form, spec.handedness)]);
    table.add_row(row!["Model", spec.model]);
    table.add_row(row!["Base Pairs", report.fragments_placed]);
    table.add_row(row![
        "Rise / Turn",
        format!("{:.3} Å, {:.2} bp", spec.rise, spec.bases_per_turn)
    ]);
    table.add_row(row!["Atoms", assembly.real_atom_count()]);
    table.add_row(row![
        "Placeholders",
        assembly.atom_count() - assembly.real_atom_count()
    ]);
    table.add_row(row!["Bonds", assembly.bond_count()]);
    table.add_row(row![
        "Fusion",
        format!(
            "{} joins, {} bonds formed",
            report.fusion_calls, report.bonds_formed
        )
    ]);
    table
        .print(writer)
        .context("Failed to render build summary")?;
    Ok(())
}

fn print_atom_table<W: Write>(writer: &mut W, assembly: &Assembly) -> Result<()> {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Id", "Name", "Kind", "Chunk", "X", "Y", "Z"]);
    for (id, atom) in assembly.atoms() {
        let chunk = assembly
            .chunk_of(id)
            .and_then(|c| assembly.chunk(c))
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        table.add_row(row![
            id,
            atom.name,
            atom.kind,
            chunk,
            format!("{:.3}", atom.pos.x),
            format!("{:.3}", atom.pos.y),
            format!("{:.3}", atom.pos.z)
        ]);
    }
    table.print(writer).context("Failed to render atom table")?;
    Ok(())
}
