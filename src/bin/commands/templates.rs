use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use helix_forge::templates;

use crate::commands::print_boxed_label;

/// Lists the embedded base-pair templates.
#[derive(Debug, Default, Args)]
pub struct TemplatesArgs {}

pub fn run(_args: &TemplatesArgs) -> Result<()> {
    let fragments = templates::embedded();

    let mut stdout = io::stdout().lock();
    print_boxed_label(&mut stdout, "Embedded Templates")?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row![
        "Form",
        "Model",
        "Role",
        "Atoms",
        "Bonds",
        "Open Bonds",
        "Rise (Å)",
        "bp/Turn"
    ]);
    for fragment in &fragments {
        table.add_row(row![
            fragment.form,
            fragment.model,
            fragment.role,
            fragment.atom_count(),
            fragment.bonds().len(),
            fragment.open_bonds().len(),
            format!("{:.3}", fragment.rise),
            format!("{:.2}", fragment.bases_per_turn)
        ]);
    }
    table
        .print(&mut stdout)
        .context("Failed to render template list")?;
    writeln!(&mut stdout, "{} template(s)", fragments.len())?;
    Ok(())
}
