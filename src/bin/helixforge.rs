use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{build, resize, templates};

#[derive(Parser, Debug)]
#[command(
    name = "helixforge",
    about = "A command-line tool for generating and resizing reduced-representation DNA duplexes.",
    version,
    author,
    arg_required_else_help = true
)]
struct Cli {
    /// Increase log verbosity (-v for info, -vv for debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a duplex between two endpoints and report its structure.
    Build(build::BuildArgs),
    /// Build a duplex, then grow or shrink it at one end.
    Resize(resize::ResizeArgs),
    /// List the base-pair templates compiled into the tool.
    Templates(templates::TemplatesArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    match cli.command {
        Command::Build(args) => build::run(&args)?,
        Command::Resize(args) => resize::run(&args)?,
        Command::Templates(args) => templates::run(&args)?,
    }

    Ok(())
}
