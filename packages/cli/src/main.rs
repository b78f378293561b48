mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    export, init, parse, plain, render, ExportArgs, InitArgs, ParseArgs, PlainArgs, RenderArgs,
};
use tracing_subscriber::EnvFilter;

/// Composer CLI - rich segment tooling for chat datasets
#[derive(Parser, Debug)]
#[command(name = "composer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a composer.config.json in the current directory
    Init(InitArgs),

    /// Render segments JSON to editable markup
    Render(RenderArgs),

    /// Parse editable markup back into segments JSON
    Parse(ParseArgs),

    /// Project segments JSON to plain text
    Plain(PlainArgs),

    /// Export a dataset snapshot as training text
    Export(ExportArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Render(args) => render(args, &cwd),
        Command::Parse(args) => parse(args, &cwd),
        Command::Plain(args) => plain(args, &cwd),
        Command::Export(args) => export(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
