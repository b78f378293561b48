use crate::config::ComposerConfig;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use composer_rich::{parse_markup_with, BlockNewline};

use super::{read_input, write_output};

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Markup file (`-` for stdin)
    pub input: String,

    /// Append a newline after every block element (overrides config)
    #[arg(long)]
    pub trailing: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<String>,
}

pub fn parse(args: ParseArgs, cwd: &str) -> Result<()> {
    let config = ComposerConfig::load(cwd)?;
    let mut options = config.parse_options();
    if args.trailing {
        options.block_newline = BlockNewline::Trailing;
    }

    let markup = read_input(&args.input, cwd)?;
    let segments = parse_markup_with(&markup, options);
    let json = format!("{}\n", serde_json::to_string_pretty(&segments)?);

    if let Some(path) = write_output(args.out.as_deref(), cwd, &json)? {
        println!(
            "  {} {} → {} ({} segments)",
            "✓".green(),
            args.input,
            path.display(),
            segments.len()
        );
    }
    Ok(())
}
