use anyhow::Result;
use clap::Args;
use composer_rich::project_to_plain_text;

use super::{load_registry, read_segments, write_output};

#[derive(Debug, Args)]
pub struct PlainArgs {
    /// Segments JSON file (`-` for stdin)
    pub input: String,

    /// Token list or dataset file supplying token expansions
    #[arg(short, long)]
    pub tokens: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<String>,
}

pub fn plain(args: PlainArgs, cwd: &str) -> Result<()> {
    let segments = read_segments(&args.input, cwd)?;
    let registry = load_registry(args.tokens.as_deref(), cwd)?;

    let text = project_to_plain_text(&segments, &registry);
    write_output(args.out.as_deref(), cwd, &text)?;
    Ok(())
}
