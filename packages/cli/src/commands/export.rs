use crate::config::ComposerConfig;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use composer_dataset::{export_entries, DatasetSnapshot};

use super::{read_input, write_output};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Dataset snapshot JSON file (`-` for stdin)
    pub input: String,

    /// Only export entries of this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<String>,
}

pub fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = ComposerConfig::load(cwd)?;
    let source = read_input(&args.input, cwd)?;
    let snapshot = DatasetSnapshot::from_json(&source)
        .with_context(|| format!("Invalid dataset in {}", args.input))?;

    let settings = config.settings.as_ref().unwrap_or(&snapshot.settings);
    let entries: Vec<_> = snapshot
        .entries
        .iter()
        .filter(|entry| {
            args.category
                .as_deref()
                .map_or(true, |category| entry.category_id == category)
        })
        .cloned()
        .collect();

    let txt = export_entries(&entries, settings, &snapshot.registry());

    if let Some(path) = write_output(args.out.as_deref(), cwd, &txt)? {
        println!(
            "  {} Exported {} entries → {}",
            "✓".green(),
            entries.len(),
            path.display()
        );
    }
    Ok(())
}
