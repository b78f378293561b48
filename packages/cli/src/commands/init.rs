use crate::config::{ComposerConfig, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use composer_dataset::DatasetSettings;
use composer_rich::BlockNewline;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Append a newline after every block element when parsing
    #[arg(long)]
    pub trailing: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = ComposerConfig {
        block_newline: if args.trailing {
            BlockNewline::Trailing
        } else {
            BlockNewline::Separator
        },
        settings: Some(DatasetSettings::default()),
        ..Default::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, format!("{}\n", config_json))?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Adjust chip classes and export markers in {}", DEFAULT_CONFIG_NAME);
    println!("  2. Run: composer export dataset.json -o dataset.txt");

    Ok(())
}
