use crate::config::ComposerConfig;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use composer_rich::serialize_with;

use super::{load_registry, read_segments, write_output};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Segments JSON file (`-` for stdin)
    pub input: String,

    /// Token list or dataset file supplying token names and colors
    #[arg(short, long)]
    pub tokens: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<String>,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = ComposerConfig::load(cwd)?;
    let segments = read_segments(&args.input, cwd)?;
    let registry = load_registry(args.tokens.as_deref(), cwd)?;

    let markup = serialize_with(&segments, &registry, &config.chip);

    if let Some(path) = write_output(args.out.as_deref(), cwd, &markup)? {
        println!("  {} {} → {}", "✓".green(), args.input, path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_configured_chip_style() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        std::fs::write(
            dir.path().join("composer.config.json"),
            r#"{ "chip": { "baseClass": "" } }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("segments.json"),
            r#"[{ "type": "text", "value": "x" }, { "type": "token", "tokenId": "eos" }]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("tokens.json"),
            r#"[{ "id": "eos", "name": "EOS", "text": "</s>" }]"#,
        )
        .unwrap();

        render(
            RenderArgs {
                input: "segments.json".to_string(),
                tokens: Some("tokens.json".to_string()),
                out: Some("out.html".to_string()),
            },
            &cwd,
        )
        .unwrap();

        let markup = std::fs::read_to_string(dir.path().join("out.html")).unwrap();
        assert_eq!(
            markup,
            r#"x<span contenteditable="false" data-token-id="eos" class="bg-amber-100">EOS</span>"#
        );
    }
}
