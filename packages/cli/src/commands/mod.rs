pub mod export;
pub mod init;
pub mod parse;
pub mod plain;
pub mod render;

pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
pub use parse::{parse, ParseArgs};
pub use plain::{plain, PlainArgs};
pub use render::{render, RenderArgs};

use anyhow::{Context, Result};
use composer_dataset::DatasetSnapshot;
use composer_rich::{Segment, TokenDescriptor, TokenRegistry};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a file relative to `cwd`, or stdin for `-`
pub fn read_input(path: &str, cwd: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }
    let path = resolve(path, cwd);
    std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write to a file relative to `cwd`, or stdout when no path is given
pub fn write_output(output: Option<&str>, cwd: &str, content: &str) -> Result<Option<PathBuf>> {
    match output {
        Some(path) => {
            let path = resolve(path, cwd);
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(Some(path))
        }
        None => {
            print!("{}", content);
            Ok(None)
        }
    }
}

fn resolve(path: &str, cwd: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(cwd).join(path)
    }
}

pub fn read_segments(path: &str, cwd: &str) -> Result<Vec<Segment>> {
    let source = read_input(path, cwd)?;
    serde_json::from_str(&source).with_context(|| format!("Invalid segments JSON in {}", path))
}

/// Token registry from a token list file or a dataset snapshot
///
/// A file holding a JSON array is a token list; an object is read as a
/// snapshot and its special tokens are used.
pub fn load_registry(tokens: Option<&str>, cwd: &str) -> Result<TokenRegistry> {
    let Some(path) = tokens else {
        return Ok(TokenRegistry::new());
    };
    let source = read_input(path, cwd)?;
    let tokens: Vec<TokenDescriptor> = if source.trim_start().starts_with('[') {
        serde_json::from_str(&source).with_context(|| format!("Invalid token list in {}", path))?
    } else {
        DatasetSnapshot::from_json(&source)
            .with_context(|| format!("Invalid dataset in {}", path))?
            .special_tokens
    };
    debug!(path, tokens = tokens.len(), "Loaded tokens");
    Ok(TokenRegistry::from_tokens(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_registry_from_list_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        std::fs::write(
            dir.path().join("tokens.json"),
            r#"[{ "id": "eos", "name": "EOS", "text": "</s>" }]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("dataset.json"),
            r#"{ "specialTokens": [{ "id": "bos", "name": "BOS", "text": "<s>" }] }"#,
        )
        .unwrap();

        let list = load_registry(Some("tokens.json"), &cwd).unwrap();
        assert_eq!(list.expansion("eos"), "</s>");

        let snapshot = load_registry(Some("dataset.json"), &cwd).unwrap();
        assert_eq!(snapshot.expansion("bos"), "<s>");

        assert!(load_registry(None, &cwd).unwrap().is_empty());
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        let err = read_input("nope.json", &cwd).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }
}
