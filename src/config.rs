//! Command-line and environment configuration.

use crate::vision::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// deckmill - build PowerPoint decks over the Model Context Protocol
#[derive(Debug, Clone, Parser)]
#[command(name = "deckmill")]
#[command(version)]
#[command(about = "MCP server that builds PowerPoint decks slide by slide")]
pub struct Config {
    /// Folder decks, backups and generated images are stored in.
    /// Every file path argument is confined to it.
    #[arg(long, env = "PPTX_FOLDER_PATH", default_value = ".")]
    pub folder_path: PathBuf,

    /// Log filter (e.g. `debug`, `deckmill=trace`). RUST_LOG takes
    /// precedence when set.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Gemini model used for image generation
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub image_model: String,

    /// Base URL of the Gemini REST API
    #[arg(long, default_value = DEFAULT_ENDPOINT, hide = true)]
    pub image_endpoint: String,

    /// Timeout for one image generation request, in seconds
    #[arg(long, default_value_t = 120)]
    pub image_timeout_secs: u64,
}

impl Config {
    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    /// Create the deck folder if needed and return its canonical path.
    pub fn prepare_folder(&self) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.folder_path)?;
        self.folder_path.canonicalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["deckmill"]).unwrap();
        assert_eq!(config.image_model, DEFAULT_MODEL);
        assert_eq!(config.image_timeout(), Duration::from_secs(120));
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "deckmill",
            "--folder-path",
            "/tmp/decks",
            "--log-level",
            "debug",
            "--image-timeout-secs",
            "30",
        ])
        .unwrap();
        assert_eq!(config.folder_path, PathBuf::from("/tmp/decks"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.image_timeout_secs, 30);
        assert!(Config::try_parse_from(["deckmill", "--image-timeout-secs", "soon"]).is_err());
    }

    #[test]
    fn test_prepare_folder_creates_and_canonicalizes() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/./b");
        let config = Config::try_parse_from(["deckmill", "--folder-path", nested.to_str().unwrap()]).unwrap();
        let folder = config.prepare_folder().unwrap();
        assert!(folder.is_dir());
        assert!(folder.is_absolute());
        assert!(folder.ends_with("a/b"));
    }
}
