//! Engine configuration
//!
//! Read from a TOML file. Every field has a default, so a missing file or a
//! partial one still yields a playable configuration.

use crate::core::types::GameSetting;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rules the first round is played under.
    #[serde(default)]
    pub setting: GameSetting,

    /// Where the user dictionary snapshot lives.
    #[serde(default = "default_dictionary_path")]
    pub dictionary_path: PathBuf,

    /// Fixed seed for start-character draws; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_dictionary_path() -> PathBuf {
    PathBuf::from("kkutu_dictionary.bin")
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            setting: GameSetting::default(),
            dictionary_path: default_dictionary_path(),
            seed: None,
            log_filter: default_log_filter(),
        }
    }
}

impl EngineConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("[config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GameMode, Lang};
    use crate::error::KkutuError;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = EngineConfig::parse(
            "seed = 7\n\n[setting]\nlang = \"en\"\nmode = \"mission\"\nround_time = 90000\n",
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.setting.lang, Lang::En);
        assert_eq!(config.setting.mode, GameMode::Mission);
        assert_eq!(config.setting.round_time, 90_000);
        assert_eq!(config.dictionary_path, PathBuf::from("kkutu_dictionary.bin"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn malformed_file_is_codec_error() {
        assert!(matches!(EngineConfig::parse("seed = ["), Err(KkutuError::Codec(_))));
    }
}
