use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub reader: Option<ReaderConfig>,
    pub logging: Option<LoggingConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderConfig {
    pub output_paragraphs: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of DEBUG, INFO, WARNING, ERROR, CRITICAL.
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
}

impl ConfigFile {
    pub fn output_paragraphs(&self) -> Option<bool> {
        self.reader.as_ref().and_then(|r| r.output_paragraphs)
    }

    pub fn logging_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output
            .as_ref()
            .and_then(|o| o.path.as_ref())
            .map(PathBuf::from)
    }
}

/// Platform config directory path: `<config_dir>/docxtext/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docxtext").join("config.toml"))
}

/// Load config by cascading CWD `.docxtext.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".docxtext.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        reader: Some(ReaderConfig {
            output_paragraphs: overlay.output_paragraphs().or(base.output_paragraphs()),
        }),
        logging: Some(LoggingConfig {
            level: overlay
                .logging_level()
                .or(base.logging_level())
                .map(str::to_string),
        }),
        output: Some(OutputConfig {
            path: overlay
                .output
                .as_ref()
                .and_then(|o| o.path.clone())
                .or_else(|| base.output.as_ref().and_then(|o| o.path.clone())),
        }),
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_parses() {
        let toml_str = "[reader]\noutput_paragraphs = true\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.output_paragraphs(), Some(true));
        assert!(parsed.logging_level().is_none());
        assert!(parsed.output_path().is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            logging: Some(LoggingConfig {
                level: Some("INFO".to_string()),
            }),
            reader: Some(ReaderConfig {
                output_paragraphs: Some(false),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            logging: Some(LoggingConfig {
                level: Some("DEBUG".to_string()),
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.logging_level(), Some("DEBUG"));
        assert_eq!(merged.output_paragraphs(), Some(false));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            output: Some(OutputConfig {
                path: Some("/base/records.jsonl".to_string()),
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(
            merged.output_path(),
            Some(PathBuf::from("/base/records.jsonl"))
        );
    }

    #[test]
    fn save_then_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = ConfigFile {
            reader: Some(ReaderConfig {
                output_paragraphs: Some(true),
            }),
            ..Default::default()
        };
        save_to_path(&config, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.output_paragraphs(), Some(true));
    }

    #[test]
    fn unparsable_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "reader = [").unwrap();
        assert!(load_from_path(&path).is_none());
    }
}
