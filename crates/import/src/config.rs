use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::match_engine::MatchMode;
use crate::ofx::{DEFAULT_FALLBACK_DESCRIPTION, DEFAULT_MAX_BLOCKS};

pub const DEFAULT_MAX_STATEMENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Run settings. Every field has a default, so an empty file is valid.
///
/// ```toml
/// [statement]
/// max_bytes = 10485760
/// max_blocks = 100000
/// fallback_description = "Sem descrição"
///
/// [matching]
/// mode = "many_to_many"   # or "one_to_one"
///
/// [ledger]
/// path = "lancamentos.csv"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub statement: StatementConfig,
    pub matching: MatchingConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementConfig {
    pub max_bytes: usize,
    pub max_blocks: usize,
    pub fallback_description: String,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_STATEMENT_BYTES,
            max_blocks: DEFAULT_MAX_BLOCKS,
            fallback_description: DEFAULT_FALLBACK_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub mode: MatchMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: Option<PathBuf>,
}

impl ReconcileConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ReconcileConfig::from_toml("").unwrap();
        assert_eq!(config, ReconcileConfig::default());
        assert_eq!(config.statement.max_bytes, DEFAULT_MAX_STATEMENT_BYTES);
        assert_eq!(config.statement.fallback_description, "Sem descrição");
        assert_eq!(config.matching.mode, MatchMode::ManyToMany);
        assert!(config.ledger.path.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ReconcileConfig::from_toml(
            r#"
[statement]
max_blocks = 10

[matching]
mode = "one_to_one"

[ledger]
path = "/srv/mercadinho/lancamentos.csv"
"#,
        )
        .unwrap();
        assert_eq!(config.statement.max_blocks, 10);
        assert_eq!(config.statement.max_bytes, DEFAULT_MAX_STATEMENT_BYTES);
        assert_eq!(config.matching.mode, MatchMode::OneToOne);
        assert_eq!(
            config.ledger.path.as_deref(),
            Some(Path::new("/srv/mercadinho/lancamentos.csv"))
        );
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = ReconcileConfig::from_toml("[matching]\nmode = \"fuzzy\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReconcileConfig::load(&dir.path().join("tally.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.toml");
        std::fs::write(&path, "[statement]\nfallback_description = \"(sem memo)\"\n").unwrap();
        let config = ReconcileConfig::load(&path).unwrap();
        assert_eq!(config.statement.fallback_description, "(sem memo)");
    }
}
