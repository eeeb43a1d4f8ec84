use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FermentaError, Result};

/// Root application configuration, loaded from `~/.config/fermenta/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub dedup: DedupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: String,
}

/// Tokens the name normalizer strips when grouping breweries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Leading words such as "Birrificio" in "Birrificio Lambrate".
    pub prefixes: Vec<String>,
    /// Trailing company legal forms such as "Srl" in "Baladin Srl".
    pub legal_suffixes: Vec<String>,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("fermenta");

        Self {
            database_path: data_dir.join("fermenta.db").to_string_lossy().to_string(),
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            prefixes: ["birrificio", "birra", "brewery", "brewing"]
                .into_iter()
                .map(String::from)
                .collect(),
            legal_suffixes: ["srl", "s.r.l.", "snc", "s.n.c.", "sas", "s.a.s.", "spa", "s.p.a."]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

// ─── Load ──────────────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/fermenta/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("FERMENTA_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("fermenta")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the normalizer could never match: the normalizer
    /// compares single lower-case tokens, so list entries must be one word.
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_path.trim().is_empty() {
            return Err(FermentaError::ConfigError(
                "storage.database_path must not be empty".to_string(),
            ));
        }

        let lists = [
            ("dedup.prefixes", &self.dedup.prefixes),
            ("dedup.legal_suffixes", &self.dedup.legal_suffixes),
        ];
        for (field, tokens) in lists {
            if let Some(bad) = tokens
                .iter()
                .find(|t| t.is_empty() || t.chars().any(char::is_whitespace))
            {
                return Err(FermentaError::ConfigError(format!(
                    "{field} entries must be single words, got {bad:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.database_path)
    }

    pub fn set_database_path(&mut self, path: PathBuf) {
        self.storage.database_path = path.to_string_lossy().to_string();
    }
}
