use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::schema::QuillConfig;

/// Loads the Quill configuration from disk.
pub struct ConfigLoader {
    config: Arc<RwLock<QuillConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > QUILL_CONFIG env > ~/.config/quill/quill.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("QUILL_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quill")
            .join("quill.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> quill_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            toml::from_str::<QuillConfig>(&raw).map_err(|e| {
                quill_core::QuillError::Config(format!(
                    "failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            QuillConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(quill_core::QuillError::Config(e));
            }
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> QuillConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for subscription.
    pub fn shared(&self) -> Arc<RwLock<QuillConfig>> {
        Arc::clone(&self.config)
    }

    /// Path the config was loaded from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides. API keys fill in only when the config file
    /// leaves them unset, so the file takes priority and env is the fallback.
    fn apply_env_overrides(mut config: QuillConfig) -> QuillConfig {
        if let Ok(v) = std::env::var("QUILL_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("QUILL_SEARCH_BUDGET") {
            if let Ok(budget) = v.parse::<u32>() {
                config.scheduler.daily_search_budget = budget;
            }
        }
        if config.services.openai_api_key.is_none() {
            if let Ok(v) = std::env::var("OPENAI_API_KEY") {
                config.services.openai_api_key = Some(v);
            }
        }
        if config.services.brave_api_key.is_none() {
            if let Ok(v) = std::env::var("BRAVE_API_KEY") {
                config.services.brave_api_key = Some(v);
            }
        }
        config
    }

    /// Reload the config from disk.
    pub fn reload(&self) -> quill_core::Result<()> {
        if !self.config_path.exists() {
            return Err(quill_core::QuillError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let raw = std::fs::read_to_string(&self.config_path)?;
        let new_config = toml::from_str::<QuillConfig>(&raw).map_err(|e| {
            quill_core::QuillError::Config(format!(
                "failed to parse {}: {}",
                self.config_path.display(),
                e
            ))
        })?;
        let new_config = Self::apply_env_overrides(new_config);
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }
}
