// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    /// Folder holding users.json and the per-profile case folders.
    pub base_path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("RULINGSAFE_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set RULINGSAFE_CONFIG_PATH to the config file"
            )
        })?;

        let app_dir = config_root.join(rulingsafe_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and place values under [storage]",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_path) = &self.storage.base_path {
            if base_path.contains("://") {
                bail!(
                    "storage.base_path in {} looks like a URI; use a filesystem path",
                    path.display()
                );
            }
            if !Path::new(base_path).is_absolute() {
                bail!(
                    "storage.base_path in {} must be an absolute path, got {base_path:?}",
                    path.display()
                );
            }
        }
        Ok(())
    }

    /// Storage folder resolution: config wins, then the environment,
    /// then the platform data directory. Always resolvable, so the
    /// folder chooser on first launch can offer a sensible default.
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(base_path) = &self.storage.base_path {
            return Ok(PathBuf::from(base_path));
        }
        if let Some(path) = env::var_os("RULINGSAFE_STORE_PATH") {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [storage].base_path or RULINGSAFE_STORE_PATH")
        })?;
        Ok(data_root.join(rulingsafe_store::APP_NAME).join("storage"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# rulingsafe config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is the platform data dir (for example ~/.local/share/rulingsafe/storage)\n# base_path = \"/absolute/path/to/storage\"\n",
            path.display(),
        )
    }
}
