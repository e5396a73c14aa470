// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bootstrap configuration: `server.txt`, `Settings/settings.txt`,
//! `Settings/Software_Per_Machine.csv`, and an optional
//! `Settings/timing.toml` override, parsed once into a typed [`Config`].

use gridagent_core::{ConfigError, TimingConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Everything a running agent needs, resolved from the bootstrap files at
/// startup. Parsed once; nothing downstream touches raw strings again.
#[derive(Debug, Clone)]
pub struct Config {
    pub blob_store_root: PathBuf,
    pub mongodb_server: String,
    pub user_group: String,
    pub password: String,
    pub instance: String,
    pub user: String,
    pub machine: String,
    pub timing: TimingConfig,
}

impl Config {
    /// Load every bootstrap file rooted at `cwd` (`server.txt`) and the blob
    /// store it points to (everything else).
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let blob_store_root = read_server_txt(&cwd.join("server.txt"))?;
        let settings = read_settings_txt(&blob_store_root.join("Settings").join("settings.txt"))?;
        let timing = read_timing_override(&blob_store_root.join("Settings").join("timing.toml"))?;

        Ok(Self {
            mongodb_server: settings.get_required("mongodb server")?,
            user_group: settings.get_required("user group")?,
            password: settings.get_required("password")?,
            instance: settings.get_required("instance")?,
            user: current_user(),
            machine: current_hostname(),
            blob_store_root,
            timing,
        })
    }

    pub fn settings_dir(&self) -> PathBuf {
        self.blob_store_root.join("Settings")
    }

    pub fn applications_dir(&self) -> PathBuf {
        self.settings_dir().join("Applications")
    }

    pub fn machine_csv(&self) -> PathBuf {
        self.settings_dir().join("Software_Per_Machine.csv")
    }

    /// `mongodb://{user_group}:{password}@{server}/`, the single
    /// group-credential connection string used for both `cases` and
    /// `versions` (§9 open question 3).
    pub fn mongodb_uri(&self) -> String {
        format!("mongodb://{}:{}@{}/", self.user_group, self.password, self.mongodb_server)
    }

    pub fn database_name(&self) -> &str {
        &self.user_group
    }
}

struct Settings {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl Settings {
    fn get_required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or(ConfigError::MissingField { path: self.path.clone(), field: key })
    }
}

fn read_server_txt(path: &Path) -> Result<PathBuf, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let contents =
        std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    Ok(PathBuf::from(contents.lines().next().unwrap_or("").trim()))
}

fn read_settings_txt(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let contents =
        std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

    let mut entries = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(Settings { path: path.to_path_buf(), entries })
}

fn read_timing_override(path: &Path) -> Result<TimingConfig, ConfigError> {
    if !path.exists() {
        return Ok(TimingConfig::default());
    }
    let contents =
        std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })
}

fn current_user() -> String {
    std::env::var("USER").or_else(|_| std::env::var("USERNAME")).unwrap_or_else(|_| "unknown".to_string())
}

fn current_hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
