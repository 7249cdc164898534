//! Local persistence for config, credentials, and the replay id list.
//!
//! Credentials are stored as pretty JSON (camelCase keys, byte fields
//! base64); the persistent-id list is newline-delimited text that is
//! appended per message and removed once a login confirms delivery.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use push_client::Credentials;
use serde::Deserialize;

/// FCM project config file layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FcmConfig {
    pub api_key: String,
    pub project_id: String,
    pub app_id: String,
    #[serde(default)]
    pub vapid_key: Option<String>,
}

pub fn load_config(path: &Path) -> anyhow::Result<FcmConfig> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).context("parse config")
}

pub fn load_credentials(path: &Path) -> anyhow::Result<Option<Credentials>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw).context("parse credentials")?))
}

pub fn save_credentials(path: &Path, credentials: &Credentials) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(credentials)?;
    fs::write(path, raw).with_context(|| format!("write {path:?}"))
}

pub fn load_persistent_ids(path: &Path) -> anyhow::Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn append_persistent_id(path: &Path, id: &str) -> anyhow::Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {path:?}"))?;
    writeln!(file, "{id}")?;
    Ok(())
}

pub fn clear_persistent_ids(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
