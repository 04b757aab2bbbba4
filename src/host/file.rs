//! JSON file-backed configuration slot.
//!
//! Stands in for the host's own configuration store when running outside
//! a host process (standalone tooling, tests). One JSON object per file,
//! string keys to string values.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::HostConfigSlot;

/// Configuration slot persisted as a JSON file.
pub struct FileConfigSlot {
    path: PathBuf,
}

impl FileConfigSlot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Default location under the user config directory.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join("keepsync").join("config.json"))
    }

    fn read_values(&self) -> Result<HashMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file: {}", self.path.display()))
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", self.path.display()))
    }

    fn write_values(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(values).context("Failed to serialize config")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write config file: {}", self.path.display()))?;
        Ok(())
    }
}

impl HostConfigSlot for FileConfigSlot {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let values = self.read_values()?;
        Ok(values.get(key).cloned())
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_values()?;
        values.insert(key.to_string(), value.to_string());
        self.write_values(&values)
    }
}
