//! Keyed settings store persisted through the host configuration slot.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::host::HostConfigSlot;
use crate::vault::CredentialVault;

use super::{SettingsRecord, SyncSettings, TokenStorage};

/// Key under which the settings document lives in the host slot.
const SETTINGS_KEY: &str = "KeepSync";

/// The stored settings document could not be parsed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unable to parse the stored sync settings document: {reason}")]
pub struct CorruptDocument {
    reason: String,
}

impl CorruptDocument {
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// What a [`SettingsStore::load`] found.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing stored under the settings key yet; the in-memory map is
    /// left untouched.
    Missing,
    /// Document parsed; the in-memory map was replaced.
    Loaded { entries: usize },
    /// The document was corrupt. The store was reset to empty and the
    /// empty state re-persisted so the next load succeeds. All settings
    /// are lost; the caller decides how to surface this to the user.
    Reset { error: CorruptDocument },
}

/// Settings for every database known to the plugin, keyed by local path.
///
/// Owns the in-memory map and the collaborators needed to persist it:
/// the host configuration slot the document is written to and the
/// credential vault that holds vault-stored tokens.
pub struct SettingsStore {
    host: Arc<dyn HostConfigSlot>,
    vault: Arc<dyn CredentialVault>,
    databases: HashMap<String, SyncSettings>,
}

impl SettingsStore {
    pub fn new(host: Arc<dyn HostConfigSlot>, vault: Arc<dyn CredentialVault>) -> Self {
        Self {
            host,
            vault,
            databases: HashMap::new(),
        }
    }

    /// Settings for the database at `local_path`, creating a default
    /// entry on first access.
    pub fn entry(&mut self, local_path: &str) -> &mut SyncSettings {
        self.databases.entry(local_path.to_string()).or_default()
    }

    /// Settings for the database at `local_path`, if an entry exists.
    pub fn get(&self, local_path: &str) -> Option<&SyncSettings> {
        self.databases.get(local_path)
    }

    pub fn contains(&self, local_path: &str) -> bool {
        self.databases.contains_key(local_path)
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SyncSettings)> {
        self.databases.iter().map(|(path, s)| (path.as_str(), s))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }

    /// Load the settings document from the host configuration slot.
    ///
    /// An absent or empty slot leaves the in-memory map untouched. A
    /// corrupt document resets the store to empty and immediately
    /// re-persists the empty state; see [`LoadOutcome::Reset`].
    ///
    /// Vault-stored tokens never travel in the document, so entries
    /// whose storage target is the credential vault are rehydrated from
    /// it here. A vault read failure leaves that entry without a token
    /// and does not fail the load.
    pub fn load(&mut self) -> Result<LoadOutcome> {
        let raw = self
            .host
            .get_string(SETTINGS_KEY)
            .context("Failed to read sync settings from the host configuration store")?;

        let raw = match raw {
            Some(value) if !value.is_empty() => value,
            _ => return Ok(LoadOutcome::Missing),
        };

        let records: HashMap<String, SettingsRecord> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "Stored sync settings are unreadable; resetting to empty");
                self.databases.clear();
                self.save()
                    .context("Failed to re-persist settings after reset")?;
                return Ok(LoadOutcome::Reset {
                    error: CorruptDocument {
                        reason: err.to_string(),
                    },
                });
            }
        };

        let mut databases: HashMap<String, SyncSettings> = records
            .into_iter()
            .map(|(path, record)| (path, SyncSettings::from(record)))
            .collect();

        for (path, settings) in &mut databases {
            if settings.token_storage == Some(TokenStorage::CredentialVault) {
                match self.vault.get(path) {
                    Ok(token) => settings.refresh_token = token,
                    Err(err) => {
                        warn!(
                            path = %path,
                            error = %err,
                            "Failed to read refresh token from the credential vault"
                        );
                    }
                }
            }
        }

        let entries = databases.len();
        self.databases = databases;
        debug!(entries, "Loaded sync settings");
        Ok(LoadOutcome::Loaded { entries })
    }

    /// Write the settings document to the host configuration slot.
    ///
    /// Each entry is projected to its redacted record; tokens targeted at
    /// the open database or the credential vault are written to those
    /// stores here. Failing to place a token in its alternate storage
    /// fails the save, since the redacted document no longer carries it.
    pub fn save(&self) -> Result<()> {
        let mut records: HashMap<String, SettingsRecord> =
            HashMap::with_capacity(self.databases.len());

        for (path, settings) in &self.databases {
            match settings.token_storage {
                // The token travels inside the record, or does not exist
                // anywhere durable yet.
                Some(TokenStorage::Disk) | None => {}
                Some(TokenStorage::HostDatabase) => {
                    if let (Some(database), Some(token)) =
                        (&settings.database, &settings.refresh_token)
                    {
                        if !token.expose_secret().is_empty() {
                            database.write_secret(token).with_context(|| {
                                format!("Failed to store the refresh token in the database for {path}")
                            })?;
                        }
                    }
                }
                Some(TokenStorage::CredentialVault) => {
                    if let Some(token) = &settings.refresh_token {
                        if !token.expose_secret().is_empty() {
                            self.vault.set(path, token).with_context(|| {
                                format!(
                                    "Failed to store the refresh token in the credential vault for {path}"
                                )
                            })?;
                        }
                    }
                }
            }

            records.insert(path.clone(), settings.to_record());
        }

        let document =
            serde_json::to_string(&records).context("Failed to serialize sync settings")?;
        self.host
            .set_string(SETTINGS_KEY, &document)
            .context("Failed to write sync settings to the host configuration store")?;

        debug!(entries = records.len(), "Saved sync settings");
        Ok(())
    }

    /// Remove the entry for `local_path` and flush.
    ///
    /// Returns `Ok(false)` without touching anything if no entry exists.
    /// A vault-stored token is purged best-effort; a token embedded in
    /// the database itself cannot be purged without the database open
    /// and writable, so it stays where it is.
    pub fn remove(&mut self, local_path: &str) -> Result<bool> {
        let Some(settings) = self.databases.get(local_path) else {
            return Ok(false);
        };

        match settings.token_storage {
            // Removing the record removes the token with it.
            Some(TokenStorage::Disk) | None => {}
            Some(TokenStorage::HostDatabase) => {}
            Some(TokenStorage::CredentialVault) => {
                if let Err(err) = self.vault.delete(local_path) {
                    warn!(
                        path = %local_path,
                        error = %err,
                        "Failed to remove refresh token from the credential vault"
                    );
                }
            }
        }

        self.databases.remove(local_path);
        self.save()?;
        Ok(true)
    }
}
