//! Platform keychain credential vault.
//!
//! Backed by the operating system secret store: Credential Manager on
//! Windows, Keychain on macOS, Secret Service on Linux. One keychain
//! entry per local database path, under a single service name.

use anyhow::{Context, Result};
use keyring::Entry;
use secrecy::{ExposeSecret, SecretString};

use super::CredentialVault;

const DEFAULT_SERVICE: &str = "keepsync";

/// Credential vault backed by the OS keychain.
pub struct KeyringVault {
    service: String,
}

impl KeyringVault {
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Use a custom keychain service name instead of the default.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key)
            .with_context(|| format!("Failed to open keychain entry for {key}"))
    }
}

impl Default for KeyringVault {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialVault for KeyringVault {
    fn get(&self, key: &str) -> Result<Option<SecretString>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(SecretString::from(value))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Failed to read keychain entry for {key}")),
        }
    }

    fn set(&self, key: &str, value: &SecretString) -> Result<()> {
        self.entry(key)?
            .set_password(value.expose_secret())
            .with_context(|| format!("Failed to write keychain entry for {key}"))
    }

    fn delete(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to delete keychain entry for {key}"))
            }
        }
    }
}
