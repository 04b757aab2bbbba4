//! In-memory credential vault for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

use super::CredentialVault;

/// Credential vault held in memory, for tests.
#[derive(Default)]
pub struct MemoryVault {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialVault for MemoryVault {
    fn get(&self, key: &str) -> Result<Option<SecretString>> {
        let secrets = self.secrets.lock().expect("vault lock poisoned");
        Ok(secrets.get(key).map(|v| SecretString::from(v.clone())))
    }

    fn set(&self, key: &str, value: &SecretString) -> Result<()> {
        let mut secrets = self.secrets.lock().expect("vault lock poisoned");
        secrets.insert(key.to_string(), value.expose_secret().to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut secrets = self.secrets.lock().expect("vault lock poisoned");
        secrets.remove(key);
        Ok(())
    }
}
