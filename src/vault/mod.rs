//! Credential vault abstraction.
//!
//! When the user opts not to keep the refresh token in the settings
//! document, it goes to the platform secret store instead, keyed by the
//! local database path.

mod keyring;
mod memory;

pub use self::keyring::KeyringVault;
pub use self::memory::MemoryVault;

use anyhow::Result;
use secrecy::SecretString;

/// A key-value store for secrets.
pub trait CredentialVault: Send + Sync {
    /// Retrieve the secret stored under `key`.
    ///
    /// Returns `Ok(None)` if no secret exists for the key.
    fn get(&self, key: &str) -> Result<Option<SecretString>>;

    /// Store a secret under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &SecretString) -> Result<()>;

    /// Remove the secret stored under `key`.
    ///
    /// Succeeds if the key is absent.
    fn delete(&self, key: &str) -> Result<()>;
}
