//! Host application collaborators.
//!
//! The plugin does not own its persistence: settings live in a string
//! key/value configuration slot provided by the hosting application, and
//! a refresh token can be embedded in the open database itself.

mod file;
mod memory;

pub use file::FileConfigSlot;
pub use memory::MemoryConfigSlot;

use anyhow::Result;
use secrecy::SecretString;

/// String-keyed persistent configuration slot owned by the host.
///
/// The host decides where and how this is stored; the plugin only ever
/// sees one string value per key.
pub trait HostConfigSlot: Send + Sync {
    /// Retrieve the stored value, or `None` if the key has never been written.
    fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_string(&self, key: &str, value: &str) -> Result<()>;
}

/// A database currently open in the host process.
///
/// Only available while the host has the database open. Used to embed
/// the refresh token in the database's own storage instead of the
/// settings document.
pub trait HostDatabase: Send + Sync {
    /// Write the refresh token into the database's own storage.
    fn write_secret(&self, token: &SecretString) -> Result<()>;
}
