//! Per-database sync settings.
//!
//! Each local database file the plugin knows about has one
//! [`SyncSettings`] entry, keyed by its local path. The live entry
//! carries the refresh token and two runtime-only fields;
//! [`SettingsRecord`] is the redacted shape that lands in the host
//! configuration slot.

mod store;

pub use store::{CorruptDocument, LoadOutcome, SettingsStore};

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::host::HostDatabase;

/// Where a database's refresh token physically lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStorage {
    /// Inline in the persisted settings document.
    Disk,
    /// Inside the synced database's own storage.
    HostDatabase,
    /// In the platform credential vault, keyed by local path.
    CredentialVault,
}

/// Sync settings for one local database file.
///
/// The local path is the map key in [`SettingsStore`], not a field here.
#[derive(Clone)]
pub struct SyncSettings {
    /// Refresh token authorizing cloud API access.
    pub refresh_token: Option<SecretString>,
    /// Storage target for the token. `None` means no target has been
    /// chosen yet; the token then lives in memory only.
    pub token_storage: Option<TokenStorage>,
    /// Display label of the cloud drive this database syncs with.
    pub drive_name: Option<String>,
    /// Remote file location relative to the user's root.
    pub remote_path: Option<String>,
    /// Suppresses syncing of this database.
    pub sync_disabled: bool,
    /// Content fingerprint of the last-known local file state.
    pub local_file_hash: Option<String>,
    /// When the database last synced successfully.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// When the database was last compared with its remote counterpart.
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Runtime-only gate; never persisted.
    pub syncing_allowed: bool,
    /// The open database these settings belong to, while the host has it
    /// open. Never persisted; shared by reference on clone.
    pub database: Option<Arc<dyn HostDatabase>>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            refresh_token: None,
            token_storage: None,
            drive_name: None,
            remote_path: None,
            sync_disabled: false,
            local_file_hash: None,
            last_synced_at: None,
            last_checked_at: None,
            syncing_allowed: true,
            database: None,
        }
    }
}

impl fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSettings")
            .field("refresh_token", &self.refresh_token)
            .field("token_storage", &self.token_storage)
            .field("drive_name", &self.drive_name)
            .field("remote_path", &self.remote_path)
            .field("sync_disabled", &self.sync_disabled)
            .field("local_file_hash", &self.local_file_hash)
            .field("last_synced_at", &self.last_synced_at)
            .field("last_checked_at", &self.last_checked_at)
            .field("syncing_allowed", &self.syncing_allowed)
            .field("database", &self.database.as_ref().map(|_| "open"))
            .finish()
    }
}

impl SyncSettings {
    /// Whether this database should take part in syncing right now.
    pub fn should_sync(&self) -> bool {
        self.syncing_allowed && !self.sync_disabled
    }

    /// Record a completed sync against the given file fingerprint.
    pub fn mark_synced(&mut self, hash: impl Into<String>, clock: &dyn Clock) {
        let now = clock.now();
        self.local_file_hash = Some(hash.into());
        self.last_synced_at = Some(now);
        self.last_checked_at = Some(now);
    }

    /// Record a comparison against the remote counterpart.
    pub fn mark_checked(&mut self, clock: &dyn Clock) {
        self.last_checked_at = Some(clock.now());
    }

    /// Project the entry into its persisted shape.
    ///
    /// The token travels with the record only when its storage target is
    /// `Disk`; every other target (including none) keeps the record
    /// redacted.
    pub fn to_record(&self) -> SettingsRecord {
        let refresh_token = match self.token_storage {
            Some(TokenStorage::Disk) => self
                .refresh_token
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            Some(TokenStorage::HostDatabase) | Some(TokenStorage::CredentialVault) | None => None,
        };

        SettingsRecord {
            refresh_token,
            refresh_token_storage: self.token_storage,
            drive_name: self.drive_name.clone(),
            remote_path: self.remote_path.clone(),
            do_not_sync: self.sync_disabled,
            local_file_hash: self.local_file_hash.clone(),
            last_synced_at: self.last_synced_at,
            last_checked_at: self.last_checked_at,
        }
    }
}

/// Serialized form of one settings entry.
///
/// This is what lands in the settings document; the transient fields of
/// [`SyncSettings`] have no counterpart here, and the token field is
/// populated only for disk-stored tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SettingsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_storage: Option<TokenStorage>,
    #[serde(rename = "OneDriveName", skip_serializing_if = "Option::is_none")]
    pub drive_name: Option<String>,
    #[serde(rename = "RemoteDatabasePath", skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    pub do_not_sync: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_file_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl From<SettingsRecord> for SyncSettings {
    fn from(record: SettingsRecord) -> Self {
        Self {
            refresh_token: record.refresh_token.map(SecretString::from),
            token_storage: record.refresh_token_storage,
            drive_name: record.drive_name,
            remote_path: record.remote_path,
            sync_disabled: record.do_not_sync,
            local_file_hash: record.local_file_hash,
            last_synced_at: record.last_synced_at,
            last_checked_at: record.last_checked_at,
            syncing_allowed: true,
            database: None,
        }
    }
}
