use std::sync::Arc;

use anyhow::Result;
use keepsync::host::{HostConfigSlot, MemoryConfigSlot};
use keepsync::settings::{SettingsStore, TokenStorage};
use keepsync::vault::{CredentialVault, MemoryVault};
use secrecy::SecretString;

const SETTINGS_KEY: &str = "KeepSync";

#[test]
fn remove_purges_vault_token_and_flushes() -> Result<()> {
    let host = Arc::new(MemoryConfigSlot::new());
    let vault = Arc::new(MemoryVault::new());

    let mut store = SettingsStore::new(host.clone(), vault.clone());
    let settings = store.entry("/databases/work.kdbx");
    settings.token_storage = Some(TokenStorage::CredentialVault);
    settings.refresh_token = Some(SecretString::from("vault-secret".to_string()));
    store.save()?;
    assert!(vault.get("/databases/work.kdbx")?.is_some());

    assert!(store.remove("/databases/work.kdbx")?);

    // Gone from the vault, the map, and the persisted document.
    assert!(vault.get("/databases/work.kdbx")?.is_none());
    assert!(!store.contains("/databases/work.kdbx"));
    let raw = host.get_string(SETTINGS_KEY)?.unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw)?;
    assert!(document.get("/databases/work.kdbx").is_none());

    // Removing again is a no-op.
    assert!(!store.remove("/databases/work.kdbx")?);
    Ok(())
}

#[test]
fn remove_disk_entry_only_drops_the_record() -> Result<()> {
    let host = Arc::new(MemoryConfigSlot::new());
    let vault = Arc::new(MemoryVault::new());

    let mut store = SettingsStore::new(host.clone(), vault);
    let settings = store.entry("/databases/personal.kdbx");
    settings.token_storage = Some(TokenStorage::Disk);
    settings.refresh_token = Some(SecretString::from("disk-token".to_string()));
    store.save()?;

    assert!(store.remove("/databases/personal.kdbx")?);

    let raw = host.get_string(SETTINGS_KEY)?.unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(document, serde_json::json!({}));
    Ok(())
}

#[test]
fn remove_leaves_database_embedded_token_in_place() -> Result<()> {
    // A token written into the database itself cannot be purged without
    // the database open and writable; remove only drops the entry.
    let host = Arc::new(MemoryConfigSlot::new());
    let vault = Arc::new(MemoryVault::new());

    let mut store = SettingsStore::new(host, vault);
    let settings = store.entry("/databases/shared.kdbx");
    settings.token_storage = Some(TokenStorage::HostDatabase);

    assert!(store.remove("/databases/shared.kdbx")?);
    assert!(!store.contains("/databases/shared.kdbx"));
    Ok(())
}
