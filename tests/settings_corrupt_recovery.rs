use std::sync::Arc;

use anyhow::Result;
use keepsync::host::{HostConfigSlot, MemoryConfigSlot};
use keepsync::settings::{LoadOutcome, SettingsStore};
use keepsync::vault::MemoryVault;

const SETTINGS_KEY: &str = "KeepSync";

#[test]
fn corrupt_document_resets_store_and_reflushes_empty_state() -> Result<()> {
    let host = Arc::new(MemoryConfigSlot::new());
    let vault = Arc::new(MemoryVault::new());
    host.set_string(SETTINGS_KEY, "{not valid json")?;

    let mut store = SettingsStore::new(host.clone(), vault);
    store.entry("/stale-in-memory.kdbx");

    let LoadOutcome::Reset { error } = store.load()? else {
        panic!("expected a corrupt-document reset");
    };
    assert!(!error.reason().is_empty());

    // Everything in memory is forfeited.
    assert!(store.is_empty());

    // The empty state was flushed so the next load succeeds.
    let raw = host.get_string(SETTINGS_KEY)?.unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(document, serde_json::json!({}));

    let outcome = store.load()?;
    assert!(matches!(outcome, LoadOutcome::Loaded { entries: 0 }));
    Ok(())
}

#[test]
fn document_with_unknown_fields_still_loads() -> Result<()> {
    let host = Arc::new(MemoryConfigSlot::new());
    let vault = Arc::new(MemoryVault::new());
    host.set_string(
        SETTINGS_KEY,
        r#"{"/db.kdbx":{"DoNotSync":true,"SomeNewerField":"ignored"}}"#,
    )?;

    let mut store = SettingsStore::new(host, vault);
    let outcome = store.load()?;
    assert!(matches!(outcome, LoadOutcome::Loaded { entries: 1 }));
    assert!(store.get("/db.kdbx").unwrap().sync_disabled);
    Ok(())
}
