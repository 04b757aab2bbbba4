//! In-memory configuration slot for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;

use super::HostConfigSlot;

/// Configuration slot held in memory, for tests.
#[derive(Default)]
pub struct MemoryConfigSlot {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryConfigSlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostConfigSlot for MemoryConfigSlot {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().expect("config slot lock poisoned");
        Ok(values.get(key).cloned())
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().expect("config slot lock poisoned");
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() -> Result<()> {
        let slot = MemoryConfigSlot::new();
        assert_eq!(slot.get_string("missing")?, None);

        slot.set_string("key", "value")?;
        assert_eq!(slot.get_string("key")?.as_deref(), Some("value"));

        slot.set_string("key", "replaced")?;
        assert_eq!(slot.get_string("key")?.as_deref(), Some("replaced"));
        Ok(())
    }
}
