use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ulk_types::Item;

use crate::error::{RegistryError, RegistryResult};
use crate::journal::JournalEntry;
use crate::records::UnlockFact;

/// Point-in-time copy of a registry, suitable for persistence.
///
/// Restore with [`InMemoryRegistry::restore`](crate::InMemoryRegistry::restore).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub items: Vec<Item>,
    /// Sorted by item, then caller.
    pub unlocks: Vec<UnlockFact>,
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
}

impl RegistrySnapshot {
    pub fn to_json(&self) -> RegistryResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RegistryError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> RegistryResult<Self> {
        serde_json::from_str(json).map_err(|e| RegistryError::Serialization(e.to_string()))
    }

    /// Write the snapshot to `path`, replacing any existing file.
    pub fn save_json(&self, path: &Path) -> RegistryResult<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| RegistryError::Io(e.to_string()))?;
        debug!(path = %path.display(), items = self.items.len(), "snapshot saved");
        Ok(())
    }

    pub fn load_json(path: &Path) -> RegistryResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| RegistryError::Io(e.to_string()))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulk_transfer::InMemoryBank;
    use ulk_types::{AccountId, ItemId};

    use crate::config::RegistryConfig;
    use crate::memory::InMemoryRegistry;
    use crate::traits::{CatalogReader, CatalogWriter, UnlockLedger};

    #[test]
    fn save_and_load_roundtrip_through_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let bank = InMemoryBank::with_config(&ulk_transfer::BankConfig::with_opening_balance(50));
        let registry = InMemoryRegistry::new(bank);
        let owner = AccountId::from_name("owner");
        let buyer = AccountId::from_name("buyer");
        let id = registry.create_item("publicUrl1", "privateUrl1", 50, owner).unwrap();
        registry.unlock(id, buyer, 50).unwrap();

        registry.snapshot().unwrap().save_json(&path).unwrap();
        let loaded = RegistrySnapshot::load_json(&path).unwrap();
        assert_eq!(loaded, registry.snapshot().unwrap());

        let restored =
            InMemoryRegistry::restore(loaded, InMemoryBank::new(), RegistryConfig::default())
                .unwrap();
        assert_eq!(restored.get_gated_ref(id, &buyer).unwrap(), "privateUrl1");
        assert_eq!(restored.item_count().unwrap(), 1);
        assert_eq!(restored.get_item(ItemId::new(0)).unwrap().price, 50);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RegistrySnapshot::load_json(&dir.path().join("absent.json")),
            Err(RegistryError::Io(_))
        ));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        assert!(matches!(
            RegistrySnapshot::from_json("{not json"),
            Err(RegistryError::Serialization(_))
        ));
    }

    #[test]
    fn journal_field_is_optional() {
        let snapshot = RegistrySnapshot::from_json(r#"{"items": [], "unlocks": []}"#).unwrap();
        assert_eq!(snapshot, RegistrySnapshot::default());
    }
}
