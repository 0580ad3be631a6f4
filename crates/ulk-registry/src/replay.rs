use std::collections::{BTreeMap, BTreeSet};

use ulk_types::{AccountId, Amount, Item};

use crate::error::{RegistryError, RegistryResult};
use crate::journal::{JournalEntry, JournalEvent};
use crate::records::UnlockFact;
use crate::validation::JournalValidator;

/// State rebuilt from a journal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub items: Vec<Item>,
    pub unlocks: BTreeSet<UnlockFact>,
    pub earnings: BTreeMap<AccountId, Amount>,
    pub applied_entries: u64,
}

/// Deterministic replay of registry journals.
pub struct ReplayEngine;

impl ReplayEngine {
    /// Rebuild catalog and unlock facts from `entries`.
    ///
    /// The journal is validated first; the first violation aborts the replay.
    pub fn replay(entries: &[JournalEntry]) -> RegistryResult<ReplayResult> {
        let report = JournalValidator::validate(entries);
        if let Some(violation) = report.violations.first() {
            return Err(RegistryError::Integrity {
                seq: violation.seq,
                reason: violation.description.clone(),
            });
        }

        let mut result = ReplayResult {
            items: Vec::with_capacity(report.item_count as usize),
            unlocks: BTreeSet::new(),
            earnings: BTreeMap::new(),
            applied_entries: 0,
        };

        for entry in entries {
            match &entry.event {
                JournalEvent::ItemCreated { item } => result.items.push(item.clone()),
                JournalEvent::ItemUnlocked {
                    item_id,
                    caller,
                    amount,
                    beneficiary,
                } => {
                    result.unlocks.insert(UnlockFact::new(*item_id, *caller));
                    let total = result.earnings.entry(*beneficiary).or_default();
                    *total = total.saturating_add(*amount);
                }
            }
            result.applied_entries += 1;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use ulk_transfer::InMemoryBank;
    use ulk_types::ItemId;

    use crate::memory::InMemoryRegistry;
    use crate::traits::{CatalogWriter, UnlockLedger};

    fn owner() -> AccountId {
        AccountId::from_name("owner")
    }

    fn populated() -> InMemoryRegistry<Arc<InMemoryBank>> {
        let bank = Arc::new(InMemoryBank::with_config(
            &ulk_transfer::BankConfig::with_opening_balance(1_000),
        ));
        let registry = InMemoryRegistry::new(bank);
        let a = registry.create_item("pa", "ga", 100, owner()).unwrap();
        let b = registry
            .create_item("pb", "gb", 40, AccountId::from_name("maker"))
            .unwrap();
        for name in ["x", "y", "z"] {
            registry.unlock(a, AccountId::from_name(name), 100).unwrap();
        }
        registry.unlock(b, AccountId::from_name("x"), 40).unwrap();
        registry
    }

    #[test]
    fn replay_rebuilds_registry_state() {
        let registry = populated();
        let result = ReplayEngine::replay(&registry.journal().unwrap()).unwrap();

        assert_eq!(result.applied_entries, 6);
        assert_eq!(result.items, registry.snapshot().unwrap().items);
        assert_eq!(result.unlocks.len(), 4);
        assert!(result
            .unlocks
            .contains(&UnlockFact::new(ItemId::new(1), AccountId::from_name("x"))));
        assert_eq!(result.earnings[&owner()], 300);
        assert_eq!(result.earnings[&AccountId::from_name("maker")], 40);
    }

    #[test]
    fn replay_of_empty_journal_is_empty() {
        let result = ReplayEngine::replay(&[]).unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.applied_entries, 0);
    }

    #[test]
    fn replay_refuses_tampered_journal() {
        let registry = populated();
        let mut journal = registry.journal().unwrap();
        journal.remove(1);
        assert!(matches!(
            ReplayEngine::replay(&journal),
            Err(RegistryError::Integrity { seq: 3, .. })
        ));
    }
}
