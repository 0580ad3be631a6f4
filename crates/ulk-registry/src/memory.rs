use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};
use ulk_transfer::{Transfer, ValueTransfer};
use ulk_types::{AccountId, Amount, Item, ItemId, Listing};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::journal::{JournalEntry, JournalEvent};
use crate::records::{UnlockFact, UnlockReceipt};
use crate::replay::ReplayEngine;
use crate::snapshot::RegistrySnapshot;
use crate::traits::{CatalogReader, CatalogWriter, UnlockLedger};
use crate::validation::{JournalValidator, ValidationReport};

/// In-memory registry: the catalog and the unlock ledger behind one lock.
///
/// Mutations (`create_item`, `unlock`) hold the write lock for their whole
/// check-forward-record sequence, so they are serialized against each other
/// and readers never observe a half-committed unlock. Reads share the lock.
pub struct InMemoryRegistry<T: ValueTransfer> {
    transfer: T,
    config: RegistryConfig,
    inner: RwLock<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    items: Vec<Item>,
    unlocks: HashSet<UnlockFact>,
    earnings: HashMap<AccountId, Amount>,
    journal: Vec<JournalEntry>,
}

impl RegistryState {
    fn item(&self, item_id: ItemId) -> RegistryResult<&Item> {
        self.items
            .get(item_id.index())
            .ok_or(RegistryError::NotFound(item_id))
    }

    /// Journal entry for `event`, or `None` when journalling is off.
    fn prepare_entry(
        &self,
        config: &RegistryConfig,
        event: JournalEvent,
    ) -> RegistryResult<Option<JournalEntry>> {
        if !config.journal_enabled {
            return Ok(None);
        }
        JournalEntry::next(self.journal.last(), event).map(Some)
    }
}

/// Journal for state that was committed without one: every item in id
/// order, then every unlock paid at the item's price to its creator.
fn rebuild_journal(
    items: &[Item],
    unlocks: &BTreeSet<UnlockFact>,
) -> RegistryResult<Vec<JournalEntry>> {
    let created = items
        .iter()
        .map(|item| JournalEvent::ItemCreated { item: item.clone() });
    let unlocked = unlocks.iter().filter_map(|fact| {
        items
            .get(fact.item_id.index())
            .map(|item| JournalEvent::ItemUnlocked {
                item_id: fact.item_id,
                caller: fact.caller,
                amount: item.price,
                beneficiary: item.creator,
            })
    });

    let mut journal: Vec<JournalEntry> = Vec::with_capacity(items.len() + unlocks.len());
    for event in created.chain(unlocked) {
        let entry = JournalEntry::next(journal.last(), event)?;
        journal.push(entry);
    }
    Ok(journal)
}

impl<T: ValueTransfer> InMemoryRegistry<T> {
    pub fn new(transfer: T) -> Self {
        Self::with_config(transfer, RegistryConfig::default())
    }

    pub fn with_config(transfer: T, config: RegistryConfig) -> Self {
        Self {
            transfer,
            config,
            inner: RwLock::new(RegistryState::default()),
        }
    }

    /// Rebuild a registry from a snapshot.
    ///
    /// Item ids must be dense and every unlock must reference an existing
    /// item. With journalling enabled a non-empty journal must replay to
    /// exactly the snapshot's items and unlocks, and an empty one is rebuilt
    /// from them. With journalling disabled a snapshot that carries a journal
    /// is refused so its history is never discarded.
    pub fn restore(
        snapshot: RegistrySnapshot,
        transfer: T,
        config: RegistryConfig,
    ) -> RegistryResult<Self> {
        let RegistrySnapshot {
            items,
            unlocks,
            journal,
        } = snapshot;

        for (index, item) in items.iter().enumerate() {
            if item.id.index() != index {
                return Err(RegistryError::Integrity {
                    seq: 0,
                    reason: format!("item at position {index} carries id {}", item.id),
                });
            }
        }

        let mut facts = HashSet::with_capacity(unlocks.len());
        let mut earnings: HashMap<AccountId, Amount> = HashMap::new();
        for fact in unlocks {
            let item = items
                .get(fact.item_id.index())
                .ok_or_else(|| RegistryError::Integrity {
                    seq: 0,
                    reason: format!("unlock references missing item {}", fact.item_id),
                })?;
            if !facts.insert(fact) {
                return Err(RegistryError::Integrity {
                    seq: 0,
                    reason: format!(
                        "duplicate unlock of {} for {}",
                        fact.item_id, fact.caller
                    ),
                });
            }
            let total = earnings.entry(item.creator).or_default();
            *total = total.saturating_add(item.price);
        }

        let expected: BTreeSet<UnlockFact> = facts.iter().copied().collect();
        let journal = match (config.journal_enabled, journal.is_empty()) {
            (true, true) => {
                let rebuilt = rebuild_journal(&items, &expected)?;
                if !rebuilt.is_empty() {
                    info!(entries = rebuilt.len(), "journal rebuilt from snapshot state");
                }
                rebuilt
            }
            (true, false) => {
                let replayed = ReplayEngine::replay(&journal)?;
                if replayed.items != items || replayed.unlocks != expected {
                    return Err(RegistryError::Integrity {
                        seq: journal.len() as u64,
                        reason: "snapshot state diverges from its journal".into(),
                    });
                }
                journal
            }
            (false, true) => journal,
            (false, false) => {
                return Err(RegistryError::JournalDisabled {
                    entries: journal.len(),
                })
            }
        };

        info!(
            items = items.len(),
            unlocks = facts.len(),
            journal = journal.len(),
            "registry restored"
        );

        Ok(Self {
            transfer,
            config,
            inner: RwLock::new(RegistryState {
                items,
                unlocks: facts,
                earnings,
                journal,
            }),
        })
    }

    /// Consistent copy of the full registry state.
    ///
    /// The copy includes every item's gated reference and bypasses the
    /// unlock check, so it is only for trusted persistence paths.
    pub fn snapshot(&self) -> RegistryResult<RegistrySnapshot> {
        let state = self.read()?;
        let unlocks: BTreeSet<UnlockFact> = state.unlocks.iter().copied().collect();
        Ok(RegistrySnapshot {
            items: state.items.clone(),
            unlocks: unlocks.into_iter().collect(),
            journal: state.journal.clone(),
        })
    }

    /// Copy of the journal.
    pub fn journal(&self) -> RegistryResult<Vec<JournalEntry>> {
        Ok(self.read()?.journal.clone())
    }

    pub fn validate_journal(&self) -> RegistryResult<ValidationReport> {
        let journal = self.journal()?;
        Ok(JournalValidator::validate(&journal))
    }

    /// The injected transfer capability.
    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn check_ref(&self, label: &str, value: &str) -> RegistryResult<()> {
        match self.config.max_ref_len {
            Some(max) if value.len() > max => Err(RegistryError::InvalidItem(format!(
                "{label} is {} bytes, limit is {max}",
                value.len()
            ))),
            _ => Ok(()),
        }
    }

    fn read(&self) -> RegistryResult<RwLockReadGuard<'_, RegistryState>> {
        self.inner.read().map_err(|_| RegistryError::Poisoned)
    }

    fn write(&self) -> RegistryResult<RwLockWriteGuard<'_, RegistryState>> {
        self.inner.write().map_err(|_| RegistryError::Poisoned)
    }
}

impl<T: ValueTransfer> CatalogReader for InMemoryRegistry<T> {
    fn get_item(&self, item_id: ItemId) -> RegistryResult<Listing> {
        Ok(self.read()?.item(item_id)?.listing())
    }

    fn get_public_ref(&self, item_id: ItemId) -> RegistryResult<String> {
        Ok(self.read()?.item(item_id)?.public_ref.clone())
    }

    fn item_count(&self) -> RegistryResult<u64> {
        Ok(self.read()?.items.len() as u64)
    }

    fn items_by_creator(&self, creator: &AccountId) -> RegistryResult<Vec<ItemId>> {
        Ok(self
            .read()?
            .items
            .iter()
            .filter(|item| &item.creator == creator)
            .map(|item| item.id)
            .collect())
    }
}

impl<T: ValueTransfer> CatalogWriter for InMemoryRegistry<T> {
    fn create_item(
        &self,
        public_ref: &str,
        gated_ref: &str,
        price: Amount,
        creator: AccountId,
    ) -> RegistryResult<ItemId> {
        self.check_ref("public reference", public_ref)?;
        self.check_ref("gated reference", gated_ref)?;

        let mut state = self.write()?;
        let item_id = ItemId::new(state.items.len() as u64);
        let item = Item::new(item_id, public_ref, gated_ref, price, creator);
        let entry = state.prepare_entry(
            &self.config,
            JournalEvent::ItemCreated { item: item.clone() },
        )?;

        state.items.push(item);
        if let Some(entry) = entry {
            state.journal.push(entry);
        }

        debug!(item = %item_id, %creator, price, "item created");
        Ok(item_id)
    }
}

impl<T: ValueTransfer> UnlockLedger for InMemoryRegistry<T> {
    fn unlock(
        &self,
        item_id: ItemId,
        caller: AccountId,
        paid: Amount,
    ) -> RegistryResult<UnlockReceipt> {
        let mut state = self.write()?;

        let item = state.item(item_id)?;
        if !item.is_exact_payment(paid) {
            return Err(RegistryError::IncorrectPrice {
                item: item_id,
                expected: item.price,
                paid,
            });
        }

        let fact = UnlockFact::new(item_id, caller);
        if state.unlocks.contains(&fact) {
            return Err(RegistryError::AlreadyUnlocked {
                item: item_id,
                caller,
            });
        }

        let beneficiary = item.creator;
        // Everything fallible besides the transfer happens before it, so a
        // successful forward is always followed by a commit.
        let entry = state.prepare_entry(
            &self.config,
            JournalEvent::ItemUnlocked {
                item_id,
                caller,
                amount: paid,
                beneficiary,
            },
        )?;

        let transfer = Transfer::new(caller, beneficiary, paid);
        let receipt = self.transfer.forward(&transfer).map_err(|e| {
            warn!(item = %item_id, %caller, error = %e, "unlock payment not forwarded");
            RegistryError::TransferFailed(e)
        })?;

        state.unlocks.insert(fact);
        let total = state.earnings.entry(beneficiary).or_default();
        *total = total.saturating_add(paid);
        let journal_seq = entry.map(|entry| {
            let seq = entry.seq;
            state.journal.push(entry);
            seq
        });

        debug!(item = %item_id, %caller, %beneficiary, amount = paid, "item unlocked");
        Ok(UnlockReceipt {
            fact,
            amount: paid,
            beneficiary,
            transfer_seq: receipt.seq,
            journal_seq,
        })
    }

    fn is_unlocked(&self, item_id: ItemId, caller: &AccountId) -> RegistryResult<bool> {
        let state = self.read()?;
        state.item(item_id)?;
        Ok(state.unlocks.contains(&UnlockFact::new(item_id, *caller)))
    }

    fn get_gated_ref(&self, item_id: ItemId, caller: &AccountId) -> RegistryResult<String> {
        let state = self.read()?;
        let item = state.item(item_id)?;
        if !state.unlocks.contains(&UnlockFact::new(item_id, *caller)) {
            return Err(RegistryError::NotUnlocked {
                item: item_id,
                caller: *caller,
            });
        }
        Ok(item.gated_ref.clone())
    }

    fn unlockers(&self, item_id: ItemId) -> RegistryResult<Vec<AccountId>> {
        let state = self.read()?;
        state.item(item_id)?;
        let callers: BTreeSet<AccountId> = state
            .unlocks
            .iter()
            .filter(|fact| fact.item_id == item_id)
            .map(|fact| fact.caller)
            .collect();
        Ok(callers.into_iter().collect())
    }

    fn unlock_count(&self, item_id: ItemId) -> RegistryResult<u64> {
        let state = self.read()?;
        state.item(item_id)?;
        Ok(state
            .unlocks
            .iter()
            .filter(|fact| fact.item_id == item_id)
            .count() as u64)
    }

    fn earnings(&self, creator: &AccountId) -> RegistryResult<Amount> {
        Ok(self
            .read()?
            .earnings
            .get(creator)
            .copied()
            .unwrap_or_default())
    }
}

impl<T: ValueTransfer> std::fmt::Debug for InMemoryRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (items, unlocks) = self
            .read()
            .map(|s| (s.items.len(), s.unlocks.len()))
            .unwrap_or_default();
        f.debug_struct("InMemoryRegistry")
            .field("item_count", &items)
            .field("unlock_count", &unlocks)
            .field("config", &self.config)
            .finish()
    }
}
