use serde::{Deserialize, Serialize};
use ulk_types::{AccountId, Amount, Item, ItemId};

use crate::error::{RegistryError, RegistryResult};

/// A committed registry mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEvent {
    ItemCreated {
        item: Item,
    },
    ItemUnlocked {
        item_id: ItemId,
        caller: AccountId,
        amount: Amount,
        beneficiary: AccountId,
    },
}

impl JournalEvent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ItemCreated { .. } => "item_created",
            Self::ItemUnlocked { .. } => "item_unlocked",
        }
    }
}

/// One link of the hash-chained journal.
///
/// `entry_hash` covers `seq`, `prev_hash` and `event`; `prev_hash` is the
/// `entry_hash` of the preceding entry (`None` for the first).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    pub prev_hash: Option<[u8; 32]>,
    pub event: JournalEvent,
    pub entry_hash: [u8; 32],
}

#[derive(Serialize)]
struct CanonicalEntry<'a> {
    seq: u64,
    prev_hash: Option<[u8; 32]>,
    event: &'a JournalEvent,
}

impl JournalEntry {
    /// Build the entry that follows `previous` (or the first entry).
    pub fn next(previous: Option<&JournalEntry>, event: JournalEvent) -> RegistryResult<Self> {
        let seq = previous.map_or(1, |p| p.seq + 1);
        let prev_hash = previous.map(|p| p.entry_hash);
        let entry_hash = compute_entry_hash(seq, prev_hash, &event)?;
        Ok(Self {
            seq,
            prev_hash,
            event,
            entry_hash,
        })
    }

    /// Recompute the hash from the entry's content.
    pub fn recompute_hash(&self) -> RegistryResult<[u8; 32]> {
        compute_entry_hash(self.seq, self.prev_hash, &self.event)
    }

    /// Short hex representation of the entry hash.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.entry_hash[..4])
    }
}

fn compute_entry_hash(
    seq: u64,
    prev_hash: Option<[u8; 32]>,
    event: &JournalEvent,
) -> RegistryResult<[u8; 32]> {
    let encoded = serde_json::to_vec(&CanonicalEntry {
        seq,
        prev_hash,
        event,
    })
    .map_err(|e| RegistryError::Serialization(e.to_string()))?;

    let mut hasher = blake3::Hasher::new();
    hasher.update(b"ulk-journal-v1:");
    hasher.update(&encoded);
    Ok(*hasher.finalize().as_bytes())
}
