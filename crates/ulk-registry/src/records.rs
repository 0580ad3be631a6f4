use serde::{Deserialize, Serialize};
use ulk_types::{AccountId, Amount, ItemId};

/// The durable fact that `caller` has paid for and unlocked `item_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnlockFact {
    pub item_id: ItemId,
    pub caller: AccountId,
}

impl UnlockFact {
    pub fn new(item_id: ItemId, caller: AccountId) -> Self {
        Self { item_id, caller }
    }
}

/// Returned by a successful unlock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockReceipt {
    pub fact: UnlockFact,
    pub amount: Amount,
    /// The item's creator, who now owns `amount`.
    pub beneficiary: AccountId,
    /// Sequence number assigned by the transfer backend.
    pub transfer_seq: u64,
    /// Journal position of the unlock, when journalling is enabled.
    pub journal_seq: Option<u64>,
}
