use ulk_types::{AccountId, Amount, ItemId, Listing};

use crate::error::RegistryResult;
use crate::records::UnlockReceipt;

/// Read boundary for the item catalog. Open to every caller.
pub trait CatalogReader: Send + Sync {
    /// Public view of an item; `NotFound` outside `[0, item_count)`.
    fn get_item(&self, item_id: ItemId) -> RegistryResult<Listing>;

    fn get_public_ref(&self, item_id: ItemId) -> RegistryResult<String>;

    fn item_count(&self) -> RegistryResult<u64>;

    fn items_by_creator(&self, creator: &AccountId) -> RegistryResult<Vec<ItemId>>;
}

/// Write boundary for the item catalog.
pub trait CatalogWriter: Send + Sync {
    /// Append a new item and return its dense, zero-based id.
    fn create_item(
        &self,
        public_ref: &str,
        gated_ref: &str,
        price: Amount,
        creator: AccountId,
    ) -> RegistryResult<ItemId>;
}

/// Per-caller unlock state and the payment protocol that changes it.
pub trait UnlockLedger: Send + Sync {
    /// Pay `paid` to unlock `item_id` for `caller`.
    ///
    /// Checks run in a fixed order: existence, exact price, prior unlock.
    /// The fact is recorded only if forwarding the payment to the item's
    /// creator succeeds; otherwise nothing changes.
    fn unlock(&self, item_id: ItemId, caller: AccountId, paid: Amount)
        -> RegistryResult<UnlockReceipt>;

    fn is_unlocked(&self, item_id: ItemId, caller: &AccountId) -> RegistryResult<bool>;

    /// The gated reference, released only to a caller holding an unlock.
    fn get_gated_ref(&self, item_id: ItemId, caller: &AccountId) -> RegistryResult<String>;

    /// Every caller that unlocked `item_id`, sorted.
    fn unlockers(&self, item_id: ItemId) -> RegistryResult<Vec<AccountId>>;

    fn unlock_count(&self, item_id: ItemId) -> RegistryResult<u64>;

    /// Total forwarded to `creator` through successful unlocks.
    fn earnings(&self, creator: &AccountId) -> RegistryResult<Amount>;
}
