use ulk_transfer::TransferError;
use ulk_types::{AccountId, Amount, ItemId};

/// Errors produced by registry operations.
///
/// Every variant is caller-recoverable; a failed operation commits nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("item {0} not found")]
    NotFound(ItemId),

    #[error("Incorrect price for item {item}: expected {expected}, paid {paid}")]
    IncorrectPrice {
        item: ItemId,
        expected: Amount,
        paid: Amount,
    },

    /// The caller already holds an unlock for this item.
    #[error("item {item} already unlocked for {caller}")]
    AlreadyUnlocked { item: ItemId, caller: AccountId },

    #[error("item {item} not unlocked for {caller}")]
    NotUnlocked { item: ItemId, caller: AccountId },

    /// Forwarding the payment to the creator failed; nothing was recorded.
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("invalid item: {0}")]
    InvalidItem(String),

    #[error("integrity violation at seq {seq}: {reason}")]
    Integrity { seq: u64, reason: String },

    /// A journalled snapshot was opened with journalling disabled.
    #[error("snapshot carries {entries} journal entries but journalling is disabled")]
    JournalDisabled { entries: usize },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("registry lock poisoned")]
    Poisoned,
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
