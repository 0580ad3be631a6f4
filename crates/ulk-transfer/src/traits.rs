use serde::{Deserialize, Serialize};
use ulk_types::{AccountId, Amount};

use crate::error::TransferResult;

/// A request to move `amount` from `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Amount,
}

impl Transfer {
    pub fn new(from: AccountId, to: AccountId, amount: Amount) -> Self {
        Self { from, to, amount }
    }
}

/// Proof that a [`Transfer`] completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer: Transfer,
    /// Backend-assigned sequence number (1-based, monotonic).
    pub seq: u64,
}

/// Capability to forward value between accounts.
///
/// All implementations must satisfy these invariants:
/// - A transfer is all-or-nothing: on `Err` no balance has changed.
/// - A returned receipt means the beneficiary now owns `amount`.
/// - Transfers are never retried internally.
pub trait ValueTransfer: Send + Sync {
    /// Move value from `transfer.from` to `transfer.to`.
    fn forward(&self, transfer: &Transfer) -> TransferResult<TransferReceipt>;
}

impl<T: ValueTransfer + ?Sized> ValueTransfer for std::sync::Arc<T> {
    fn forward(&self, transfer: &Transfer) -> TransferResult<TransferReceipt> {
        (**self).forward(transfer)
    }
}

impl<T: ValueTransfer + ?Sized> ValueTransfer for &T {
    fn forward(&self, transfer: &Transfer) -> TransferResult<TransferReceipt> {
        (**self).forward(transfer)
    }
}
