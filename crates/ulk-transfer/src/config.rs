use serde::{Deserialize, Serialize};
use ulk_types::{AccountId, Amount};

/// Configuration for an [`InMemoryBank`](crate::InMemoryBank).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Balance credited to an account the first time the bank sees it.
    pub opening_balance: Amount,
    /// Accounts that refuse every incoming transfer.
    pub rejecting: Vec<AccountId>,
}

impl BankConfig {
    /// Every account starts with `amount`.
    pub fn with_opening_balance(amount: Amount) -> Self {
        Self {
            opening_balance: amount,
            ..Default::default()
        }
    }
}
