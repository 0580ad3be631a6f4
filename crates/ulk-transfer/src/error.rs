use ulk_types::{AccountId, Amount};

/// Errors from value-transfer operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The payer cannot cover the transfer.
    #[error("insufficient funds in {account}: needed {needed}, available {available}")]
    InsufficientFunds {
        account: AccountId,
        needed: Amount,
        available: Amount,
    },

    /// The beneficiary refused the incoming transfer.
    #[error("beneficiary {0} rejected the transfer")]
    BeneficiaryRejected(AccountId),

    /// Crediting the beneficiary would overflow its balance.
    #[error("balance overflow crediting {0}")]
    Overflow(AccountId),

    /// The transfer backend could not be reached.
    #[error("transfer backend unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;
