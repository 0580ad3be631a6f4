//! Value-transfer boundary for the Unlock Registry.
//!
//! The registry never moves value itself. Every successful unlock forwards
//! the payment through an injected [`ValueTransfer`] implementation, and the
//! outcome of that call decides the outcome of the unlock.
//!
//! # Backends
//!
//! - [`InMemoryBank`] -- balance map behind a `RwLock`, for tests, demos and
//!   embedding
//!
//! # Design Rules
//!
//! 1. A transfer either completes in full or changes nothing.
//! 2. Failures are reported, never swallowed: the caller decides what to roll back.
//! 3. Implementations must be `Send + Sync`; the registry calls them while
//!    holding its write lock, so they must not call back into the registry.

pub mod config;
pub mod error;
pub mod memory;
pub mod traits;

pub use config::BankConfig;
pub use error::{TransferError, TransferResult};
pub use memory::{BankSnapshot, InMemoryBank};
pub use traits::{Transfer, TransferReceipt, ValueTransfer};
