//! Item catalog and unlock ledger for the Unlock Registry (ULK).
//!
//! This crate is the heart of ULK. It provides:
//! - `CatalogReader` / `CatalogWriter` / `UnlockLedger` trait boundaries
//! - `InMemoryRegistry`, a single service object owning the catalog and the
//!   unlock facts, with value forwarding through an injected
//!   [`ValueTransfer`](ulk_transfer::ValueTransfer)
//! - A hash-chained journal of committed mutations
//! - Journal validation and deterministic replay
//! - JSON snapshots for persistence

pub mod config;
pub mod error;
pub mod journal;
pub mod memory;
pub mod records;
pub mod replay;
pub mod snapshot;
pub mod traits;
pub mod validation;

pub use config::RegistryConfig;
pub use error::{RegistryError, RegistryResult};
pub use journal::{JournalEntry, JournalEvent};
pub use memory::InMemoryRegistry;
pub use records::{UnlockFact, UnlockReceipt};
pub use replay::{ReplayEngine, ReplayResult};
pub use snapshot::RegistrySnapshot;
pub use traits::{CatalogReader, CatalogWriter, UnlockLedger};
pub use validation::{JournalValidator, ValidationReport, Violation, ViolationKind};
