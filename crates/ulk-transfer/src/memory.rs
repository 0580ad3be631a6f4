use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ulk_types::{AccountId, Amount};

use crate::config::BankConfig;
use crate::error::{TransferError, TransferResult};
use crate::traits::{Transfer, TransferReceipt, ValueTransfer};

/// In-memory account bank.
///
/// Intended for tests, demos and embedding. Balances live behind a `RwLock`;
/// a forward holds the write lock for its whole debit/credit so it is atomic
/// with respect to every other bank operation.
pub struct InMemoryBank {
    opening_balance: Amount,
    inner: RwLock<BankState>,
}

#[derive(Default)]
struct BankState {
    balances: HashMap<AccountId, Amount>,
    rejecting: HashSet<AccountId>,
    transfers: u64,
}

/// Serializable copy of a bank's balances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSnapshot {
    pub balances: BTreeMap<AccountId, Amount>,
    pub rejecting: BTreeSet<AccountId>,
    pub transfers: u64,
}

impl InMemoryBank {
    /// Create a new bank where every account starts empty.
    pub fn new() -> Self {
        Self::with_config(&BankConfig::default())
    }

    pub fn with_config(config: &BankConfig) -> Self {
        let state = BankState {
            rejecting: config.rejecting.iter().copied().collect(),
            ..Default::default()
        };
        Self {
            opening_balance: config.opening_balance,
            inner: RwLock::new(state),
        }
    }

    /// Rebuild a bank from a snapshot. Accounts missing from the snapshot
    /// start with the configured opening balance.
    pub fn from_snapshot(snapshot: BankSnapshot, config: &BankConfig) -> Self {
        let mut rejecting: HashSet<AccountId> = snapshot.rejecting.into_iter().collect();
        rejecting.extend(config.rejecting.iter().copied());
        Self {
            opening_balance: config.opening_balance,
            inner: RwLock::new(BankState {
                balances: snapshot.balances.into_iter().collect(),
                rejecting,
                transfers: snapshot.transfers,
            }),
        }
    }

    /// Current balance of `account`.
    pub fn balance(&self, account: &AccountId) -> TransferResult<Amount> {
        let state = self.read()?;
        Ok(state
            .balances
            .get(account)
            .copied()
            .unwrap_or(self.opening_balance))
    }

    /// Credit `amount` to `account` from outside the bank. Returns the new balance.
    pub fn deposit(&self, account: AccountId, amount: Amount) -> TransferResult<Amount> {
        let mut state = self.write()?;
        let current = state
            .balances
            .get(&account)
            .copied()
            .unwrap_or(self.opening_balance);
        let updated = current
            .checked_add(amount)
            .ok_or(TransferError::Overflow(account))?;
        state.balances.insert(account, updated);
        debug!(%account, amount, balance = updated, "deposit");
        Ok(updated)
    }

    /// Make `account` refuse all further incoming transfers.
    pub fn reject_incoming(&self, account: AccountId) -> TransferResult<()> {
        self.write()?.rejecting.insert(account);
        Ok(())
    }

    /// Let `account` receive transfers again.
    pub fn accept_incoming(&self, account: &AccountId) -> TransferResult<()> {
        self.write()?.rejecting.remove(account);
        Ok(())
    }

    /// Number of completed transfers.
    pub fn transfer_count(&self) -> TransferResult<u64> {
        Ok(self.read()?.transfers)
    }

    pub fn snapshot(&self) -> TransferResult<BankSnapshot> {
        let state = self.read()?;
        Ok(BankSnapshot {
            balances: state.balances.iter().map(|(k, v)| (*k, *v)).collect(),
            rejecting: state.rejecting.iter().copied().collect(),
            transfers: state.transfers,
        })
    }

    fn read(&self) -> TransferResult<RwLockReadGuard<'_, BankState>> {
        self.inner
            .read()
            .map_err(|_| TransferError::Unavailable("bank read lock poisoned".into()))
    }

    fn write(&self) -> TransferResult<RwLockWriteGuard<'_, BankState>> {
        self.inner
            .write()
            .map_err(|_| TransferError::Unavailable("bank write lock poisoned".into()))
    }
}

impl Default for InMemoryBank {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueTransfer for InMemoryBank {
    fn forward(&self, transfer: &Transfer) -> TransferResult<TransferReceipt> {
        let mut state = self.write()?;

        if state.rejecting.contains(&transfer.to) {
            warn!(to = %transfer.to, amount = transfer.amount, "beneficiary rejected transfer");
            return Err(TransferError::BeneficiaryRejected(transfer.to));
        }

        let opening = self.opening_balance;
        let available = state.balances.get(&transfer.from).copied().unwrap_or(opening);
        if available < transfer.amount {
            return Err(TransferError::InsufficientFunds {
                account: transfer.from,
                needed: transfer.amount,
                available,
            });
        }

        // Compute both sides before touching the map so a failure leaves no trace.
        if transfer.from != transfer.to {
            let credited = state.balances.get(&transfer.to).copied().unwrap_or(opening);
            let credited = credited
                .checked_add(transfer.amount)
                .ok_or(TransferError::Overflow(transfer.to))?;
            state
                .balances
                .insert(transfer.from, available - transfer.amount);
            state.balances.insert(transfer.to, credited);
        }

        state.transfers += 1;
        let seq = state.transfers;
        debug!(
            from = %transfer.from,
            to = %transfer.to,
            amount = transfer.amount,
            seq,
            "transfer forwarded"
        );
        Ok(TransferReceipt {
            transfer: *transfer,
            seq,
        })
    }
}

impl std::fmt::Debug for InMemoryBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let accounts = self.read().map(|s| s.balances.len()).unwrap_or_default();
        f.debug_struct("InMemoryBank")
            .field("opening_balance", &self.opening_balance)
            .field("account_count", &accounts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::from_name("alice")
    }

    fn bob() -> AccountId {
        AccountId::from_name("bob")
    }

    fn funded_bank(amount: Amount) -> InMemoryBank {
        let bank = InMemoryBank::new();
        bank.deposit(alice(), amount).unwrap();
        bank
    }

    // -----------------------------------------------------------------------
    // Balances
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_account_has_opening_balance() {
        let bank = InMemoryBank::with_config(&BankConfig::with_opening_balance(250));
        assert_eq!(bank.balance(&bob()).unwrap(), 250);
    }

    #[test]
    fn deposit_accumulates() {
        let bank = InMemoryBank::new();
        assert_eq!(bank.deposit(alice(), 10).unwrap(), 10);
        assert_eq!(bank.deposit(alice(), 5).unwrap(), 15);
    }

    #[test]
    fn deposit_overflow_is_rejected() {
        let bank = funded_bank(Amount::MAX);
        assert_eq!(
            bank.deposit(alice(), 1),
            Err(TransferError::Overflow(alice()))
        );
        assert_eq!(bank.balance(&alice()).unwrap(), Amount::MAX);
    }

    // -----------------------------------------------------------------------
    // Forwarding
    // -----------------------------------------------------------------------

    #[test]
    fn forward_moves_value() {
        let bank = funded_bank(1000);
        let receipt = bank.forward(&Transfer::new(alice(), bob(), 400)).unwrap();
        assert_eq!(receipt.seq, 1);
        assert_eq!(bank.balance(&alice()).unwrap(), 600);
        assert_eq!(bank.balance(&bob()).unwrap(), 400);
    }

    #[test]
    fn insufficient_funds_changes_nothing() {
        let bank = funded_bank(100);
        let err = bank.forward(&Transfer::new(alice(), bob(), 101)).unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientFunds {
                account: alice(),
                needed: 101,
                available: 100
            }
        );
        assert_eq!(bank.balance(&alice()).unwrap(), 100);
        assert_eq!(bank.balance(&bob()).unwrap(), 0);
        assert_eq!(bank.transfer_count().unwrap(), 0);
    }

    #[test]
    fn rejecting_beneficiary_changes_nothing() {
        let bank = funded_bank(100);
        bank.reject_incoming(bob()).unwrap();
        let err = bank.forward(&Transfer::new(alice(), bob(), 50)).unwrap_err();
        assert_eq!(err, TransferError::BeneficiaryRejected(bob()));
        assert_eq!(bank.balance(&alice()).unwrap(), 100);

        bank.accept_incoming(&bob()).unwrap();
        bank.forward(&Transfer::new(alice(), bob(), 50)).unwrap();
        assert_eq!(bank.balance(&bob()).unwrap(), 50);
    }

    #[test]
    fn credit_overflow_changes_nothing() {
        let bank = funded_bank(10);
        bank.deposit(bob(), Amount::MAX).unwrap();
        let err = bank.forward(&Transfer::new(alice(), bob(), 1)).unwrap_err();
        assert_eq!(err, TransferError::Overflow(bob()));
        assert_eq!(bank.balance(&alice()).unwrap(), 10);
    }

    #[test]
    fn self_transfer_nets_zero() {
        let bank = funded_bank(70);
        bank.forward(&Transfer::new(alice(), alice(), 70)).unwrap();
        assert_eq!(bank.balance(&alice()).unwrap(), 70);
        assert_eq!(bank.transfer_count().unwrap(), 1);
    }

    #[test]
    fn zero_transfer_succeeds_without_funds() {
        let bank = InMemoryBank::new();
        bank.forward(&Transfer::new(alice(), bob(), 0)).unwrap();
        assert_eq!(bank.balance(&bob()).unwrap(), 0);
    }

    #[test]
    fn config_rejecting_accounts_apply() {
        let config = BankConfig {
            opening_balance: 100,
            rejecting: vec![bob()],
        };
        let bank = InMemoryBank::with_config(&config);
        assert!(bank.forward(&Transfer::new(alice(), bob(), 1)).is_err());
    }

    #[test]
    fn forward_through_arc() {
        use std::sync::Arc;
        let bank = Arc::new(funded_bank(5));
        let transfer: &dyn ValueTransfer = &bank;
        transfer.forward(&Transfer::new(alice(), bob(), 5)).unwrap();
        assert_eq!(bank.balance(&bob()).unwrap(), 5);
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    #[test]
    fn snapshot_restores_balances() {
        let bank = funded_bank(900);
        bank.forward(&Transfer::new(alice(), bob(), 300)).unwrap();
        bank.reject_incoming(alice()).unwrap();

        let snapshot = bank.snapshot().unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: BankSnapshot = serde_json::from_str(&json).unwrap();
        let restored = InMemoryBank::from_snapshot(parsed, &BankConfig::default());

        assert_eq!(restored.balance(&alice()).unwrap(), 600);
        assert_eq!(restored.balance(&bob()).unwrap(), 300);
        assert_eq!(restored.transfer_count().unwrap(), 1);
        assert!(restored
            .forward(&Transfer::new(bob(), alice(), 1))
            .is_err());
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_forwards_conserve_value() {
        use std::sync::Arc;
        use std::thread;

        let bank = Arc::new(funded_bank(1000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bank = Arc::clone(&bank);
                thread::spawn(move || {
                    for _ in 0..25 {
                        let _ = bank.forward(&Transfer::new(alice(), bob(), 7));
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }

        let a = bank.balance(&alice()).unwrap();
        let b = bank.balance(&bob()).unwrap();
        assert_eq!(a + b, 1000);
        assert_eq!(b, 7 * bank.transfer_count().unwrap());
    }

    #[test]
    fn debug_format() {
        let bank = funded_bank(1);
        let debug = format!("{bank:?}");
        assert!(debug.contains("InMemoryBank"));
        assert!(debug.contains("account_count"));
    }
}
