use std::collections::HashSet;

use ulk_types::Item;

use crate::journal::{JournalEntry, JournalEvent};
use crate::records::UnlockFact;

/// Result of journal validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub entry_count: u64,
    pub item_count: u64,
    pub unlock_count: u64,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub seq: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    SequenceGap,
    HashChainBreak,
    HashMismatch,
    SparseItemId,
    UnknownItem,
    DuplicateUnlock,
    PriceMismatch,
    WrongBeneficiary,
}

/// Journal integrity validator.
pub struct JournalValidator;

impl JournalValidator {
    /// Check the journal for every invariant, collecting all violations.
    pub fn validate(entries: &[JournalEntry]) -> ValidationReport {
        let mut violations = Vec::new();
        let mut items: Vec<&Item> = Vec::new();
        let mut unlocks: HashSet<UnlockFact> = HashSet::new();

        for (index, entry) in entries.iter().enumerate() {
            let expected_seq = (index + 1) as u64;
            if entry.seq != expected_seq {
                violations.push(Violation {
                    seq: entry.seq,
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected seq {expected_seq}, got {}", entry.seq),
                });
            }

            let expected_prev = index.checked_sub(1).map(|i| entries[i].entry_hash);
            if entry.prev_hash != expected_prev {
                violations.push(Violation {
                    seq: entry.seq,
                    kind: ViolationKind::HashChainBreak,
                    description: "previous hash link mismatch".into(),
                });
            }

            if let Ok(computed) = entry.recompute_hash() {
                if computed != entry.entry_hash {
                    violations.push(Violation {
                        seq: entry.seq,
                        kind: ViolationKind::HashMismatch,
                        description: "entry hash does not match computed".into(),
                    });
                }
            }

            match &entry.event {
                JournalEvent::ItemCreated { item } => {
                    if item.id.index() != items.len() {
                        violations.push(Violation {
                            seq: entry.seq,
                            kind: ViolationKind::SparseItemId,
                            description: format!(
                                "item {} created when {} items exist",
                                item.id,
                                items.len()
                            ),
                        });
                    }
                    items.push(item);
                }
                JournalEvent::ItemUnlocked {
                    item_id,
                    caller,
                    amount,
                    beneficiary,
                } => {
                    let Some(item) = items.get(item_id.index()) else {
                        violations.push(Violation {
                            seq: entry.seq,
                            kind: ViolationKind::UnknownItem,
                            description: format!("unlock of unknown item {item_id}"),
                        });
                        continue;
                    };
                    if !unlocks.insert(UnlockFact::new(*item_id, *caller)) {
                        violations.push(Violation {
                            seq: entry.seq,
                            kind: ViolationKind::DuplicateUnlock,
                            description: format!("{caller} unlocked {item_id} twice"),
                        });
                    }
                    if *amount != item.price {
                        violations.push(Violation {
                            seq: entry.seq,
                            kind: ViolationKind::PriceMismatch,
                            description: format!(
                                "paid {amount} for {item_id} priced {}",
                                item.price
                            ),
                        });
                    }
                    if *beneficiary != item.creator {
                        violations.push(Violation {
                            seq: entry.seq,
                            kind: ViolationKind::WrongBeneficiary,
                            description: format!(
                                "payment for {item_id} went to {beneficiary}, not {}",
                                item.creator
                            ),
                        });
                    }
                }
            }
        }

        ValidationReport {
            entry_count: entries.len() as u64,
            item_count: items.len() as u64,
            unlock_count: unlocks.len() as u64,
            violations,
        }
    }
}
