use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::AccountId;

/// Value in the smallest currency unit.
pub type Amount = u64;

/// Catalog identifier for an item.
///
/// Ids are assigned densely starting at zero: the id of an item equals the
/// number of items created before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Position of this item in a dense catalog.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidItemId(s.to_owned()))
    }
}

/// A purchasable catalog entry.
///
/// Every field is set once at creation and never modified afterwards. The
/// `gated_ref` is only ever handed out to callers holding an unlock for this
/// item; use [`Item::listing`] for anything shown to arbitrary callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub public_ref: String,
    pub gated_ref: String,
    pub price: Amount,
    /// Creator and beneficiary of every unlock payment.
    pub creator: AccountId,
}

impl Item {
    pub fn new(
        id: ItemId,
        public_ref: impl Into<String>,
        gated_ref: impl Into<String>,
        price: Amount,
        creator: AccountId,
    ) -> Self {
        Self {
            id,
            public_ref: public_ref.into(),
            gated_ref: gated_ref.into(),
            price,
            creator,
        }
    }

    /// The publicly visible projection of this item.
    pub fn listing(&self) -> Listing {
        Listing {
            id: self.id,
            public_ref: self.public_ref.clone(),
            price: self.price,
            creator: self.creator,
        }
    }

    /// Whether `paid` settles this item exactly.
    pub fn is_exact_payment(&self, paid: Amount) -> bool {
        paid == self.price
    }
}

/// Everything about an [`Item`] that any caller may see.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ItemId,
    pub public_ref: String,
    pub price: Amount,
    pub creator: AccountId,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (price {}, creator {})",
            self.id, self.public_ref, self.price, self.creator
        )
    }
}
