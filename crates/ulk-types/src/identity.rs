use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

const ACCOUNT_DOMAIN: &[u8] = b"ulk-account-v1:name:";
const DISPLAY_PREFIX: &str = "acct:";

/// Identity of a party interacting with the registry.
///
/// Callers pass their identity explicitly to every registry operation; the
/// registry never infers it from ambient context. An id is the BLAKE3 hash
/// of an account name, so the same name always maps to the same account.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// The account registered under `name`.
    pub fn from_name(name: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ACCOUNT_DOMAIN);
        hasher.update(name.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Parse a full id, with or without the `acct:` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let digits = s.strip_prefix(DISPLAY_PREFIX).unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let hash: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(hash))
    }

    /// Resolve user input: `acct:<hex>` must be a valid id, a bare 64-char
    /// hex string is taken as an id, anything else is an account name.
    pub fn resolve(input: &str) -> Result<Self, TypeError> {
        if input.starts_with(DISPLAY_PREFIX) {
            return Self::from_hex(input);
        }
        if input.len() == 64 {
            if let Ok(id) = Self::from_hex(input) {
                return Ok(id);
            }
        }
        Ok(Self::from_name(input))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// `acct:` followed by the first 8 hex characters.
    pub fn short_id(&self) -> String {
        format!("{DISPLAY_PREFIX}{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.short_id())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_id())
    }
}

impl FromStr for AccountId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Serialized as a hex string so identities can key JSON maps.
impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
