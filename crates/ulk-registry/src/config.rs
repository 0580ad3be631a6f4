use serde::{Deserialize, Serialize};

/// Configuration for an [`InMemoryRegistry`](crate::InMemoryRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Append a journal entry for every committed mutation.
    pub journal_enabled: bool,
    /// Upper bound on the byte length of public and gated references.
    /// `None` accepts any string, including the empty one.
    pub max_ref_len: Option<usize>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            journal_enabled: true,
            max_ref_len: None,
        }
    }
}

impl RegistryConfig {
    /// A configuration that keeps no journal.
    pub fn without_journal() -> Self {
        Self {
            journal_enabled: false,
            ..Default::default()
        }
    }
}
