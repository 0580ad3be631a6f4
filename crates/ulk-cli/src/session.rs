use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ulk_registry::{InMemoryRegistry, RegistrySnapshot};
use ulk_transfer::{BankSnapshot, InMemoryBank};

use crate::config::CliConfig;

/// On-disk form of a session.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    registry: RegistrySnapshot,
    bank: BankSnapshot,
}

/// Registry and bank state for one CLI invocation.
pub struct Session {
    path: PathBuf,
    pub registry: InMemoryRegistry<Arc<InMemoryBank>>,
    pub bank: Arc<InMemoryBank>,
}

impl Session {
    /// Open the session at `path`, starting empty if the file does not exist.
    pub fn open(path: &Path, config: &CliConfig) -> anyhow::Result<Self> {
        let file = if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading session {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing session {}", path.display()))?
        } else {
            info!(path = %path.display(), "starting new session");
            SessionFile::default()
        };

        let bank = Arc::new(InMemoryBank::from_snapshot(file.bank, &config.bank));
        let registry =
            InMemoryRegistry::restore(file.registry, Arc::clone(&bank), config.registry.clone())
                .with_context(|| format!("restoring registry from {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            registry,
            bank,
        })
    }

    /// Write the current state back to the session file.
    pub fn persist(&self) -> anyhow::Result<()> {
        let file = SessionFile {
            registry: self.registry.snapshot()?,
            bank: self.bank.snapshot()?,
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, json)
            .with_context(|| format!("writing session {}", self.path.display()))?;
        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulk_registry::{CatalogReader, CatalogWriter, RegistryConfig, UnlockLedger};
    use ulk_transfer::BankConfig;
    use ulk_types::AccountId;

    #[test]
    fn new_session_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open(&dir.path().join("s.json"), &CliConfig::default()).unwrap();
        assert_eq!(session.registry.item_count().unwrap(), 0);
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let config = CliConfig {
            bank: BankConfig::with_opening_balance(1_000),
            ..Default::default()
        };
        let owner = AccountId::from_name("owner");
        let buyer = AccountId::from_name("buyer");

        let session = Session::open(&path, &config).unwrap();
        let id = session
            .registry
            .create_item("publicUrl1", "privateUrl1", 600, owner)
            .unwrap();
        session.registry.unlock(id, buyer, 600).unwrap();
        session.persist().unwrap();

        let reopened = Session::open(&path, &config).unwrap();
        assert_eq!(
            reopened.registry.get_gated_ref(id, &buyer).unwrap(),
            "privateUrl1"
        );
        assert_eq!(reopened.bank.balance(&owner).unwrap(), 1_600);
        assert_eq!(reopened.bank.balance(&buyer).unwrap(), 400);
        assert!(reopened.registry.validate_journal().unwrap().is_valid());
    }

    fn unjournalled() -> CliConfig {
        CliConfig {
            registry: RegistryConfig::without_journal(),
            ..Default::default()
        }
    }

    #[test]
    fn unjournalled_session_reopens_with_journal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let owner = AccountId::from_name("owner");

        let session = Session::open(&path, &unjournalled()).unwrap();
        let id = session
            .registry
            .create_item("publicUrl1", "privateUrl1", 0, owner)
            .unwrap();
        session
            .registry
            .unlock(id, AccountId::from_name("buyer"), 0)
            .unwrap();
        session.persist().unwrap();

        let reopened = Session::open(&path, &CliConfig::default()).unwrap();
        assert_eq!(reopened.registry.item_count().unwrap(), 1);
        let report = reopened.registry.validate_journal().unwrap();
        assert!(report.is_valid());
        assert_eq!(report.entry_count, 2);

        reopened.persist().unwrap();
        let again = Session::open(&path, &CliConfig::default()).unwrap();
        assert_eq!(again.registry.journal().unwrap().len(), 2);
    }

    #[test]
    fn journalled_session_is_not_opened_without_journal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");

        let session = Session::open(&path, &CliConfig::default()).unwrap();
        session
            .registry
            .create_item("p", "g", 1, AccountId::from_name("owner"))
            .unwrap();
        session.persist().unwrap();
        let saved = fs::read_to_string(&path).unwrap();

        let err = Session::open(&path, &unjournalled()).err().unwrap();
        assert!(format!("{err:#}").contains("journalling is disabled"));
        assert_eq!(fs::read_to_string(&path).unwrap(), saved);
        assert!(Session::open(&path, &CliConfig::default()).is_ok());
    }

    #[test]
    fn corrupt_session_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        fs::write(&path, "garbage").unwrap();
        assert!(Session::open(&path, &CliConfig::default()).is_err());
    }
}
