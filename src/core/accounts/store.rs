use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::model::{Credential, SaveOutcome};
use crate::core::error::LauncherResult;
use crate::core::state::Preferences;
use crate::core::storage;

pub const ACCOUNTS_FILE: &str = "auth.json";

/// On-disk shapes accepted for `auth.json`.
#[derive(Deserialize)]
#[serde(untagged)]
enum AccountsFile {
    Wrapped { accounts: Vec<Credential> },
    /// Single bare account written by older launcher builds.
    Legacy(Credential),
}

#[derive(Serialize)]
struct AccountsFileRef<'a> {
    accounts: &'a [Credential],
}

impl AccountsFile {
    /// Collapse either shape into one ordered, duplicate-free list.
    fn normalize(self) -> Vec<Credential> {
        let raw = match self {
            AccountsFile::Wrapped { accounts } => accounts,
            AccountsFile::Legacy(single) => vec![single],
        };

        let mut out: Vec<Credential> = Vec::with_capacity(raw.len());
        for credential in raw {
            match out.iter_mut().find(|c| c.uuid == credential.uuid) {
                Some(existing) => {
                    warn!("Duplicate account {} in store, keeping latest", credential.name);
                    *existing = credential;
                }
                None => out.push(credential),
            }
        }
        out
    }
}

/// Persists the ordered list of signed-in accounts.
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store backed by `<config_dir>/auth.json`.
    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join(ACCOUNTS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All accounts in order. A missing or corrupt file reads as empty.
    pub fn load_all(&self) -> Vec<Credential> {
        storage::read_json::<AccountsFile>(&self.path)
            .map(AccountsFile::normalize)
            .unwrap_or_default()
    }

    /// Insert or update by `uuid`, keeping the position of an existing entry.
    pub fn save(&self, credential: Credential) -> LauncherResult<SaveOutcome> {
        let mut accounts = self.load_all();
        let outcome = match accounts.iter().position(|c| c.uuid == credential.uuid) {
            Some(index) => {
                accounts[index] = credential;
                SaveOutcome::Updated
            }
            None => {
                accounts.push(credential);
                SaveOutcome::Added
            }
        };

        self.write(&accounts)?;
        match outcome {
            SaveOutcome::Added => info!("Account data saved"),
            SaveOutcome::Updated => info!("Account data updated"),
        }
        Ok(outcome)
    }

    /// Remove the account at `index`. Returns `false` when out of range.
    /// Removing the last account deletes the file.
    pub fn remove(&self, index: usize) -> LauncherResult<bool> {
        let mut accounts = self.load_all();
        if index >= accounts.len() {
            return Ok(false);
        }

        accounts.remove(index);
        if accounts.is_empty() {
            storage::remove_file_if_exists(&self.path)?;
        } else {
            self.write(&accounts)?;
        }
        Ok(true)
    }

    /// Forget every account.
    pub fn clear(&self) -> LauncherResult<()> {
        storage::remove_file_if_exists(&self.path)
    }

    /// The account selected by `prefs.active_account`, clamped to the first
    /// entry when the index no longer exists.
    pub fn load_active(&self, prefs: &Preferences) -> Option<Credential> {
        let mut accounts = self.load_all();
        let index = clamp_active_index(prefs.active_account, accounts.len())?;
        Some(accounts.swap_remove(index))
    }

    fn write(&self, accounts: &[Credential]) -> LauncherResult<()> {
        storage::write_json_atomic(&self.path, &AccountsFileRef { accounts })
    }
}

/// Valid index for a list of `len` accounts, or `None` when it is empty.
pub fn clamp_active_index(index: usize, len: usize) -> Option<usize> {
    match len {
        0 => None,
        _ if index < len => Some(index),
        _ => Some(0),
    }
}

/// Active index once the account at `removed` is gone. Later selections
/// follow their account down the list; losing the active one selects the first.
pub fn active_index_after_removal(active: usize, removed: usize) -> usize {
    match removed.cmp(&active) {
        Ordering::Less => active - 1,
        Ordering::Equal => 0,
        Ordering::Greater => active,
    }
}
