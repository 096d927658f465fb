use tracing::info;

use super::paths::LauncherPaths;
use super::preferences::{PreferenceStore, Preferences};
use crate::core::accounts::{AccountStore, Credential};
use crate::core::error::LauncherResult;

/// Everything the menu layer needs between screens.
///
/// There is no global: the front-end owns one `AppState` and hands the
/// relevant parts to each component.
pub struct AppState {
    pub paths: LauncherPaths,
    pub preferences: Preferences,
    pub accounts: AccountStore,
    preference_store: PreferenceStore,
}

impl AppState {
    pub fn new(paths: LauncherPaths) -> Self {
        let preference_store = PreferenceStore::new(paths.preferences_file());
        let preferences = preference_store.load();
        let accounts = AccountStore::in_dir(paths.config_dir());

        info!(
            "Config at {:?}, game directory {:?}",
            paths.config_dir(),
            paths.game_dir()
        );

        Self {
            paths,
            preferences,
            accounts,
            preference_store,
        }
    }

    /// Persist the in-memory preference record in full.
    pub fn save_preferences(&self) -> LauncherResult<()> {
        self.preference_store.save(&self.preferences)
    }

    pub fn active_account(&self) -> Option<Credential> {
        self.accounts.load_active(&self.preferences)
    }

    /// Select the account at `index` and persist the choice.
    pub fn set_active_account(&mut self, index: usize) -> LauncherResult<()> {
        self.preferences.active_account = index;
        self.save_preferences()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_account_selection_is_persisted() {
        let temp = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::new(temp.path().join("cfg"), temp.path().join("game"));

        let mut state = AppState::new(paths.clone());
        assert!(state.active_account().is_none());

        state.accounts.save(Credential::new("A", "Foo", "t1")).unwrap();
        state.accounts.save(Credential::new("B", "Bar", "t2")).unwrap();
        state.set_active_account(1).unwrap();

        let reopened = AppState::new(paths);
        assert_eq!(reopened.preferences.active_account, 1);
        assert_eq!(reopened.active_account().unwrap().name, "Bar");
    }
}
