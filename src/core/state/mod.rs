pub mod app_state;
pub mod paths;
pub mod preferences;

pub use app_state::AppState;
pub use paths::LauncherPaths;
pub use preferences::{PreferenceStore, Preferences, Theme, LANGUAGES, THEMES};
