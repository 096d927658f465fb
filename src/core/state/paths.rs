use std::path::{Path, PathBuf};

use crate::core::error::{LauncherError, LauncherResult};

const CONFIG_DIR_NAME: &str = ".minecraft_launcher";
const CONFIG_DIR_ENV: &str = "BLOCKLAUNCH_HOME";
const GAME_DIR_ENV: &str = "BLOCKLAUNCH_GAME_DIR";

pub const PREFERENCES_FILE: &str = "prefs.json";

/// Directories the launcher reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    config_dir: PathBuf,
    game_dir: PathBuf,
}

impl LauncherPaths {
    pub fn new(config_dir: PathBuf, game_dir: PathBuf) -> Self {
        Self {
            config_dir,
            game_dir,
        }
    }

    /// Resolve from the environment, falling back to platform defaults.
    pub fn resolve() -> LauncherResult<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => home_dir()?.join(CONFIG_DIR_NAME),
        };
        let game_dir = match std::env::var_os(GAME_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_game_dir()?,
        };
        Ok(Self::new(config_dir, game_dir))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.config_dir.join(PREFERENCES_FILE)
    }

    /// Create the game directory if needed and return it.
    pub fn ensure_game_dir(&self) -> LauncherResult<&Path> {
        std::fs::create_dir_all(&self.game_dir).map_err(LauncherError::io(&self.game_dir))?;
        Ok(&self.game_dir)
    }
}

fn home_dir() -> LauncherResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| LauncherError::Other("cannot determine home directory".into()))
}

/// The directory the official launcher installs into on this platform.
pub fn default_game_dir() -> LauncherResult<PathBuf> {
    if cfg!(target_os = "windows") {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => home_dir()?,
        };
        Ok(base.join(".minecraft"))
    } else if cfg!(target_os = "macos") {
        Ok(home_dir()?
            .join("Library")
            .join("Application Support")
            .join("minecraft"))
    } else {
        Ok(home_dir()?.join(".minecraft"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_config_dir() {
        let paths = LauncherPaths::new(PathBuf::from("/cfg"), PathBuf::from("/game"));
        assert_eq!(paths.preferences_file(), PathBuf::from("/cfg/prefs.json"));
        assert_eq!(paths.game_dir(), Path::new("/game"));
    }

    #[test]
    fn ensure_game_dir_creates_it() {
        let temp = tempfile::tempdir().unwrap();
        let paths = LauncherPaths::new(temp.path().join("cfg"), temp.path().join("game"));
        assert!(paths.ensure_game_dir().unwrap().is_dir());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_default_is_dot_minecraft() {
        let dir = default_game_dir().unwrap();
        assert!(dir.ends_with(".minecraft"));
    }
}
