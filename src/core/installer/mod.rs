// ─── Installer ───
// Provisioning seam between the launch orchestrator and whatever actually
// puts a runtime and game files on disk.

pub mod arguments;
pub mod classpath;
pub mod local;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::core::error::LauncherResult;

pub use local::LocalInstaller;

/// Runtime a version asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub name: String,
    pub java_major: u32,
}

/// Identity and runtime values substituted into the launch command.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub username: String,
    pub uuid: String,
    pub token: String,
    pub executable_path: PathBuf,
    pub launcher_name: String,
    pub launcher_version: String,
}

/// Receives provisioning progress. Called synchronously.
pub trait ProgressReporter {
    fn set_status(&mut self, status: &str);
    fn set_max(&mut self, max: u64);
    fn set_progress(&mut self, value: u64);
}

pub trait Installer {
    fn resolve_runtime(&self, version_id: &str, game_dir: &Path) -> LauncherResult<RuntimeInfo>;

    fn installed_runtimes(&self, game_dir: &Path) -> LauncherResult<HashSet<String>>;

    fn install_runtime(
        &self,
        name: &str,
        game_dir: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> LauncherResult<()>;

    fn executable_path(&self, name: &str, game_dir: &Path) -> Option<PathBuf>;

    fn install_version(
        &self,
        version_id: &str,
        game_dir: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> LauncherResult<()>;

    /// Full argv: executable first, then JVM arguments, main class and game arguments.
    fn build_command(
        &self,
        version_id: &str,
        game_dir: &Path,
        options: &LaunchOptions,
    ) -> LauncherResult<Vec<String>>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every progress call, for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingProgress {
        pub statuses: Vec<String>,
        pub max: Option<u64>,
        pub last: Option<u64>,
    }

    impl ProgressReporter for RecordingProgress {
        fn set_status(&mut self, status: &str) {
            self.statuses.push(status.to_string());
        }

        fn set_max(&mut self, max: u64) {
            self.max = Some(max);
        }

        fn set_progress(&mut self, value: u64) {
            self.last = Some(value);
        }
    }
}
