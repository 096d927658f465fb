// ─── Launch Orchestrator ───
// Credential + version in, running game process out.

use std::path::PathBuf;
use std::process::{Command, Stdio};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::session::LaunchSession;
use crate::core::accounts::Credential;
use crate::core::error::LauncherError;
use crate::core::installer::{Installer, LaunchOptions, ProgressReporter};
use crate::core::java;
use crate::core::version::GameVersion;

/// Executable used when no managed runtime can be provided.
pub const FALLBACK_JAVA: &str = "java";

/// Launcher name and version reported to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherIdentity {
    pub name: String,
    pub version: String,
}

impl Default for LauncherIdentity {
    fn default() -> Self {
        Self {
            name: "Blocklaunch".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Which Java the game will run on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeResolution {
    Resolved { executable: PathBuf, java_major: u32 },
    /// No managed runtime; `java` from `PATH` is used instead.
    Fallback { reason: String, java_major: u32 },
}

impl RuntimeResolution {
    pub fn executable(&self) -> PathBuf {
        match self {
            RuntimeResolution::Resolved { executable, .. } => executable.clone(),
            RuntimeResolution::Fallback { .. } => PathBuf::from(FALLBACK_JAVA),
        }
    }

    pub fn java_major(&self) -> u32 {
        match self {
            RuntimeResolution::Resolved { java_major, .. }
            | RuntimeResolution::Fallback { java_major, .. } => *java_major,
        }
    }
}

/// Why a launch attempt produced no session.
#[derive(Debug, Error)]
pub enum LaunchFailure {
    #[error("Account is missing its {0}; sign in again")]
    InvalidCredential(&'static str),

    #[error("Game files are not ready: {0}")]
    Install(#[source] LauncherError),

    #[error("Cannot build the launch command: {0}")]
    Command(#[source] LauncherError),

    #[error("Java executable {executable:?} not found (Java {java_major} required)")]
    ExecutableNotFound { executable: PathBuf, java_major: u32 },

    #[error("Cannot start {executable:?}: {source}")]
    Spawn {
        executable: PathBuf,
        source: std::io::Error,
    },
}

/// Provisions through an [`Installer`] and spawns the game.
pub struct LaunchOrchestrator {
    installer: Box<dyn Installer>,
    game_dir: PathBuf,
    identity: LauncherIdentity,
}

impl LaunchOrchestrator {
    pub fn new(installer: Box<dyn Installer>, game_dir: PathBuf) -> Self {
        Self {
            installer,
            game_dir,
            identity: LauncherIdentity::default(),
        }
    }

    pub fn launch(
        &self,
        credential: &Credential,
        version: &GameVersion,
        progress: &mut dyn ProgressReporter,
    ) -> Result<LaunchSession, LaunchFailure> {
        match self.try_launch(credential, version, progress) {
            Ok(session) => Ok(session),
            Err(failure) => {
                error!("Launch of {} failed: {}", version, failure);
                Err(failure)
            }
        }
    }

    fn try_launch(
        &self,
        credential: &Credential,
        version: &GameVersion,
        progress: &mut dyn ProgressReporter,
    ) -> Result<LaunchSession, LaunchFailure> {
        if let Some(field) = credential.missing_field() {
            return Err(LaunchFailure::InvalidCredential(field));
        }
        info!("Preparing {} for {}", version, credential.name);

        let runtime = self.resolve_runtime(version, progress);
        match &runtime {
            RuntimeResolution::Resolved { executable, java_major } => {
                info!("Using Java {} at {:?}", java_major, executable);
            }
            RuntimeResolution::Fallback { reason, java_major } => {
                warn!(
                    "No managed runtime ({}); falling back to system java, Java {} required",
                    reason, java_major
                );
            }
        }

        self.installer
            .install_version(version.as_str(), &self.game_dir, progress)
            .map_err(LaunchFailure::Install)?;

        let options = LaunchOptions {
            username: credential.name.clone(),
            uuid: credential.uuid.clone(),
            token: credential.access_token.clone(),
            executable_path: runtime.executable(),
            launcher_name: self.identity.name.clone(),
            launcher_version: self.identity.version.clone(),
        };
        let argv = self
            .installer
            .build_command(version.as_str(), &self.game_dir, &options)
            .map_err(LaunchFailure::Command)?;

        let child = self.spawn(&argv, runtime.java_major())?;
        info!("Game started with PID {}", child.id());
        Ok(LaunchSession::new(credential.clone(), version.clone(), child))
    }

    /// Any failure here degrades to the system `java`.
    fn resolve_runtime(
        &self,
        version: &GameVersion,
        progress: &mut dyn ProgressReporter,
    ) -> RuntimeResolution {
        let info = match self.installer.resolve_runtime(version.as_str(), &self.game_dir) {
            Ok(info) => info,
            Err(err) => {
                return RuntimeResolution::Fallback {
                    reason: err.to_string(),
                    java_major: java::required_java_for_minecraft_version(version.as_str()),
                };
            }
        };
        let fallback = |reason: String| RuntimeResolution::Fallback {
            reason,
            java_major: info.java_major,
        };

        let installed = match self.installer.installed_runtimes(&self.game_dir) {
            Ok(installed) => installed,
            Err(err) => return fallback(err.to_string()),
        };
        if !installed.contains(&info.name) {
            progress.set_status(&format!("Installing runtime {}", info.name));
            if let Err(err) = self
                .installer
                .install_runtime(&info.name, &self.game_dir, progress)
            {
                return fallback(err.to_string());
            }
        }

        match self.installer.executable_path(&info.name, &self.game_dir) {
            Some(executable) if executable.exists() => RuntimeResolution::Resolved {
                executable,
                java_major: info.java_major,
            },
            Some(executable) => fallback(format!("{executable:?} does not exist")),
            None => fallback(format!("no executable for runtime {}", info.name)),
        }
    }

    fn spawn(&self, argv: &[String], java_major: u32) -> Result<std::process::Child, LaunchFailure> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            LaunchFailure::Command(LauncherError::Other("installer returned an empty command".into()))
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&self.game_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        configure_platform_spawn(&mut cmd);
        debug!("Command: {:?}", cmd);

        cmd.spawn().map_err(|source| {
            let executable = PathBuf::from(program);
            if source.kind() == std::io::ErrorKind::NotFound {
                LaunchFailure::ExecutableNotFound {
                    executable,
                    java_major,
                }
            } else {
                LaunchFailure::Spawn { executable, source }
            }
        })
    }
}

/// Keep the game out of the launcher's process group so Ctrl-C in the
/// terminal only reaches the launcher.
fn configure_platform_spawn(cmd: &mut Command) {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    #[cfg(target_os = "windows")]
    {
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::error::LauncherResult;
    use crate::core::installer::RuntimeInfo;

    /// Scriptable installer. The command it builds is `argv` verbatim.
    #[derive(Clone, Default)]
    pub struct FakeInstaller {
        pub argv: Arc<Mutex<Vec<String>>>,
        pub runtime_installed: bool,
        pub runtime_executable: Option<PathBuf>,
        pub fail_install_version: bool,
        pub seen_options: Arc<Mutex<Vec<LaunchOptions>>>,
    }

    impl FakeInstaller {
        pub fn running(argv: &[&str]) -> Self {
            Self {
                argv: Arc::new(Mutex::new(argv.iter().map(ToString::to_string).collect())),
                ..Self::default()
            }
        }

        pub fn set_argv(&self, argv: &[&str]) {
            *self.argv.lock().unwrap() = argv.iter().map(ToString::to_string).collect();
        }
    }

    impl Installer for FakeInstaller {
        fn resolve_runtime(&self, _version_id: &str, _game_dir: &Path) -> LauncherResult<RuntimeInfo> {
            Ok(RuntimeInfo {
                name: "java-runtime-delta".into(),
                java_major: 21,
            })
        }

        fn installed_runtimes(&self, _game_dir: &Path) -> LauncherResult<HashSet<String>> {
            let mut set = HashSet::new();
            if self.runtime_installed {
                set.insert("java-runtime-delta".to_string());
            }
            Ok(set)
        }

        fn install_runtime(
            &self,
            name: &str,
            _game_dir: &Path,
            _progress: &mut dyn ProgressReporter,
        ) -> LauncherResult<()> {
            Err(LauncherError::RuntimeUnavailable(name.to_string()))
        }

        fn executable_path(&self, _name: &str, _game_dir: &Path) -> Option<PathBuf> {
            self.runtime_executable.clone()
        }

        fn install_version(
            &self,
            version_id: &str,
            game_dir: &Path,
            _progress: &mut dyn ProgressReporter,
        ) -> LauncherResult<()> {
            if self.fail_install_version {
                return Err(LauncherError::VersionNotInstalled {
                    version: version_id.to_string(),
                    path: game_dir.to_path_buf(),
                });
            }
            Ok(())
        }

        fn build_command(
            &self,
            _version_id: &str,
            _game_dir: &Path,
            options: &LaunchOptions,
        ) -> LauncherResult<Vec<String>> {
            self.seen_options.lock().unwrap().push(options.clone());
            Ok(self.argv.lock().unwrap().clone())
        }
    }
}
