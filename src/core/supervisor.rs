// ─── Process Supervisor ───
// Owns one running game session: liveness, graceful stop, forced kill and
// relaunch.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::installer::ProgressReporter;
use crate::core::launch::{LaunchFailure, LaunchOrchestrator, LaunchSession, SessionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// How long a graceful stop may take before the process is killed.
    pub stop_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            stop_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("The game is not running")]
    NotRunning,

    #[error("Restart failed: {0}")]
    Relaunch(#[source] LaunchFailure),

    #[error("Cannot control the game process: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ProcessSupervisor<'a> {
    orchestrator: &'a LaunchOrchestrator,
    session: LaunchSession,
    config: SupervisorConfig,
}

impl<'a> ProcessSupervisor<'a> {
    pub fn new(orchestrator: &'a LaunchOrchestrator, session: LaunchSession) -> Self {
        Self::with_config(orchestrator, session, SupervisorConfig::default())
    }

    pub fn with_config(
        orchestrator: &'a LaunchOrchestrator,
        session: LaunchSession,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            orchestrator,
            session,
            config,
        }
    }

    pub fn session(&self) -> &LaunchSession {
        &self.session
    }

    /// Non-blocking liveness check.
    pub fn poll(&mut self) -> Result<SessionStatus, SupervisorError> {
        if self.session.is_running() {
            if let Some(status) = self.session.child_mut().try_wait()? {
                info!("Game exited with {}", status);
                self.session.mark_exited(status.code());
            }
        }
        Ok(self.session.status())
    }

    /// Ask the game to close, killing it after `stop_timeout`.
    pub fn terminate(&mut self) -> Result<SessionStatus, SupervisorError> {
        self.ensure_running()?;
        self.stop()?;
        Ok(self.session.status())
    }

    /// Stop the game and start it again with the same account and version.
    pub fn restart(&mut self, progress: &mut dyn ProgressReporter) -> Result<(), SupervisorError> {
        self.ensure_running()?;
        self.stop()?;

        info!("Restarting {}", self.session.version);
        match self
            .orchestrator
            .launch(&self.session.credential, &self.session.version, progress)
        {
            Ok(session) => {
                self.session = session;
                Ok(())
            }
            Err(failure) => {
                self.session.mark_exited(None);
                Err(SupervisorError::Relaunch(failure))
            }
        }
    }

    fn ensure_running(&mut self) -> Result<(), SupervisorError> {
        match self.poll()? {
            SessionStatus::Running => Ok(()),
            SessionStatus::Exited(_) => Err(SupervisorError::NotRunning),
        }
    }

    fn stop(&mut self) -> Result<(), SupervisorError> {
        let pid = self.session.pid();
        if let Err(err) = request_graceful_stop(pid) {
            warn!("Graceful stop of PID {} failed: {}", pid, err);
        }

        let deadline = Instant::now() + self.config.stop_timeout;
        loop {
            if let Some(status) = self.session.child_mut().try_wait()? {
                debug!("PID {} closed with {}", pid, status);
                self.session.mark_exited(status.code());
                return Ok(());
            }
            if Instant::now() >= deadline {
                break;
            }
            std::thread::sleep(self.config.poll_interval);
        }

        warn!("PID {} did not close in time, killing it", pid);
        let child = self.session.child_mut();
        if let Err(err) = child.kill() {
            debug!("Kill of PID {} failed: {}", pid, err);
        }
        let status = child.wait()?;
        self.session.mark_exited(status.code());
        Ok(())
    }
}

#[cfg(unix)]
fn request_graceful_stop(pid: u32) -> std::io::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = i32::try_from(pid).map_err(|_| std::io::Error::other("PID out of range"))?;
    kill(Pid::from_raw(pid), Signal::SIGTERM).map_err(std::io::Error::from)
}

#[cfg(windows)]
fn request_graceful_stop(pid: u32) -> std::io::Result<()> {
    use std::os::windows::process::CommandExt;
    use std::process::{Command, Stdio};

    const CREATE_NO_WINDOW: u32 = 0x08000000;
    let status = Command::new("taskkill")
        .args(["/PID", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .creation_flags(CREATE_NO_WINDOW)
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("taskkill exited with {status}")))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;
    use std::process::Command;

    use super::*;
    use crate::core::accounts::Credential;
    use crate::core::installer::testing::RecordingProgress;
    use crate::core::launch::orchestrator::testing::FakeInstaller;
    use crate::core::version::GameVersion;

    fn orchestrator(installer: FakeInstaller, game_dir: &Path) -> LaunchOrchestrator {
        LaunchOrchestrator::new(Box::new(installer), game_dir.to_path_buf())
    }

    fn session(program: &str, args: &[&str]) -> LaunchSession {
        let child = Command::new(program).args(args).spawn().unwrap();
        LaunchSession::new(
            Credential::new("uuid-1", "Steve", "token"),
            GameVersion::latest(),
            child,
        )
    }

    fn fast_config() -> SupervisorConfig {
        SupervisorConfig {
            stop_timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(20),
        }
    }

    fn wait_for_exit(supervisor: &mut ProcessSupervisor<'_>) -> SessionStatus {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let status = supervisor.poll().unwrap();
            if status != SessionStatus::Running || Instant::now() > deadline {
                return status;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn poll_observes_exit_code() {
        let temp = tempfile::tempdir().unwrap();
        let orch = orchestrator(FakeInstaller::default(), temp.path());
        let mut supervisor = ProcessSupervisor::new(&orch, session("sh", &["-c", "exit 3"]));

        assert_eq!(wait_for_exit(&mut supervisor), SessionStatus::Exited(Some(3)));
        assert!(matches!(supervisor.terminate(), Err(SupervisorError::NotRunning)));
        assert_eq!(supervisor.poll().unwrap(), SessionStatus::Exited(Some(3)));
    }

    #[test]
    fn terminate_stops_a_cooperative_process() {
        let temp = tempfile::tempdir().unwrap();
        let orch = orchestrator(FakeInstaller::default(), temp.path());
        let mut supervisor =
            ProcessSupervisor::with_config(&orch, session("sleep", &["30"]), fast_config());
        assert_eq!(supervisor.poll().unwrap(), SessionStatus::Running);

        let started = Instant::now();
        let status = supervisor.terminate().unwrap();
        assert!(matches!(status, SessionStatus::Exited(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn terminate_kills_a_process_ignoring_sigterm() {
        let temp = tempfile::tempdir().unwrap();
        let orch = orchestrator(FakeInstaller::default(), temp.path());
        let config = fast_config();
        let mut supervisor = ProcessSupervisor::with_config(
            &orch,
            session("sh", &["-c", "trap '' TERM; exec sleep 30"]),
            config,
        );
        // Let the shell install its trap before the signal arrives.
        std::thread::sleep(Duration::from_millis(200));

        let started = Instant::now();
        let status = supervisor.terminate().unwrap();
        let elapsed = started.elapsed();

        assert_eq!(status, SessionStatus::Exited(None));
        assert!(elapsed >= config.stop_timeout);
        assert!(elapsed < config.stop_timeout + Duration::from_secs(2));
    }

    #[test]
    fn restart_replaces_the_session() {
        let temp = tempfile::tempdir().unwrap();
        let installer = FakeInstaller::running(&["sleep", "30"]);
        let orch = orchestrator(installer, temp.path());
        let first = session("sleep", &["30"]);
        let first_id = first.id;
        let first_pid = first.pid();
        let mut supervisor = ProcessSupervisor::with_config(&orch, first, fast_config());

        supervisor.restart(&mut RecordingProgress::default()).unwrap();
        assert_ne!(supervisor.session().id, first_id);
        assert_ne!(supervisor.session().pid(), first_pid);
        assert_eq!(supervisor.poll().unwrap(), SessionStatus::Running);
        assert_eq!(supervisor.session().credential.name, "Steve");

        supervisor.terminate().unwrap();
    }

    #[test]
    fn failed_restart_leaves_session_exited() {
        let temp = tempfile::tempdir().unwrap();
        let installer = FakeInstaller::running(&["sleep", "30"]);
        let control = installer.clone();
        let orch = orchestrator(installer, temp.path());
        let mut supervisor =
            ProcessSupervisor::with_config(&orch, session("sleep", &["30"]), fast_config());

        control.set_argv(&[]);
        let err = supervisor.restart(&mut RecordingProgress::default()).unwrap_err();
        assert!(matches!(err, SupervisorError::Relaunch(LaunchFailure::Command(_))));
        assert_eq!(supervisor.session().status(), SessionStatus::Exited(None));
        assert!(matches!(
            supervisor.restart(&mut RecordingProgress::default()),
            Err(SupervisorError::NotRunning)
        ));
    }
}
