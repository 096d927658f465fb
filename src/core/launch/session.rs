use std::process::Child;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::accounts::Credential;
use crate::core::version::GameVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    /// Exit code, if the OS reported one.
    Exited(Option<i32>),
}

/// One supervised run of the game process.
#[derive(Debug)]
pub struct LaunchSession {
    pub id: Uuid,
    pub credential: Credential,
    pub version: GameVersion,
    pub started_at: DateTime<Utc>,
    child: Child,
    status: SessionStatus,
}

impl LaunchSession {
    pub fn new(credential: Credential, version: GameVersion, child: Child) -> Self {
        Self {
            id: Uuid::new_v4(),
            credential,
            version,
            started_at: Utc::now(),
            child,
            status: SessionStatus::Running,
        }
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }

    pub(crate) fn child_mut(&mut self) -> &mut Child {
        &mut self.child
    }

    /// Record the exit. Once exited, later observations are ignored.
    pub(crate) fn mark_exited(&mut self, code: Option<i32>) {
        if self.is_running() {
            self.status = SessionStatus::Exited(code);
        }
    }
}

/// `HH:MM:SS` for the running-game view.
pub fn format_uptime(uptime: chrono::Duration) -> String {
    let secs = uptime.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(chrono::Duration::seconds(0)), "00:00:00");
        assert_eq!(format_uptime(chrono::Duration::seconds(3725)), "01:02:05");
        assert_eq!(format_uptime(chrono::Duration::seconds(-4)), "00:00:00");
    }

    #[cfg(unix)]
    #[test]
    fn exit_is_recorded_once() {
        let child = std::process::Command::new("true").spawn().unwrap();
        let mut session = LaunchSession::new(
            Credential::new("u", "n", "t"),
            GameVersion::latest(),
            child,
        );
        assert!(session.is_running());

        session.mark_exited(Some(0));
        session.mark_exited(Some(9));
        assert_eq!(session.status(), SessionStatus::Exited(Some(0)));
        let _ = session.child_mut().wait();
    }
}
