// ─── Supported Versions ───
// The fixed set of game versions the launcher offers, newest first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{LauncherError, LauncherResult};

#[rustfmt::skip]
pub const SUPPORTED_VERSIONS: &[&str] = &[
    "1.21.11", "1.21.10", "1.21.9", "1.21.8", "1.21.7", "1.21.6", "1.21.5", "1.21.4", "1.21.3",
    "1.21.2", "1.21.1", "1.21",
    "1.20.6", "1.20.5", "1.20.4", "1.20.3", "1.20.2", "1.20.1", "1.20",
    "1.19.4", "1.19.3", "1.19.2", "1.19.1", "1.19",
    "1.18.2", "1.18.1", "1.18",
    "1.17.1", "1.17",
    "1.16.5", "1.16.4", "1.16.3", "1.16.2", "1.16.1", "1.16",
];

/// Major releases used to group the selection menu.
pub const VERSION_GROUPS: &[&str] = &["1.21", "1.20", "1.19", "1.18", "1.17", "1.16"];

/// A game version that is known to be in [`SUPPORTED_VERSIONS`].
///
/// The only ways to obtain one are [`GameVersion::parse`] and
/// [`GameVersion::latest`], so the launch path never sees an unsupported id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameVersion(String);

impl GameVersion {
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        let trimmed = raw.trim();
        if SUPPORTED_VERSIONS.contains(&trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(LauncherError::UnsupportedVersion(raw.to_string()))
        }
    }

    /// First entry of the supported list.
    pub fn latest() -> Self {
        Self(SUPPORTED_VERSIONS[0].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl TryFrom<String> for GameVersion {
    type Error = LauncherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GameVersion> for String {
    fn from(value: GameVersion) -> Self {
        value.0
    }
}

fn release_group(version: &str) -> &str {
    let mut dots = version.match_indices('.').map(|(idx, _)| idx);
    match (dots.next(), dots.next()) {
        (Some(_), Some(second)) => &version[..second],
        _ => version,
    }
}

/// Supported versions belonging to `group`, newest first.
pub fn versions_in_group(group: &str) -> Vec<GameVersion> {
    SUPPORTED_VERSIONS
        .iter()
        .filter(|v| release_group(v) == group)
        .map(|v| GameVersion(v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_only_supported_ids() {
        assert_eq!(GameVersion::parse("1.20.1").unwrap().as_str(), "1.20.1");
        assert_eq!(GameVersion::parse(" 1.21 ").unwrap().as_str(), "1.21");
        assert!(matches!(
            GameVersion::parse("1.12.2"),
            Err(LauncherError::UnsupportedVersion(_))
        ));
        assert!(GameVersion::parse("").is_err());
    }

    #[test]
    fn latest_is_first_supported_entry() {
        assert_eq!(GameVersion::latest().as_str(), SUPPORTED_VERSIONS[0]);
    }

    #[test]
    fn groups_partition_the_supported_list() {
        let total: usize = VERSION_GROUPS
            .iter()
            .map(|g| versions_in_group(g).len())
            .sum();
        assert_eq!(total, SUPPORTED_VERSIONS.len());

        let v121 = versions_in_group("1.21");
        assert_eq!(v121.first().map(GameVersion::as_str), Some("1.21.11"));
        assert_eq!(v121.last().map(GameVersion::as_str), Some("1.21"));
        assert!(v121.iter().all(|v| release_group(v.as_str()) == "1.21"));
    }

    #[test]
    fn serde_rejects_unknown_versions() {
        let ok: GameVersion = serde_json::from_str("\"1.19.2\"").unwrap();
        assert_eq!(ok.as_str(), "1.19.2");
        assert!(serde_json::from_str::<GameVersion>("\"b1.7.3\"").is_err());
    }
}
