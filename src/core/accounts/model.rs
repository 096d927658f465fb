use std::fmt;

use serde::{Deserialize, Serialize};

/// A signed-in identity, as persisted in `auth.json`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub name: String,
    pub uuid: String,
}

impl Credential {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            name: name.into(),
            uuid: uuid.into(),
        }
    }

    /// First 20 characters of the token, for the details view.
    pub fn token_preview(&self) -> String {
        let head: String = self.access_token.chars().take(20).collect();
        format!("{head}...")
    }

    /// First 8 characters of the uuid, for account lists.
    pub fn short_uuid(&self) -> &str {
        match self.uuid.char_indices().nth(8) {
            Some((idx, _)) => &self.uuid[..idx],
            None => &self.uuid,
        }
    }

    /// Name of the first empty field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.uuid.trim().is_empty() {
            Some("uuid")
        } else if self.access_token.trim().is_empty() {
            Some("access_token")
        } else {
            None
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("uuid", &self.uuid)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Result of [`super::AccountStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new identity was appended.
    Added,
    /// An existing identity was replaced at its position.
    Updated,
}
