//! Device-code sign-in.
//!
//! [`AuthGateway`] is the seam between the menu layer and the identity
//! provider; [`msa::MicrosoftDeviceAuth`] is the production implementation.

pub mod msa;

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::core::accounts::Credential;
use crate::core::error::{LauncherError, LauncherResult};

pub use msa::MicrosoftDeviceAuth;

/// What the user needs to complete sign-in in a browser.
#[derive(Debug, Clone)]
pub struct DeviceCodePrompt<P> {
    pub verification_uri: String,
    pub user_code: String,
    pub expires_in: Duration,
    /// Opaque state handed back to [`AuthGateway::finish_device_auth`].
    pub pending: P,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub minecraft_access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthProfile {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub tokens: AuthTokens,
    pub profile: AuthProfile,
}

impl AuthOutcome {
    pub fn into_credential(self) -> Credential {
        Credential::new(
            self.profile.id,
            self.profile.name,
            self.tokens.minecraft_access_token,
        )
    }
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    type Pending: Send;

    async fn start_device_auth(&self) -> LauncherResult<DeviceCodePrompt<Self::Pending>>;

    /// Waits until the user completes or abandons the browser step.
    async fn finish_device_auth(&self, pending: Self::Pending) -> LauncherResult<AuthOutcome>;
}

/// Run the whole exchange. `on_prompt` shows the code to the user before
/// polling starts.
pub async fn authenticate<G, F>(gateway: &G, on_prompt: F) -> LauncherResult<Credential>
where
    G: AuthGateway,
    F: FnOnce(&DeviceCodePrompt<G::Pending>),
{
    let prompt = gateway.start_device_auth().await?;
    on_prompt(&prompt);

    let outcome = gateway.finish_device_auth(prompt.pending).await?;
    let credential = outcome.into_credential();
    if let Some(field) = credential.missing_field() {
        return Err(LauncherError::AuthFailed(format!(
            "provider returned no {field}"
        )));
    }

    info!("Signed in as {}", credential.name);
    Ok(credential)
}
