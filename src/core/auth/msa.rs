// ─── Microsoft Device-Code Sign-In ───
// Microsoft OAuth device grant, Xbox Live to Minecraft token exchange and
// profile lookup.

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, ClientId, DeviceAuthorizationUrl, Scope, StandardDeviceAuthorizationResponse,
    TokenResponse, TokenUrl,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::{AuthGateway, AuthOutcome, AuthProfile, AuthTokens, DeviceCodePrompt};
use crate::core::error::{LauncherError, LauncherResult};

const AUTHORIZATION_URL: &str = "https://login.microsoftonline.com/consumers/oauth2/v2.0/authorize";
const TOKEN_URL: &str = "https://login.microsoftonline.com/consumers/oauth2/v2.0/token";
const DEVICE_CODE_URL: &str = "https://login.microsoftonline.com/consumers/oauth2/v2.0/devicecode";
const PROFILE_URL: &str = "https://api.minecraftservices.com/minecraft/profile";

/// Client id of the official Minecraft launcher.
pub const CLIENT_ID: &str = "9c203c7d-1816-4d24-87f2-9731ce05e187";

const SCOPES: &[&str] = &["XboxLive.signin", "offline_access"];

#[derive(Debug, Deserialize)]
struct MinecraftProfile {
    id: String,
    name: String,
}

pub struct MicrosoftDeviceAuth {
    client: BasicClient,
    http: reqwest::Client,
}

impl MicrosoftDeviceAuth {
    pub fn new() -> LauncherResult<Self> {
        let invalid_url = |e: oauth2::url::ParseError| LauncherError::AuthStart(e.to_string());
        let client = BasicClient::new(
            ClientId::new(CLIENT_ID.to_string()),
            None,
            AuthUrl::new(AUTHORIZATION_URL.to_string()).map_err(invalid_url)?,
            Some(TokenUrl::new(TOKEN_URL.to_string()).map_err(invalid_url)?),
        )
        .set_device_authorization_url(
            DeviceAuthorizationUrl::new(DEVICE_CODE_URL.to_string()).map_err(invalid_url)?,
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("Blocklaunch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, http })
    }

    async fn fetch_profile(&self, minecraft_token: &str) -> LauncherResult<MinecraftProfile> {
        let response = self
            .http
            .get(PROFILE_URL)
            .bearer_auth(minecraft_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LauncherError::AuthFailed(format!(
                "profile lookup returned {status}: {body}"
            )));
        }

        Ok(response.json::<MinecraftProfile>().await?)
    }
}

#[async_trait]
impl AuthGateway for MicrosoftDeviceAuth {
    type Pending = StandardDeviceAuthorizationResponse;

    async fn start_device_auth(&self) -> LauncherResult<DeviceCodePrompt<Self::Pending>> {
        let scopes = SCOPES.iter().map(|s| Scope::new(s.to_string()));
        let details: StandardDeviceAuthorizationResponse = self
            .client
            .exchange_device_code()
            .map_err(|e| LauncherError::AuthStart(format!("{e:?}")))?
            .add_scopes(scopes)
            .request_async(async_http_client)
            .await
            .map_err(|e| LauncherError::AuthStart(format!("device code request failed: {e:?}")))?;

        debug!("Device code issued, expires in {:?}", details.expires_in());
        Ok(DeviceCodePrompt {
            verification_uri: details.verification_uri().to_string(),
            user_code: details.user_code().secret().clone(),
            expires_in: details.expires_in(),
            pending: details,
        })
    }

    async fn finish_device_auth(&self, pending: Self::Pending) -> LauncherResult<AuthOutcome> {
        let token = self
            .client
            .exchange_device_access_token(&pending)
            .request_async(async_http_client, tokio::time::sleep, None)
            .await
            .map_err(|e| LauncherError::AuthFailed(format!("Microsoft sign-in: {e:?}")))?;
        info!("Microsoft sign-in complete, exchanging for a Minecraft token");

        let minecraft = minecraft_msa_auth::MinecraftAuthorizationFlow::new(self.http.clone())
            .exchange_microsoft_token(token.access_token().secret())
            .await
            .map_err(|e| LauncherError::AuthFailed(format!("Minecraft token exchange: {e:?}")))?;
        let minecraft_access_token = minecraft.access_token().clone().into_inner();

        let profile = self.fetch_profile(&minecraft_access_token).await?;
        Ok(AuthOutcome {
            tokens: AuthTokens {
                minecraft_access_token,
            },
            profile: AuthProfile {
                name: profile.name,
                id: profile.id,
            },
        })
    }
}
