//! Bearer-token credentials for the Resource Manager API

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace};

use super::error::{CloudError, CloudResult};
use crate::util::{
    get_access_token, get_authority_host, get_client_id, get_client_secret, get_tenant_id,
};

/// Tokens closer than this to their expiry are refreshed.
const EXPIRY_MARGIN_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    /// `None` for tokens whose lifetime we do not know
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_on
            .is_none_or(|expires_on| expires_on - Duration::seconds(EXPIRY_MARGIN_SECS) > now)
    }
}

/// Source of bearer tokens, supplied to the client at start-up.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get_token(&self) -> CloudResult<AccessToken>;
}

/// A pre-issued token, e.g. from `az account get-access-token`.
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl ToString) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenCredential {
    async fn get_token(&self) -> CloudResult<AccessToken> {
        Ok(AccessToken {
            token: self.token.clone(),
            expires_on: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// OAuth2 client-credentials flow for a service principal.
///
/// The last token is kept and reused until it is about to expire.
#[derive(Debug)]
pub struct ClientSecretCredential {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cached: Mutex<Option<AccessToken>>,
}

impl ClientSecretCredential {
    pub fn new(
        authority_host: &str,
        tenant_id: &str,
        client_id: impl ToString,
        client_secret: impl ToString,
        scope: impl ToString,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                authority_host.trim_end_matches('/'),
                tenant_id
            ),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            scope: scope.to_string(),
            cached: Mutex::new(None),
        }
    }

    #[instrument(skip(self), fields(url = %self.token_url))]
    async fn request_token(&self) -> CloudResult<AccessToken> {
        trace!("requesting new access token");

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CloudError::Credential(format!(
                "token endpoint returned status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let TokenResponse {
            access_token,
            expires_in,
        } = response
            .json()
            .await
            .map_err(|e| CloudError::Credential(format!("invalid token response: {e}")))?;

        debug!("obtained access token valid for {expires_in}s");

        Ok(AccessToken {
            token: access_token,
            expires_on: Some(Utc::now() + Duration::seconds(expires_in)),
        })
    }
}

#[async_trait]
impl CredentialProvider for ClientSecretCredential {
    async fn get_token(&self) -> CloudResult<AccessToken> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref()
            && token.is_fresh(Utc::now())
        {
            return Ok(token.clone());
        }

        let token = self.request_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

/// Pick a credential from the process environment.
///
/// `AZURE_ACCESS_TOKEN` wins; otherwise a service principal is built from
/// `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`.
pub fn credential_from_environment(scope: &str) -> CloudResult<Arc<dyn CredentialProvider>> {
    if let Some(token) = get_access_token() {
        debug!("using static access token from environment");
        return Ok(Arc::new(StaticTokenCredential::new(token)));
    }

    match (get_tenant_id(), get_client_id(), get_client_secret()) {
        (Some(tenant_id), Some(client_id), Some(client_secret)) => {
            debug!("using client secret credential for client {client_id}");
            Ok(Arc::new(ClientSecretCredential::new(
                &get_authority_host(),
                &tenant_id,
                client_id,
                client_secret,
                scope,
            )))
        }
        _ => Err(CloudError::Credential(
            "set AZURE_ACCESS_TOKEN, or AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET"
                .to_string(),
        )),
    }
}
