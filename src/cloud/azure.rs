//! Resource Manager REST client
//!
//! Implements [`CloudProvider`] with plain `GET` requests against the
//! management endpoint. VM listing follows `nextLink` until the provider
//! stops returning one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace, warn};

use super::credential::CredentialProvider;
use super::error::{CloudError, CloudResult};
use super::models::{NetworkInterface, Page, PublicIpAddress, Subscription, VirtualMachine};
use super::{CloudProvider, VmStream};
use crate::config::AzureConfig;

const COMPUTE_API_VERSION: &str = "2024-07-01";
const NETWORK_API_VERSION: &str = "2024-05-01";
const SUBSCRIPTION_API_VERSION: &str = "2022-12-01";

/// Reject values that would not stay a single URL path segment.
fn path_segment(value: &str) -> CloudResult<&str> {
    let bad = |c: char| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace();
    if value.is_empty() || value == "." || value == ".." || value.contains(bad) {
        return Err(CloudError::InvalidResourceId(value.to_string()));
    }
    Ok(value)
}

#[derive(Clone)]
pub struct AzureClient {
    client: reqwest::Client,
    endpoint: String,
    credential: Arc<dyn CredentialProvider>,
}

impl AzureClient {
    pub fn new(config: &AzureConfig, credential: Arc<dyn CredentialProvider>) -> CloudResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.management_endpoint.trim_end_matches('/').to_string(),
            credential,
        })
    }

    /// OAuth2 scope matching the configured management endpoint.
    pub fn scope_for(config: &AzureConfig) -> String {
        format!("{}/.default", config.management_endpoint.trim_end_matches('/'))
    }

    fn vm_list_url(&self, subscription_id: &str) -> CloudResult<String> {
        let subscription_id = path_segment(subscription_id)?;
        Ok(format!(
            "{}/subscriptions/{subscription_id}/providers/Microsoft.Compute/virtualMachines?api-version={COMPUTE_API_VERSION}",
            self.endpoint
        ))
    }

    fn network_url(
        &self,
        subscription_id: &str,
        resource_group: &str,
        resource_type: &str,
        name: &str,
    ) -> CloudResult<String> {
        let subscription_id = path_segment(subscription_id)?;
        let resource_group = path_segment(resource_group)?;
        let name = path_segment(name)?;
        Ok(format!(
            "{}/subscriptions/{subscription_id}/resourceGroups/{resource_group}/providers/Microsoft.Network/{resource_type}/{name}?api-version={NETWORK_API_VERSION}",
            self.endpoint
        ))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> CloudResult<T> {
        trace!("GET {url}");

        let token = self.credential.get_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&token.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CloudError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CloudError::Decode(format!("{url}: {e}")))
    }
}

#[async_trait]
impl CloudProvider for AzureClient {
    fn list_all_vms<'a>(&'a self, subscription_id: &'a str) -> VmStream<'a> {
        let first_page = match self.vm_list_url(subscription_id) {
            Ok(url) => url,
            Err(e) => return stream::iter([Err::<VirtualMachine, _>(e)]).boxed(),
        };

        stream::try_unfold(Some(first_page), move |next_link| async move {
            let Some(url) = next_link else {
                return Ok(None);
            };

            let page = self.get_json::<Page<VirtualMachine>>(&url).await?;
            debug!(
                "fetched {} VMs for subscription {subscription_id}",
                page.value.len()
            );

            // A link back to the page just read would never terminate.
            let next_link = page.next_link.filter(|next| {
                let repeats = *next == url;
                if repeats {
                    warn!("nextLink repeats {url}, stopping pagination");
                }
                !repeats
            });

            let vms = stream::iter(page.value.into_iter().map(Ok::<_, CloudError>));
            Ok::<_, CloudError>(Some((vms, next_link)))
        })
        .try_flatten()
        .boxed()
    }

    #[instrument(skip(self))]
    async fn get_network_interface(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
    ) -> CloudResult<NetworkInterface> {
        let url = self.network_url(subscription_id, resource_group, "networkInterfaces", name)?;
        self.get_json(&url).await
    }

    #[instrument(skip(self))]
    async fn get_public_ip(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
    ) -> CloudResult<PublicIpAddress> {
        let url = self.network_url(subscription_id, resource_group, "publicIPAddresses", name)?;
        self.get_json(&url).await
    }

    #[instrument(skip(self))]
    async fn get_subscription(&self, subscription_id: &str) -> CloudResult<Subscription> {
        let subscription_id = path_segment(subscription_id)?;
        let url = format!(
            "{}/subscriptions/{subscription_id}?api-version={SUBSCRIPTION_API_VERSION}",
            self.endpoint
        );
        self.get_json(&url).await
    }
}
