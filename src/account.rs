use tracing::{instrument, warn};

use crate::UNKNOWN_ACCOUNT;
use crate::cloud::CloudProvider;

/// Display name of a subscription, or [`UNKNOWN_ACCOUNT`].
///
/// The name only decorates the output, so lookup failures are logged and
/// swallowed here.
#[instrument(skip(provider))]
pub async fn resolve_account_name<P>(provider: &P, subscription_id: &str) -> String
where
    P: CloudProvider + ?Sized,
{
    match provider.get_subscription(subscription_id).await {
        Ok(subscription) => subscription
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string()),
        Err(e) => {
            warn!("error fetching account name for {subscription_id}: {e}");
            UNKNOWN_ACCOUNT.to_string()
        }
    }
}
