//! Alert file parsing and quarantine
//!
//! An alert is a JSON document produced by the monitoring pipeline. Only two
//! fields matter here, both nested under `data.alertContext`:
//!
//! ```text
//! { "data": { "alertContext": { "resourceName": "vm1", "subscriptionId": "sub-123" } } }
//! ```
//!
//! Anything that does not get us as far as an `alertContext` object is moved
//! into the error directory untouched.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{AlertTarget, UNKNOWN_FIELD};

pub type AlertResult<T> = Result<T, AlertError>;

/// Reasons an alert file cannot be turned into an [`AlertTarget`]
#[derive(Debug)]
pub enum AlertError {
    /// The file could not be read
    Io(std::io::Error),

    /// The file content is not JSON
    InvalidJson(serde_json::Error),

    /// The JSON lacks the `data.alertContext` object
    MalformedAlert(String),
}

impl fmt::Display for AlertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertError::Io(err) => write!(f, "failed to read alert: {}", err),
            AlertError::InvalidJson(err) => write!(f, "alert is not valid JSON: {}", err),
            AlertError::MalformedAlert(msg) => write!(f, "invalid alert format: {}", msg),
        }
    }
}

impl std::error::Error for AlertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AlertError::Io(err) => Some(err),
            AlertError::InvalidJson(err) => Some(err),
            AlertError::MalformedAlert(_) => None,
        }
    }
}

impl From<std::io::Error> for AlertError {
    fn from(err: std::io::Error) -> Self {
        AlertError::Io(err)
    }
}

impl From<serde_json::Error> for AlertError {
    fn from(err: serde_json::Error) -> Self {
        AlertError::InvalidJson(err)
    }
}

/// Read and parse a single alert file.
#[instrument]
pub async fn parse_alert(path: &Path) -> AlertResult<AlertTarget> {
    let content = tokio::fs::read_to_string(path).await?;
    let alert = serde_json::from_str::<Value>(&content)?;
    let target = extract_target(&alert)?;

    debug!(
        "extracted VM: {}, subscription ID: {}",
        target.vm_name, target.subscription_id
    );
    Ok(target)
}

/// Pull the VM name and subscription out of an already parsed alert.
///
/// Missing or empty fields fall back to [`UNKNOWN_FIELD`]; only a missing
/// `alertContext` object is an error.
pub fn extract_target(alert: &Value) -> AlertResult<AlertTarget> {
    let Some(data) = alert.get("data").filter(|data| !data.is_null()) else {
        return Err(AlertError::MalformedAlert(
            "missing 'data.alertContext'".to_string(),
        ));
    };

    let Some(context) = data.get("alertContext").filter(|ctx| !ctx.is_null()) else {
        return Err(AlertError::MalformedAlert(
            "missing 'data.alertContext'".to_string(),
        ));
    };

    if !context.is_object() {
        return Err(AlertError::MalformedAlert(
            "'data.alertContext' is not an object".to_string(),
        ));
    }

    Ok(AlertTarget {
        vm_name: field_or_unknown(context, "resourceName"),
        subscription_id: field_or_unknown(context, "subscriptionId"),
    })
}

fn field_or_unknown(context: &Value, key: &str) -> String {
    context
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_FIELD)
        .to_string()
}

/// Move an alert file into `error_dir`, keeping its file name.
#[instrument]
pub async fn quarantine(path: &Path, error_dir: &Path) -> std::io::Result<PathBuf> {
    let Some(file_name) = path.file_name() else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        ));
    };

    let destination = error_dir.join(file_name);
    tokio::fs::rename(path, &destination).await?;
    warn!("moved {} to {}", path.display(), destination.display());

    Ok(destination)
}
