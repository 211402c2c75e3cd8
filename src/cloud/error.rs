//! Error types for cloud provider lookups

use std::fmt;

/// Result type alias for cloud lookups
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors that can occur while resolving a VM through the provider
#[derive(Debug)]
pub enum CloudError {
    /// Transport-level failure (DNS, TLS, connection reset, ...)
    Http(reqwest::Error),

    /// The provider answered with a non-success status
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// The response body did not have the expected shape
    Decode(String),

    /// No bearer token could be obtained
    Credential(String),

    /// A resource id did not have the expected `/`-separated layout
    InvalidResourceId(String),

    /// The matched VM has no network interfaces attached
    NoNetworkInterface(String),

    /// The network interface has no IP configurations
    NoIpConfiguration(String),

    /// The primary IP configuration has no private address
    NoPrivateIp(String),
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudError::Http(err) => write!(f, "request failed: {}", err),
            CloudError::Status { status, url, body } => {
                write!(f, "{} returned status {}: {}", url, status, body)
            }
            CloudError::Decode(msg) => write!(f, "unexpected response body: {}", msg),
            CloudError::Credential(msg) => write!(f, "failed to obtain credentials: {}", msg),
            CloudError::InvalidResourceId(id) => write!(f, "invalid resource id: {}", id),
            CloudError::NoNetworkInterface(vm) => {
                write!(f, "VM {} has no network interfaces", vm)
            }
            CloudError::NoIpConfiguration(nic) => {
                write!(f, "network interface {} has no IP configurations", nic)
            }
            CloudError::NoPrivateIp(nic) => {
                write!(f, "network interface {} has no private IP address", nic)
            }
        }
    }
}

impl std::error::Error for CloudError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CloudError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CloudError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CloudError::Decode(err.to_string())
        } else {
            CloudError::Http(err)
        }
    }
}
