use std::path::PathBuf;

use tracing::trace;

/// Locations the orchestrator reads from and writes to
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Directories {
    /// Alerts waiting to be processed
    #[serde(default = "default_input_dir")]
    pub input: PathBuf,

    /// Enriched profiles, one per processed alert
    #[serde(default = "default_output_dir")]
    pub output: PathBuf,

    /// Quarantine for alerts that could not be parsed
    #[serde(default = "default_error_dir")]
    pub error: PathBuf,
}

impl Default for Directories {
    fn default() -> Self {
        Directories {
            input: default_input_dir(),
            output: default_output_dir(),
            error: default_error_dir(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("./inputs")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./outputs")
}

fn default_error_dir() -> PathBuf {
    PathBuf::from("./error_processed")
}

/// Fixed values stamped into every output profile
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_service_id")]
    pub service_id: String,
    #[serde(default = "default_customer_name")]
    pub customer_name: String,
    /// Appended to the VM name to build the host name
    #[serde(default = "default_host_suffix")]
    pub host_suffix: String,
    #[serde(default = "default_severity")]
    pub severity: u8,
    #[serde(default = "default_alarm_text")]
    pub alarm_text: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            service_id: default_service_id(),
            customer_name: default_customer_name(),
            host_suffix: default_host_suffix(),
            severity: default_severity(),
            alarm_text: default_alarm_text(),
        }
    }
}

fn default_service_id() -> String {
    "SSM-UKPO-1-1-1".to_string()
}

fn default_customer_name() -> String {
    "Post Office".to_string()
}

fn default_host_suffix() -> String {
    ".ssm-customer".to_string()
}

fn default_severity() -> u8 {
    3
}

fn default_alarm_text() -> String {
    "ALARM: High CPU Utilization 90%".to_string()
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct AzureConfig {
    /// Base URL of the Resource Manager API
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,

    /// Optional request timeout in seconds (no timeout when absent)
    pub timeout: Option<u64>,
}

impl Default for AzureConfig {
    fn default() -> Self {
        AzureConfig {
            management_endpoint: default_management_endpoint(),
            timeout: None,
        }
    }
}

fn default_management_endpoint() -> String {
    "https://management.azure.com".to_string()
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub directories: Directories,

    #[serde(default)]
    pub profile: ProfileConfig,

    #[serde(default)]
    pub azure: AzureConfig,
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
