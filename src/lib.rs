pub mod account;
pub mod alert;
pub mod cloud;
pub mod compute;
pub mod config;
pub mod network;
pub mod orchestrator;
pub mod util;

use serde::{Deserialize, Serialize};

use crate::config::ProfileConfig;

/// Sentinel used when a network interface has no public IP resource attached.
pub const NO_PUBLIC_IP: &str = "N/A";

/// Sentinel used when a public IP resource exists but has no address allocated.
pub const UNASSIGNED_PUBLIC_IP: &str = "Unassigned";

/// Sentinel used when the subscription display name cannot be resolved.
pub const UNKNOWN_ACCOUNT: &str = "Unknown Account";

/// Placeholder for alert fields that are missing or empty.
pub const UNKNOWN_FIELD: &str = "Unknown";

/// The machine an alert refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTarget {
    pub vm_name: String,
    pub subscription_id: String,
}

/// A matched virtual machine, reduced to what the network lookups need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRecord {
    pub name: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub network_interface_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub private_ip: String,
    pub public_ip: String,
}

/// The enriched record written for every successfully processed alert.
///
/// Field order is the order of the keys in the written JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputProfile {
    #[serde(rename = "SSM Service ID")]
    pub service_id: String,
    #[serde(rename = "SSM Customer Name")]
    pub customer_name: String,
    #[serde(rename = "SSM Host Name")]
    pub host_name: String,
    #[serde(rename = "IP Address")]
    pub ip_address: String,
    #[serde(rename = "Severity")]
    pub severity: u8,
    #[serde(rename = "Alarm Text")]
    pub alarm_text: String,
    #[serde(rename = "VM Name")]
    pub vm_name: String,
    #[serde(rename = "Private IP")]
    pub private_ip: String,
    #[serde(rename = "Public IP")]
    pub public_ip: String,
    #[serde(rename = "Subscription ID")]
    pub subscription_id: String,
    #[serde(rename = "Azure Account Name")]
    pub account_name: String,
}

impl OutputProfile {
    pub fn assemble(
        profile: &ProfileConfig,
        target: &AlertTarget,
        network: NetworkProfile,
        account_name: String,
    ) -> Self {
        Self {
            service_id: profile.service_id.clone(),
            customer_name: profile.customer_name.clone(),
            host_name: format!("{}{}", target.vm_name, profile.host_suffix),
            ip_address: network.private_ip.clone(),
            severity: profile.severity,
            alarm_text: profile.alarm_text.clone(),
            vm_name: target.vm_name.clone(),
            private_ip: network.private_ip,
            public_ip: network.public_ip,
            subscription_id: target.subscription_id.clone(),
            account_name,
        }
    }
}
