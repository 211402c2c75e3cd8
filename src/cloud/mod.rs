//! Cloud provider capabilities used to resolve a VM
//!
//! The profiler only needs four read operations from the provider. They are
//! expressed as the [`CloudProvider`] trait so the orchestrator can run
//! against the real Resource Manager client or against canned responses.
//!
//! ## Design
//!
//! - **Lazy listing**: `list_all_vms` returns a [`VmStream`] that fetches one
//!   page at a time and stops as soon as the consumer stops pulling
//! - **Explicit credentials**: the Resource Manager client receives a
//!   [`credential::CredentialProvider`] at construction

pub mod azure;
pub mod credential;
pub mod error;
pub mod models;
pub mod resource_id;

use async_trait::async_trait;
use futures::stream::BoxStream;

pub use error::{CloudError, CloudResult};
pub use models::{NetworkInterface, PublicIpAddress, Subscription, VirtualMachine};

/// Finite, non-restartable sequence of the VMs in a subscription
pub type VmStream<'a> = BoxStream<'a, CloudResult<VirtualMachine>>;

#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// All VMs visible in the subscription, in provider listing order.
    fn list_all_vms<'a>(&'a self, subscription_id: &'a str) -> VmStream<'a>;

    async fn get_network_interface(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
    ) -> CloudResult<NetworkInterface>;

    async fn get_public_ip(
        &self,
        subscription_id: &str,
        resource_group: &str,
        name: &str,
    ) -> CloudResult<PublicIpAddress>;

    async fn get_subscription(&self, subscription_id: &str) -> CloudResult<Subscription>;
}
