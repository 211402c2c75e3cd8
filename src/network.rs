//! Address resolution for a matched VM

use tracing::{debug, instrument};

use crate::cloud::resource_id::resource_name;
use crate::cloud::{CloudError, CloudProvider, CloudResult};
use crate::{NO_PUBLIC_IP, NetworkProfile, UNASSIGNED_PUBLIC_IP, VmRecord};

/// Resolve the private and public address of the VM's primary NIC.
///
/// Only the first IP configuration of the first NIC is considered. The public
/// address is [`NO_PUBLIC_IP`] when that configuration has no public IP
/// resource attached.
#[instrument(skip(provider, record), fields(vm = %record.name))]
pub async fn resolve_network<P>(provider: &P, record: &VmRecord) -> CloudResult<NetworkProfile>
where
    P: CloudProvider + ?Sized,
{
    let nic_name = resource_name(&record.network_interface_id)
        .ok_or_else(|| CloudError::InvalidResourceId(record.network_interface_id.clone()))?;

    let nic = provider
        .get_network_interface(&record.subscription_id, &record.resource_group, nic_name)
        .await?;

    let ip_config = nic
        .properties
        .ip_configurations
        .into_iter()
        .next()
        .ok_or_else(|| CloudError::NoIpConfiguration(nic_name.to_string()))?;

    let private_ip = ip_config
        .properties
        .private_ip_address
        .filter(|ip| !ip.is_empty())
        .ok_or_else(|| CloudError::NoPrivateIp(nic_name.to_string()))?;

    let public_ip = match ip_config.properties.public_ip_address {
        Some(reference) => {
            let public_ip_name = resource_name(&reference.id)
                .ok_or_else(|| CloudError::InvalidResourceId(reference.id.clone()))?;

            provider
                .get_public_ip(
                    &record.subscription_id,
                    &record.resource_group,
                    public_ip_name,
                )
                .await?
                .properties
                .ip_address
                .filter(|ip| !ip.is_empty())
                .unwrap_or_else(|| UNASSIGNED_PUBLIC_IP.to_string())
        }
        None => NO_PUBLIC_IP.to_string(),
    };

    debug!("resolved private IP {private_ip}, public IP {public_ip}");

    Ok(NetworkProfile {
        private_ip,
        public_ip,
    })
}
