//! VM lookup by name within a subscription

use futures::TryStreamExt;
use tracing::{debug, instrument, trace};

use crate::VmRecord;
use crate::cloud::resource_id::resource_group;
use crate::cloud::{CloudError, CloudProvider, CloudResult, VirtualMachine, VmStream};

/// Walk `vms` and return the first VM whose name matches `vm_name`,
/// ignoring case.
///
/// Stops pulling from the stream as soon as a match is found, so later pages
/// are never requested. Duplicate names resolve to the first one listed.
pub async fn find_vm(mut vms: VmStream<'_>, vm_name: &str) -> CloudResult<Option<VirtualMachine>> {
    let wanted = vm_name.to_lowercase();
    let mut scanned = 0usize;

    while let Some(vm) = vms.try_next().await? {
        scanned += 1;
        if vm.name.to_lowercase() == wanted {
            trace!("matched {} after scanning {scanned} VMs", vm.id);
            return Ok(Some(vm));
        }
    }

    debug!("no VM named {vm_name} among {scanned} VMs");
    Ok(None)
}

impl VmRecord {
    /// Reduce a listed VM to the parts needed for the network lookups.
    pub fn from_machine(vm: &VirtualMachine, subscription_id: &str) -> CloudResult<Self> {
        let resource_group = resource_group(&vm.id)
            .ok_or_else(|| CloudError::InvalidResourceId(vm.id.clone()))?;

        let network_interface = vm
            .network_interfaces()
            .first()
            .ok_or_else(|| CloudError::NoNetworkInterface(vm.name.clone()))?;

        Ok(VmRecord {
            name: vm.name.clone(),
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            network_interface_id: network_interface.id.clone(),
        })
    }
}

/// Find the VM named `vm_name` in a subscription.
///
/// `Ok(None)` means the listing was exhausted without a match.
#[instrument(skip(provider))]
pub async fn lookup_vm<P>(
    provider: &P,
    vm_name: &str,
    subscription_id: &str,
) -> CloudResult<Option<VmRecord>>
where
    P: CloudProvider + ?Sized,
{
    let vms = provider.list_all_vms(subscription_id);

    match find_vm(vms, vm_name).await? {
        Some(vm) => VmRecord::from_machine(&vm, subscription_id).map(Some),
        None => Ok(None),
    }
}
