//! Provisioning: keeps a directory of registered devices up to date from `device.registered`.
//!
//! A registration with `expires_secs == 0` is an unregistration and removes the device.
//! Registrations that lapse without one are evicted on the next registration.

mod directory;

pub use crate::directory::{Device, DeviceDirectory, Vendor};

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use pbx_kernel::domain::ModuleError;
use pbx_kernel::domain::constants::{DEVICE_REGISTERED, PROVISIONING};
use pbx_kernel::domain::events::{DeviceRegistered, EventEnvelope};
use pbx_kernel::domain::module::Module;
use pbx_kernel::domain::permissions::{PermissionSet, permission_set};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct Provisioning {
    directory: DeviceDirectory,
}

impl Provisioning {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn directory(&self) -> DeviceDirectory {
        self.directory.clone()
    }

    fn apply(&self, registration: DeviceRegistered) {
        if registration.expires_secs == 0 {
            if self.directory.remove(&registration.tenant_domain, &registration.user).is_some() {
                info!(tenant = %registration.tenant_domain, user = %registration.user, "Device unregistered");
            }
            return;
        }

        let now = Utc::now();
        let vendor = Vendor::detect(registration.user_agent.as_deref());
        let expires_at = now + TimeDelta::seconds(i64::from(registration.expires_secs));
        let device = Device {
            tenant_domain: registration.tenant_domain,
            user: registration.user,
            contact: registration.contact,
            vendor,
            user_agent: registration.user_agent,
            expires_at,
        };

        let (tenant, user) = (device.tenant_domain.clone(), device.user.clone());
        if self.directory.upsert(device, now) {
            info!(%tenant, %user, %vendor, "Device registered");
        } else {
            debug!(%tenant, %user, "Device registration refreshed");
        }
    }
}

#[async_trait]
impl Module for Provisioning {
    fn name(&self) -> &str {
        PROVISIONING
    }

    fn alias(&self) -> &str {
        "Provisioning"
    }

    fn description(&self) -> &str {
        "Tracks registered phones and their vendors"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn subscribed_events(&self) -> Vec<String> {
        vec![DEVICE_REGISTERED.to_owned()]
    }

    async fn handle_event(&self, event: &EventEnvelope) -> Result<(), ModuleError> {
        self.apply(event.decode()?);
        Ok(())
    }

    fn permissions(&self) -> PermissionSet {
        permission_set(["device_view", "device_provision", "extension_view"])
    }
}
