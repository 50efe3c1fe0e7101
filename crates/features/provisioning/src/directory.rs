use chrono::{DateTime, Utc};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Phone vendor, guessed from the SIP `User-Agent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Yealink,
    Polycom,
    Grandstream,
    Cisco,
    Snom,
    Fanvil,
    Unknown,
}

impl Vendor {
    #[must_use]
    pub fn detect(user_agent: Option<&str>) -> Self {
        let Some(ua) = user_agent.map(str::to_ascii_lowercase) else {
            return Self::Unknown;
        };
        [
            ("yealink", Self::Yealink),
            ("polycom", Self::Polycom),
            ("poly", Self::Polycom),
            ("grandstream", Self::Grandstream),
            ("cisco", Self::Cisco),
            ("snom", Self::Snom),
            ("fanvil", Self::Fanvil),
        ]
        .into_iter()
        .find_map(|(needle, vendor)| ua.contains(needle).then_some(vendor))
        .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Yealink => "yealink",
            Self::Polycom => "polycom",
            Self::Grandstream => "grandstream",
            Self::Cisco => "cisco",
            Self::Snom => "snom",
            Self::Fanvil => "fanvil",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Last known registration of one user's device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub tenant_domain: String,
    pub user: String,
    pub contact: String,
    pub vendor: Vendor,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
}

type DeviceKey = (String, String);

/// Registered devices keyed by tenant and user.
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    devices: Arc<RwLock<FxHashMap<DeviceKey, Device>>>,
}

impl DeviceDirectory {
    /// Stores `device`, returning whether the user was unknown before.
    ///
    /// Registrations that lapsed by `now` are evicted first, so a device that expired
    /// counts as new when it registers again.
    pub(crate) fn upsert(&self, device: Device, now: DateTime<Utc>) -> bool {
        let key = (device.tenant_domain.clone(), device.user.clone());
        let mut devices = self.devices.write();
        devices.retain(|_, d| d.expires_at > now);
        devices.insert(key, device).is_none()
    }

    /// Drops every registration that lapsed by `now`, returning how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut devices = self.devices.write();
        let before = devices.len();
        devices.retain(|_, d| d.expires_at > now);
        before - devices.len()
    }

    pub(crate) fn remove(&self, tenant: &str, user: &str) -> Option<Device> {
        self.devices.write().remove(&(tenant.to_owned(), user.to_owned()))
    }

    #[must_use]
    pub fn get(&self, tenant: &str, user: &str) -> Option<Device> {
        self.devices.read().get(&(tenant.to_owned(), user.to_owned())).cloned()
    }

    /// Devices of one tenant whose registration has not expired at `now`, sorted by user.
    #[must_use]
    pub fn active(&self, tenant: &str, now: DateTime<Utc>) -> Vec<Device> {
        let mut devices: Vec<_> = self
            .devices
            .read()
            .values()
            .filter(|d| d.tenant_domain == tenant && d.expires_at > now)
            .cloned()
            .collect();
        devices.sort_unstable_by(|a, b| a.user.cmp(&b.user));
        devices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}
