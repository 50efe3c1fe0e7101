//! The capability contract every PBX module implements.

use crate::dialplan::{DialplanContributions, DialplanRequest};
use crate::error::ModuleError;
use crate::events::EventEnvelope;
use crate::permissions::PermissionSet;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// A pluggable capability unit: dialplan fragments, event handlers and permission tokens.
///
/// Lifecycle, driven by the kernel registry:
/// 1. [`Module::register`] once, before any module boots. Local setup only.
/// 2. [`Module::boot`] once, after every module registered. Peers are visible through
///    [`BootContext`].
/// 3. Serving: [`Module::dialplan_contributions`] and [`Module::handle_event`] are called
///    concurrently and repeatedly while the module is enabled.
///
/// Every hook besides identity has a no-op default.
#[async_trait]
pub trait Module: Debug + Send + Sync {
    /// Globally unique, stable identifier.
    fn name(&self) -> &str;

    /// Display name for administrative listings.
    fn alias(&self) -> &str {
        self.name()
    }

    fn description(&self) -> &str;

    /// Semantic version string.
    fn version(&self) -> &str;

    fn register(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }

    async fn boot(&self, _peers: &BootContext) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Routing fragments for one request, keyed by priority (lower evaluates first).
    ///
    /// Must depend only on the request and the module's own configuration.
    async fn dialplan_contributions(
        &self,
        _request: &DialplanRequest,
    ) -> Result<DialplanContributions, ModuleError> {
        Ok(DialplanContributions::new())
    }

    /// Event types this module reacts to. Read once, when the event bus is built.
    fn subscribed_events(&self) -> Vec<String> {
        Vec::new()
    }

    async fn handle_event(&self, _event: &EventEnvelope) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Tokens contributed while the module is enabled.
    fn permissions(&self) -> PermissionSet {
        PermissionSet::new()
    }
}

/// Where a module is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Registered,
    Booted,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Registered => "registered",
            Self::Booted => "booted",
        })
    }
}

/// Administrative snapshot of a registered module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub name: String,
    pub alias: String,
    pub description: String,
    pub version: String,
    pub registration_order: u32,
    pub enabled: bool,
    pub lifecycle_state: LifecycleState,
}

/// Read-only view of every registered module, handed to [`Module::boot`].
#[derive(Debug, Clone, Default)]
pub struct BootContext {
    modules: Vec<ModuleDescriptor>,
}

impl BootContext {
    #[must_use]
    pub const fn new(modules: Vec<ModuleDescriptor>) -> Self {
        Self { modules }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Resolves a peer the calling module cannot work without.
    pub fn require(&self, name: &str) -> Result<&ModuleDescriptor, ModuleError> {
        self.get(name).ok_or_else(|| ModuleError::Dependency {
            message: format!("module `{name}` is not registered").into(),
            context: None,
        })
    }

    /// Registered modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.iter()
    }
}
