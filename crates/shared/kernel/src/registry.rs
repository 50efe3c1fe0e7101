//! The module registry.
//!
//! Startup is split into two types. [`RegistryBuilder`] accepts registrations; consuming it
//! with [`RegistryBuilder::boot_all`] boots every module once and yields the serving
//! [`ModuleRegistry`]. Nothing can be registered after boot and boot cannot run twice.

use crate::dialplan::{DEFAULT_DIALPLAN_TIMEOUT, Dialplan, DialplanComposer};
use crate::error::RegistryError;
use crate::permissions;
use fxhash::FxHashMap;
use pbx_domain::ModuleError;
use pbx_domain::dialplan::DialplanRequest;
use pbx_domain::events::{DomainEvent, EventEnvelope};
use pbx_domain::module::{BootContext, Module, ModuleDescriptor};
use pbx_domain::permissions::PermissionSet;
use pbx_domain::registry::ModuleHandle;
use pbx_event_bus::{DEFAULT_HANDLER_TIMEOUT, DispatchReport, EventBus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Collects modules before boot.
#[derive(Debug)]
#[must_use = "registered modules are never booted unless you call .boot_all()"]
pub struct RegistryBuilder {
    modules: Vec<ModuleHandle>,
    index: FxHashMap<String, usize>,
    next_order: u32,
    handler_timeout: Duration,
    dialplan_timeout: Duration,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            index: FxHashMap::default(),
            next_order: 0,
            handler_timeout: DEFAULT_HANDLER_TIMEOUT,
            dialplan_timeout: DEFAULT_DIALPLAN_TIMEOUT,
        }
    }
}

impl RegistryBuilder {
    pub const fn handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    pub const fn dialplan_timeout(mut self, timeout: Duration) -> Self {
        self.dialplan_timeout = timeout;
        self
    }

    /// Adds a module, calling its `register` hook and assigning the next registration order.
    ///
    /// On any error the builder is left exactly as it was and no order is consumed.
    pub fn register(&mut self, mut module: Box<dyn Module>) -> Result<ModuleDescriptor, RegistryError> {
        let name = module.name().to_owned();
        if self.index.contains_key(&name) {
            warn!(module = %name, "Duplicate module registration rejected");
            return Err(RegistryError::DuplicateModuleName { name, context: None });
        }

        module.register().map_err(|source| RegistryError::ModuleRegisterFailure {
            module: name.clone(),
            source,
            context: None,
        })?;

        let order = self.next_order;
        self.next_order += 1;

        let handle = ModuleHandle::new(module, order, true);
        let descriptor = handle.descriptor();
        self.index.insert(name, self.modules.len());
        self.modules.push(handle);

        debug!(module = %descriptor.name, version = %descriptor.version, order, "Module registered");
        Ok(descriptor)
    }

    /// Registers modules in iteration order, stopping at the first failure.
    pub fn register_all(
        &mut self,
        modules: impl IntoIterator<Item = Box<dyn Module>>,
    ) -> Result<(), RegistryError> {
        for module in modules {
            self.register(module)?;
        }
        Ok(())
    }

    /// Starts `name` in the disabled state. It still boots.
    pub fn disable(&mut self, name: &str) -> Result<(), RegistryError> {
        let handle = self
            .index
            .get(name)
            .map(|&i| &self.modules[i])
            .ok_or_else(|| RegistryError::not_found(name))?;
        handle.set_enabled(false);
        debug!(module = name, "Module will start disabled");
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Boots every module in registration order, then builds the event bus.
    ///
    /// The first boot failure aborts startup; modules after it are not booted.
    pub async fn boot_all(self) -> Result<ModuleRegistry, RegistryError> {
        let peers = BootContext::new(self.modules.iter().map(ModuleHandle::descriptor).collect());

        for handle in &self.modules {
            if let Err(source) = handle.module().boot(&peers).await {
                warn!(module = handle.name(), error = %source, "Module boot failed, aborting startup");
                return Err(RegistryError::ModuleBootFailure {
                    module: handle.name().to_owned(),
                    source,
                    context: None,
                });
            }
            handle.mark_booted();
            info!(module = handle.name(), enabled = handle.is_enabled(), "Module booted");
        }

        let events = EventBus::builder()
            .handler_timeout(self.handler_timeout)
            .modules(self.modules.iter().cloned())
            .build();

        info!(
            modules = self.modules.len(),
            event_types = events.event_types().len(),
            "Module registry ready"
        );

        Ok(ModuleRegistry {
            inner: Arc::new(RegistryInner {
                modules: self.modules,
                index: self.index,
                events,
                composer: DialplanComposer::new(self.dialplan_timeout),
            }),
        })
    }
}

#[derive(Debug)]
struct RegistryInner {
    /// Registration order.
    modules: Vec<ModuleHandle>,
    index: FxHashMap<String, usize>,
    events: EventBus,
    composer: DialplanComposer,
}

/// The booted module set. Cheap to clone; every clone is the same registry.
///
/// The set of modules is fixed. The only mutable state is each module's enabled flag, a
/// single atomic read afresh by every dispatch, composition and aggregation.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    inner: Arc<RegistryInner>,
}

impl ModuleRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Current descriptor for `name`.
    pub fn get(&self, name: &str) -> Result<ModuleDescriptor, RegistryError> {
        self.module(name).map(ModuleHandle::descriptor)
    }

    pub fn module(&self, name: &str) -> Result<&ModuleHandle, RegistryError> {
        self.inner
            .index
            .get(name)
            .map(|&i| &self.inner.modules[i])
            .ok_or_else(|| RegistryError::not_found(name))
    }

    /// Flips the enabled flag and returns the previous value.
    ///
    /// Takes effect for the next dispatch, composition or aggregation. Re-enabling never
    /// re-runs boot.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<bool, RegistryError> {
        let previous = self.module(name)?.set_enabled(enabled);
        if previous != enabled {
            info!(module = name, enabled, "Module toggled");
        }
        Ok(previous)
    }

    /// Every registered module in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<ModuleDescriptor> {
        self.inner.modules.iter().map(ModuleHandle::descriptor).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.modules.is_empty()
    }

    /// Ordered fragment text for one tenant and destination.
    pub async fn compose_dialplan(&self, tenant_domain: &str, destination: &str) -> Vec<String> {
        self.dialplan(DialplanRequest::new(tenant_domain, destination)).await.into_xml()
    }

    /// Like [`Self::compose_dialplan`], keeping per-fragment attribution and dropped modules.
    pub async fn dialplan(&self, request: DialplanRequest) -> Dialplan {
        self.inner.composer.compose(&self.inner.modules, request).await
    }

    pub async fn dispatch_event(&self, envelope: EventEnvelope) -> DispatchReport {
        self.inner.events.dispatch(envelope).await
    }

    /// Encodes and dispatches a typed event.
    pub async fn dispatch<E: DomainEvent>(&self, event: &E) -> Result<DispatchReport, ModuleError> {
        self.inner.events.publish(event).await
    }

    #[must_use]
    pub fn aggregate_permissions(&self) -> PermissionSet {
        permissions::aggregate(&self.inner.modules)
    }

    /// Enabled modules and the tokens each contributes.
    #[must_use]
    pub fn permissions_by_module(&self) -> Vec<(String, PermissionSet)> {
        permissions::by_module(&self.inner.modules)
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }
}
