//! Facade for the PBX platform.
//! Re-exports the domain, kernel and event bus, and owns the one place where the module set
//! is decided. Keep this crate thin: it composes other crates, it does not implement modules.
//!
//! ## Usage
//! - Pick modules with Cargo features (`full` by default).
//! - Call [`init`] once at start-up and pass the returned registry to consumers.

pub use pbx_domain as domain;
pub use pbx_event_bus as events;
pub use pbx_kernel as kernel;

use pbx_domain::config::PbxConfig;
use pbx_domain::module::Module;
use pbx_kernel::{ModuleRegistry, RegistryError};
use tracing::info;

/// Module crates compiled into this build.
pub mod features {
    #[cfg(feature = "analytics")]
    pub use pbx_analytics as analytics;
    #[cfg(feature = "audit")]
    pub use pbx_audit as audit;
    #[cfg(feature = "callrouting")]
    pub use pbx_callrouting as callrouting;
    #[cfg(feature = "contactcenter")]
    pub use pbx_contactcenter as contactcenter;
    #[cfg(feature = "media")]
    pub use pbx_media as media;
    #[cfg(feature = "provisioning")]
    pub use pbx_provisioning as provisioning;

    /// Build-time enabled modules (by Cargo feature), in registration order.
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "callrouting")]
        "callrouting",
        #[cfg(feature = "contactcenter")]
        "contactcenter",
        #[cfg(feature = "media")]
        "media",
        #[cfg(feature = "provisioning")]
        "provisioning",
        #[cfg(feature = "analytics")]
        "analytics",
        #[cfg(feature = "audit")]
        "audit",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// The module set, in registration order.
#[must_use]
#[allow(unused_variables, unused_mut)]
pub fn modules(config: &PbxConfig) -> Vec<Box<dyn Module>> {
    let mut modules: Vec<Box<dyn Module>> = Vec::new();

    #[cfg(feature = "callrouting")]
    modules.push(Box::new(features::callrouting::CallRouting::new(config.callrouting.clone())));

    #[cfg(feature = "contactcenter")]
    modules.push(Box::new(features::contactcenter::ContactCenter::new(&config.contactcenter)));

    #[cfg(feature = "media")]
    modules.push(Box::new(features::media::Media::new(config.media.clone())));

    #[cfg(feature = "provisioning")]
    modules.push(Box::new(features::provisioning::Provisioning::new()));

    #[cfg(feature = "analytics")]
    modules.push(Box::new(features::analytics::Analytics::new()));

    #[cfg(feature = "audit")]
    modules.push(Box::new(features::audit::Audit::new(&config.audit)));

    modules
}

/// Registers and boots every module.
///
/// Modules named in `modules.disabled` start disabled; naming an unknown module is an error.
///
/// # Errors
/// Returns the first registration, configuration or boot failure. No registry is produced.
pub async fn init(config: &PbxConfig) -> Result<ModuleRegistry, RegistryError> {
    init_with(config, modules(config)).await
}

/// Like [`init`] with an explicit module set.
///
/// # Errors
/// See [`init`].
pub async fn init_with(
    config: &PbxConfig,
    modules: Vec<Box<dyn Module>>,
) -> Result<ModuleRegistry, RegistryError> {
    let mut builder = ModuleRegistry::builder()
        .handler_timeout(config.modules.handler_timeout())
        .dialplan_timeout(config.modules.dialplan_timeout());

    builder.register_all(modules)?;
    for name in &config.modules.disabled {
        builder.disable(name)?;
    }

    let registry = builder.boot_all().await?;
    info!(modules = registry.len(), disabled = config.modules.disabled.len(), "PBX runtime initialized");
    Ok(registry)
}
