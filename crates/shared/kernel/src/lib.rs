//! Kernel of the PBX module runtime.
//!
//! Owns the [`ModuleRegistry`]: the single process-wide table of modules, their enabled flags
//! and the event bus built from their subscriptions. Dialplan composition and permission
//! aggregation read the registry's current enabled set on every call.
//!
//! ## When a toggle is seen
//!
//! Each module's flag is read once per operation, but not at the same point:
//!
//! * Event dispatch is sequential, so a subscriber's flag is read when its turn comes. A
//!   module disabled by an earlier handler of the same event is skipped.
//! * Dialplan composition queries modules concurrently, so every flag is read up front. A
//!   module disabled while composition runs still contributes to that dialplan.
//! * Permission aggregation reads every flag once while building the set.
//!
//! ```rust,ignore
//! let mut builder = ModuleRegistry::builder().handler_timeout(config.modules.handler_timeout());
//! for module in modules {
//!     builder.register(module)?;
//! }
//! let registry = builder.boot_all().await?;
//!
//! let fragments = registry.compose_dialplan("t1.example", "100").await;
//! let tokens = registry.aggregate_permissions();
//! ```
pub mod audit;
pub mod config;
pub mod dialplan;
pub mod error;
pub mod permissions;
pub mod registry;

pub use error::{RegistryError, RegistryErrorExt};
pub use pbx_domain as domain;
pub use pbx_event_bus as events;
pub use registry::{ModuleRegistry, RegistryBuilder};
