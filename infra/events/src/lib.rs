//! # Event Bus
//!
//! Fans domain events out to the PBX modules that declared interest in them.
//!
//! ## Overview
//!
//! The bus is built once, after every module has booted, from each module's
//! `subscribed_events()`. The resulting table (event type -> subscribers in registration
//! order) is frozen: later changes to a module's subscriptions have no effect, and dispatch
//! reads the table without locks.
//!
//! ## Delivery guarantees
//!
//! * Subscribers are called one after another in registration order; disabled subscribers
//!   are skipped at the moment their turn comes. A subscriber disabled by an earlier handler
//!   of the same event is therefore skipped, unlike dialplan composition, which reads every
//!   flag before querying modules concurrently.
//! * Every handler runs on its own task bounded by a timeout. Errors, timeouts and panics
//!   are logged with module and event type, recorded in the [`DispatchReport`], and never
//!   stop delivery to the next subscriber.
//! * No retries: a handler may have applied partial side effects before failing.
//!
//! # Example
//!
//! ```rust,ignore
//! use pbx_event_bus::EventBus;
//!
//! let bus = EventBus::builder().handler_timeout(timeout).modules(handles).build();
//! let report = bus.dispatch(envelope).await;
//! assert!(report.is_clean());
//! ```

mod bus;
mod error;
mod report;

pub use bus::{DEFAULT_HANDLER_TIMEOUT, EventBus, EventBusBuilder};
pub use error::{EventHandlerFailure, EventHandlerFailureExt};
pub use report::DispatchReport;
