use crate::error::EventHandlerFailure;
use crate::report::DispatchReport;
use fxhash::{FxHashMap, FxHashSet};
use pbx_domain::ModuleError;
use pbx_domain::events::{DomainEvent, EventEnvelope};
use pbx_domain::registry::ModuleHandle;
use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default upper bound for a single `handle_event` call.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
struct Routes {
    /// Event type -> subscribers in registration order.
    table: FxHashMap<String, Vec<ModuleHandle>>,
    handler_timeout: Duration,
}

/// Delivers domain events to the modules that subscribed to them.
///
/// The subscription table is built once and never changes, so dispatch reads it without
/// locking. The only state consulted per delivery is each subscriber's enabled flag.
#[derive(Debug, Clone)]
pub struct EventBus {
    routes: Arc<Routes>,
}

impl EventBus {
    #[must_use]
    pub fn builder() -> EventBusBuilder {
        EventBusBuilder::default()
    }

    /// Subscriber names for `event_type`, in delivery order, regardless of enabled state.
    #[must_use]
    pub fn subscribers(&self, event_type: &str) -> Vec<&str> {
        self.routes
            .table
            .get(event_type)
            .map(|handles| handles.iter().map(ModuleHandle::name).collect())
            .unwrap_or_default()
    }

    /// Every event type with at least one subscriber, sorted.
    #[must_use]
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.routes.table.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    #[must_use]
    pub fn handler_timeout(&self) -> Duration {
        self.routes.handler_timeout
    }

    /// Delivers `envelope` to every enabled subscriber, one at a time, in registration order.
    ///
    /// Returns once each reachable subscriber has handled the event or failed. A failure
    /// (error, timeout or panic) is logged and recorded in the report; delivery to the
    /// remaining subscribers continues. Unknown event types are a no-op.
    pub async fn dispatch(&self, envelope: EventEnvelope) -> DispatchReport {
        let event = Arc::new(envelope);
        let mut report = DispatchReport::new(&event.event_type);

        let Some(subscribers) = self.routes.table.get(&event.event_type) else {
            trace!(event_type = %event.event_type, "No subscribers, nothing to dispatch");
            return report;
        };

        for handle in subscribers {
            if !handle.is_enabled() {
                trace!(module = handle.name(), event_type = %event.event_type, "Subscriber disabled, skipped");
                report.skipped.push(handle.name().to_owned());
                continue;
            }

            match self.deliver(handle, &event).await {
                Ok(()) => report.delivered.push(handle.name().to_owned()),
                Err(failure) => {
                    warn!(
                        module = handle.name(),
                        event_type = %event.event_type,
                        tenant = event.tenant_id.as_deref().unwrap_or("-"),
                        kind = failure.kind(),
                        error = %failure,
                        "Event handler failed, continuing dispatch"
                    );
                    report.failures.push(failure);
                },
            }
        }

        debug!(
            event_type = %event.event_type,
            delivered = report.delivered.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Event dispatched"
        );
        report
    }

    /// Encodes a typed event and dispatches it.
    ///
    /// # Errors
    /// Only encoding can fail; handler failures are reported, not returned.
    pub async fn publish<E: DomainEvent>(&self, event: &E) -> Result<DispatchReport, ModuleError> {
        let envelope = EventEnvelope::from_event(event)?;
        Ok(self.dispatch(envelope).await)
    }

    async fn deliver(
        &self,
        handle: &ModuleHandle,
        event: &Arc<EventEnvelope>,
    ) -> Result<(), EventHandlerFailure> {
        let task = {
            let handle = handle.clone();
            let event = Arc::clone(event);
            tokio::spawn(async move { handle.module().handle_event(&event).await })
        };
        let abort = task.abort_handle();
        let timeout = self.routes.handler_timeout;

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(source))) => Err(EventHandlerFailure::Failed {
                module: handle.name().to_owned(),
                event_type: event.event_type.clone(),
                source,
                context: None,
            }),
            Ok(Err(join)) => Err(EventHandlerFailure::Panicked {
                module: handle.name().to_owned(),
                event_type: event.event_type.clone(),
                message: if join.is_panic() {
                    panic_message(join.into_panic())
                } else {
                    Cow::Borrowed("handler task was cancelled")
                },
                context: None,
            }),
            Err(_) => {
                abort.abort();
                Err(EventHandlerFailure::TimedOut {
                    module: handle.name().to_owned(),
                    event_type: event.event_type.clone(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    context: None,
                })
            },
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> Cow<'static, str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Cow::Borrowed(*message)
    } else if let Ok(message) = payload.downcast::<String>() {
        Cow::Owned(*message)
    } else {
        Cow::Borrowed("non-string panic payload")
    }
}

/// Collects subscribers and freezes them into an [`EventBus`].
#[derive(Debug, Default)]
#[must_use = "builders do nothing unless you call .build()"]
pub struct EventBusBuilder {
    handler_timeout: Option<Duration>,
    modules: Vec<ModuleHandle>,
}

impl EventBusBuilder {
    pub const fn handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = Some(timeout);
        self
    }

    pub fn module(mut self, handle: ModuleHandle) -> Self {
        self.modules.push(handle);
        self
    }

    pub fn modules(mut self, handles: impl IntoIterator<Item = ModuleHandle>) -> Self {
        self.modules.extend(handles);
        self
    }

    /// Reads each module's `subscribed_events()` exactly once and builds the table.
    pub fn build(mut self) -> EventBus {
        self.modules.sort_by_key(ModuleHandle::order);

        let mut table: FxHashMap<String, Vec<ModuleHandle>> = FxHashMap::default();
        for handle in &self.modules {
            let mut seen = FxHashSet::default();
            for event_type in handle.module().subscribed_events() {
                if !seen.insert(event_type.clone()) {
                    continue;
                }
                trace!(module = handle.name(), event_type = %event_type, "Subscription registered");
                table.entry(event_type).or_default().push(handle.clone());
            }
        }

        debug!(event_types = table.len(), modules = self.modules.len(), "Event bus built");

        EventBus {
            routes: Arc::new(Routes {
                table,
                handler_timeout: self.handler_timeout.unwrap_or(DEFAULT_HANDLER_TIMEOUT),
            }),
        }
    }
}
