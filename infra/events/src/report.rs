use crate::error::EventHandlerFailure;

/// Outcome of one dispatch, for operators. Never an error for the caller.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub event_type: String,
    /// Modules whose handler completed, in delivery order.
    pub delivered: Vec<String>,
    /// Subscribers skipped because they were disabled when their turn came.
    pub skipped: Vec<String>,
    pub failures: Vec<EventHandlerFailure>,
}

impl DispatchReport {
    pub(crate) fn new(event_type: &str) -> Self {
        Self { event_type: event_type.to_owned(), ..Self::default() }
    }

    /// No handler was invoked at all.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.delivered.is_empty() && self.failures.is_empty()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_modules(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(EventHandlerFailure::module)
    }
}
