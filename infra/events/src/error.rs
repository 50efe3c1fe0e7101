use pbx_domain::ModuleError;
use std::borrow::Cow;

/// A subscriber's `handle_event` did not complete. Contained to that subscriber.
#[pbx_derive::pbx_error]
pub enum EventHandlerFailure {
    /// The handler returned an error.
    #[error("Handler `{module}` failed on `{event_type}`{}: {source}", format_context(.context))]
    Failed {
        module: String,
        event_type: String,
        source: ModuleError,
        context: Option<Cow<'static, str>>,
    },

    /// The handler exceeded the bus timeout and was aborted.
    #[error("Handler `{module}` timed out on `{event_type}` after {timeout_ms} ms{}", format_context(.context))]
    TimedOut {
        module: String,
        event_type: String,
        timeout_ms: u64,
        context: Option<Cow<'static, str>>,
    },

    /// The handler panicked.
    #[error("Handler `{module}` panicked on `{event_type}`{}: {message}", format_context(.context))]
    Panicked {
        module: String,
        event_type: String,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },
}

impl EventHandlerFailure {
    /// Name of the module whose handler failed.
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::Failed { module, .. } | Self::TimedOut { module, .. } | Self::Panicked { module, .. } => {
                module
            },
        }
    }

    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::Failed { event_type, .. }
            | Self::TimedOut { event_type, .. }
            | Self::Panicked { event_type, .. } => event_type,
        }
    }
}
