use pbx_domain::ModuleError;
use pbx_domain::dialplan::DialplanRequest;
use std::borrow::Cow;

/// A module's contribution could not be collected. The module contributes nothing to that
/// composition; the rest of the dialplan is unaffected.
#[pbx_derive::pbx_error]
pub enum DialplanContributionFailure {
    #[error("Module `{module}` failed to contribute to `{request}`{}: {source}", format_context(.context))]
    Failed {
        module: String,
        request: DialplanRequest,
        source: ModuleError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Module `{module}` timed out contributing to `{request}` after {timeout_ms} ms{}", format_context(.context))]
    TimedOut {
        module: String,
        request: DialplanRequest,
        timeout_ms: u64,
        context: Option<Cow<'static, str>>,
    },

    #[error("Module `{module}` panicked contributing to `{request}`{}: {message}", format_context(.context))]
    Panicked {
        module: String,
        request: DialplanRequest,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },
}

impl DialplanContributionFailure {
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::Failed { module, .. } | Self::TimedOut { module, .. } | Self::Panicked { module, .. } => {
                module
            },
        }
    }
}
