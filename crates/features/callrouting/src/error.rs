use pbx_kernel::domain::ModuleError;
use std::borrow::Cow;

/// Call-routing configuration problems, detected at registration.
#[pbx_derive::pbx_error]
pub enum CallRoutingError {
    #[error("Invalid extension length range {min}..={max}{}", format_context(.context))]
    ExtensionRange { min: usize, max: usize, context: Option<Cow<'static, str>> },

    #[error("Invalid gateway name{}: {message}", format_context(.context))]
    Gateway { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<CallRoutingError> for ModuleError {
    fn from(err: CallRoutingError) -> Self {
        Self::Config { message: err.to_string().into(), context: Some("callrouting".into()) }
    }
}
