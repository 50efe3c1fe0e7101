use pbx_kernel::domain::ModuleError;
use std::borrow::Cow;

#[pbx_derive::pbx_error]
pub enum ContactCenterError {
    /// Two queues share a name or an extension within the same tenant scope.
    #[error("Queue `{queue}` conflicts with another queue{}: {message}", format_context(.context))]
    QueueConflict { queue: String, message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Queue `{queue}` is misconfigured{}: {message}", format_context(.context))]
    InvalidQueue { queue: String, message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<ContactCenterError> for ModuleError {
    fn from(err: ContactCenterError) -> Self {
        Self::Config { message: err.to_string().into(), context: Some("contactcenter".into()) }
    }
}
