use std::borrow::Cow;

/// Failure raised by module code (`register`, `boot`, dialplan, event handlers).
#[pbx_derive::pbx_error]
pub enum ModuleError {
    /// The module's own configuration is unusable.
    #[error("Module configuration error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A peer module the module depends on is not registered.
    #[error("Missing module dependency{}: {message}", format_context(.context))]
    Dependency { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An event payload could not be decoded into its typed form.
    #[error("Invalid event payload{}: {source}", format_context(.context))]
    Payload { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal module error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
