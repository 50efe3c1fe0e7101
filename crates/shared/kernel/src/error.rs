use pbx_domain::ModuleError;
use std::borrow::Cow;

/// Registry failures. Register and boot failures are fatal to startup.
#[pbx_derive::pbx_error]
pub enum RegistryError {
    /// The name is taken; the registry is unchanged.
    #[error("Module `{name}` is already registered{}", format_context(.context))]
    DuplicateModuleName { name: String, context: Option<Cow<'static, str>> },

    #[error("Module `{name}` is not registered{}", format_context(.context))]
    ModuleNotFound { name: String, context: Option<Cow<'static, str>> },

    /// `Module::register` failed; the module was not added.
    #[error("Module `{module}` failed to register{}: {source}", format_context(.context))]
    ModuleRegisterFailure { module: String, source: ModuleError, context: Option<Cow<'static, str>> },

    /// `Module::boot` failed; startup is aborted.
    #[error("Module `{module}` failed to boot{}: {source}", format_context(.context))]
    ModuleBootFailure { module: String, source: ModuleError, context: Option<Cow<'static, str>> },
}

impl RegistryError {
    pub(crate) fn not_found(name: &str) -> Self {
        Self::ModuleNotFound { name: name.to_owned(), context: None }
    }
}
