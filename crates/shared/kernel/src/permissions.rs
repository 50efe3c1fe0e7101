//! Permission aggregation over the enabled module set.

use pbx_domain::permissions::PermissionSet;
use pbx_domain::registry::ModuleHandle;

/// Union of the tokens contributed by every currently enabled module.
///
/// Recomputed on each call; a module toggled since the last call is reflected immediately.
#[must_use]
pub fn aggregate(modules: &[ModuleHandle]) -> PermissionSet {
    modules
        .iter()
        .filter(|m| m.is_enabled())
        .flat_map(|m| m.module().permissions())
        .collect()
}

/// Each enabled module's own tokens, in registration order.
#[must_use]
pub fn by_module(modules: &[ModuleHandle]) -> Vec<(String, PermissionSet)> {
    modules
        .iter()
        .filter(|m| m.is_enabled())
        .map(|m| (m.name().to_owned(), m.module().permissions()))
        .collect()
}
