//! Dialplan lookup keys and fragments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A module's routing slices for one request, keyed by priority (lower evaluates first).
pub type DialplanContributions = BTreeMap<i32, String>;

/// Lookup key for dialplan composition. Carries no identity beyond its values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialplanRequest {
    pub tenant_domain: String,
    pub destination: String,
}

impl DialplanRequest {
    pub fn new(tenant_domain: impl Into<String>, destination: impl Into<String>) -> Self {
        Self { tenant_domain: tenant_domain.into(), destination: destination.into() }
    }
}

impl fmt::Display for DialplanRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.destination, self.tenant_domain)
    }
}

/// One contributed fragment, as placed in a composed dialplan.
///
/// `xml` is opaque: the runtime orders fragments but never parses or rewrites them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialplanFragment {
    pub priority: i32,
    pub module_name: String,
    pub xml: String,
}

/// Escapes a value for use inside an XML attribute.
///
/// Modules build their fragments from tenant and destination strings supplied by callers,
/// so anything interpolated into an attribute goes through here first.
#[must_use]
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Anchored regular expression matching exactly `value`, for `<condition expression="...">`.
#[must_use]
pub fn exact_expression(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('^');
    for ch in value.chars() {
        if "\\.+*?()|[]{}^$".contains(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('$');
    out
}
