//! Permission tokens contributed by enabled modules.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// Opaque capability token. The runtime only collects them; authorization lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionToken(String);

impl PermissionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PermissionToken {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

impl From<String> for PermissionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl Borrow<str> for PermissionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deduplicated, ordered token set.
pub type PermissionSet = BTreeSet<PermissionToken>;

/// Builds a [`PermissionSet`] from string literals.
pub fn permission_set<'a>(tokens: impl IntoIterator<Item = &'a str>) -> PermissionSet {
    tokens.into_iter().map(PermissionToken::from).collect()
}
