//! Call routing: local extensions, voicemail fallback and outbound calls through a gateway.
//!
//! | Priority | Fragment |
//! |---|---|
//! | 100 | bridge to the extension's registered devices |
//! | 190 | voicemail for the same extension |
//! | 800 | outbound bridge through the configured gateway |

mod error;
mod routes;

pub use crate::error::{CallRoutingError, CallRoutingErrorExt};
pub use crate::routes::Destination;

use async_trait::async_trait;
use pbx_kernel::domain::ModuleError;
use pbx_kernel::domain::config::CallRoutingConfig;
use pbx_kernel::domain::constants::CALL_ROUTING;
use pbx_kernel::domain::dialplan::{DialplanContributions, DialplanRequest};
use pbx_kernel::domain::module::Module;
use pbx_kernel::domain::permissions::{PermissionSet, permission_set};
use routes::{EXTENSION_PRIORITY, OUTBOUND_PRIORITY, VOICEMAIL_PRIORITY};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct CallRouting {
    config: CallRoutingConfig,
}

impl CallRouting {
    #[must_use]
    pub const fn new(config: CallRoutingConfig) -> Self {
        Self { config }
    }

    /// Classifies a dialed number against the configured extension range.
    #[must_use]
    pub fn classify(&self, destination: &str) -> Destination {
        let digits = destination.strip_prefix('+').unwrap_or(destination);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Destination::Unroutable;
        }

        let len = digits.len();
        let is_plain = digits.len() == destination.len();
        if is_plain && (self.config.min_extension_len..=self.config.max_extension_len).contains(&len) {
            Destination::Extension
        } else if len > self.config.max_extension_len && self.config.gateway.is_some() {
            Destination::Outbound
        } else {
            Destination::Unroutable
        }
    }

    fn validate(&self) -> Result<(), CallRoutingError> {
        let (min, max) = (self.config.min_extension_len, self.config.max_extension_len);
        if min == 0 || min > max {
            return Err(CallRoutingError::ExtensionRange { min, max, context: None });
        }

        if let Some(gateway) = &self.config.gateway
            && (gateway.is_empty() || gateway.contains(['/', ' ']))
        {
            return Err(CallRoutingError::Gateway {
                message: format!("`{gateway}` is not a usable gateway name").into(),
                context: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Module for CallRouting {
    fn name(&self) -> &str {
        CALL_ROUTING
    }

    fn alias(&self) -> &str {
        "Call Routing"
    }

    fn description(&self) -> &str {
        "Routes calls to extensions, voicemail and outbound gateways"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn register(&mut self) -> Result<(), ModuleError> {
        self.validate()?;
        info!(
            extensions = %format!("{}..={}", self.config.min_extension_len, self.config.max_extension_len),
            gateway = self.config.gateway.as_deref().unwrap_or("-"),
            "Call routing configured"
        );
        Ok(())
    }

    async fn dialplan_contributions(
        &self,
        request: &DialplanRequest,
    ) -> Result<DialplanContributions, ModuleError> {
        let mut fragments = DialplanContributions::new();
        let (tenant, destination) = (request.tenant_domain.as_str(), request.destination.as_str());

        match self.classify(destination) {
            Destination::Extension => {
                fragments.insert(
                    EXTENSION_PRIORITY,
                    routes::extension(tenant, destination, self.config.ring_timeout_secs),
                );
                fragments.insert(VOICEMAIL_PRIORITY, routes::voicemail(tenant, destination));
            },
            Destination::Outbound => {
                if let Some(gateway) = &self.config.gateway {
                    fragments.insert(OUTBOUND_PRIORITY, routes::outbound(gateway, destination));
                }
            },
            Destination::Unroutable => {
                debug!(%request, "No route for destination");
            },
        }

        Ok(fragments)
    }

    fn permissions(&self) -> PermissionSet {
        permission_set(["extension_view", "extension_edit", "gateway_view"])
    }
}
