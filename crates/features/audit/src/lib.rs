//! Audit: keeps a bounded in-memory trail of `entity.changed` events.
//!
//! Changes are published at the write boundary (see `pbx_kernel::audit::ChangeRecorder`);
//! this module only listens.

mod trail;

pub use crate::trail::{AuditEntry, AuditTrail};

use async_trait::async_trait;
use chrono::Utc;
use pbx_kernel::domain::ModuleError;
use pbx_kernel::domain::config::AuditConfig;
use pbx_kernel::domain::constants::{AUDIT, ENTITY_CHANGED};
use pbx_kernel::domain::events::{EntityChanged, EventEnvelope};
use pbx_kernel::domain::module::Module;
use pbx_kernel::domain::permissions::{PermissionSet, permission_set};
use tracing::debug;

#[derive(Debug)]
pub struct Audit {
    trail: AuditTrail,
}

impl Audit {
    #[must_use]
    pub fn new(config: &AuditConfig) -> Self {
        Self { trail: AuditTrail::new(config.max_entries) }
    }

    #[must_use]
    pub fn trail(&self) -> AuditTrail {
        self.trail.clone()
    }
}

#[async_trait]
impl Module for Audit {
    fn name(&self) -> &str {
        AUDIT
    }

    fn alias(&self) -> &str {
        "Audit Trail"
    }

    fn description(&self) -> &str {
        "Records entity changes"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn subscribed_events(&self) -> Vec<String> {
        vec![ENTITY_CHANGED.to_owned()]
    }

    async fn handle_event(&self, event: &EventEnvelope) -> Result<(), ModuleError> {
        let changed: EntityChanged = event.decode()?;
        debug!(entity = %changed.entity, id = %changed.id, fields = changed.changes.len(), "Change recorded");

        self.trail.push(AuditEntry {
            recorded_at: Utc::now(),
            entity: changed.entity,
            id: changed.id,
            tenant_domain: changed.tenant_domain,
            changes: changed.changes,
        });
        Ok(())
    }

    fn permissions(&self) -> PermissionSet {
        permission_set(["audit_trail_view"])
    }
}
