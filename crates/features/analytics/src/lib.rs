//! Analytics: counts calls and recordings per tenant.

use async_trait::async_trait;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use pbx_kernel::domain::ModuleError;
use pbx_kernel::domain::constants::{ANALYTICS, CALL_HANGUP, RECORDING_COMPLETED};
use pbx_kernel::domain::events::{CallHangup, EventEnvelope, RecordingCompleted};
use pbx_kernel::domain::module::Module;
use pbx_kernel::domain::permissions::{PermissionSet, permission_set};
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

/// Counters for one tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantStats {
    pub calls: u64,
    pub answered: u64,
    pub billsec: u64,
    pub recordings: u64,
    pub recorded_secs: u64,
}

impl TenantStats {
    /// Share of calls that were answered, `None` before the first call.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn answer_rate(&self) -> Option<f64> {
        (self.calls > 0).then(|| self.answered as f64 / self.calls as f64)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallStats {
    tenants: Arc<Mutex<FxHashMap<String, TenantStats>>>,
}

impl CallStats {
    #[must_use]
    pub fn tenant(&self, tenant: &str) -> TenantStats {
        self.tenants.lock().get(tenant).copied().unwrap_or_default()
    }

    fn update(&self, tenant: &str, apply: impl FnOnce(&mut TenantStats)) {
        let mut tenants = self.tenants.lock();
        apply(tenants.entry(tenant.to_owned()).or_default());
    }
}

#[derive(Debug, Default)]
pub struct Analytics {
    stats: CallStats,
}

impl Analytics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stats(&self) -> CallStats {
        self.stats.clone()
    }
}

#[async_trait]
impl Module for Analytics {
    fn name(&self) -> &str {
        ANALYTICS
    }

    fn alias(&self) -> &str {
        "Analytics"
    }

    fn description(&self) -> &str {
        "Call and recording counters per tenant"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn subscribed_events(&self) -> Vec<String> {
        vec![CALL_HANGUP.to_owned(), RECORDING_COMPLETED.to_owned()]
    }

    async fn handle_event(&self, event: &EventEnvelope) -> Result<(), ModuleError> {
        if event.is::<CallHangup>() {
            let hangup: CallHangup = event.decode()?;
            self.stats.update(&hangup.tenant_domain, |s| {
                s.calls = s.calls.saturating_add(1);
                if hangup.answered {
                    s.answered = s.answered.saturating_add(1);
                    s.billsec = s.billsec.saturating_add(hangup.billsec);
                }
            });
        } else if event.is::<RecordingCompleted>() {
            let recording: RecordingCompleted = event.decode()?;
            self.stats.update(&recording.tenant_domain, |s| {
                s.recordings = s.recordings.saturating_add(1);
                s.recorded_secs = s.recorded_secs.saturating_add(recording.duration_secs);
            });
        }
        trace!(event_type = %event.event_type, "Counters updated");
        Ok(())
    }

    fn permissions(&self) -> PermissionSet {
        permission_set(["analytics_view"])
    }
}
