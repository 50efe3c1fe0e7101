use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use pbx_kernel::domain::events::FieldChange;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub recorded_at: DateTime<Utc>,
    pub entity: String,
    pub id: String,
    pub tenant_domain: Option<String>,
    pub changes: Vec<FieldChange>,
}

/// Most recent entries, oldest evicted first once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    entries: Arc<Mutex<VecDeque<AuditEntry>>>,
    capacity: usize,
}

impl AuditTrail {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))), capacity }
    }

    pub(crate) fn push(&self, entry: AuditEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Entries oldest first, optionally restricted to one tenant.
    #[must_use]
    pub fn entries(&self, tenant: Option<&str>) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| tenant.is_none_or(|t| e.tenant_domain.as_deref() == Some(t)))
            .cloned()
            .collect()
    }

    /// History of one entity, oldest first.
    #[must_use]
    pub fn history(&self, entity: &str, id: &str) -> Vec<AuditEntry> {
        self.entries.lock().iter().filter(|e| e.entity == entity && e.id == id).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
