//! Write-boundary change recording.
//!
//! Persistence code calls [`ChangeRecorder::record`] with the before and after image of an
//! entity. Changed top-level fields are published as one `entity.changed` event; modules that
//! care about changes subscribe to it like any other event.

use crate::registry::ModuleRegistry;
use pbx_domain::ModuleError;
use pbx_domain::events::{EntityChanged, FieldChange};
use pbx_event_bus::DispatchReport;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;

/// An entity whose writes are recorded.
pub trait Tracked: Serialize {
    /// Entity kind, e.g. `"extension"`.
    const ENTITY: &'static str;

    fn id(&self) -> String;

    fn tenant(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct ChangeRecorder {
    registry: ModuleRegistry,
}

impl ChangeRecorder {
    #[must_use]
    pub const fn new(registry: ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Publishes the difference between `old` and `new`.
    ///
    /// `old` is `None` for a newly created entity. Returns `None` without dispatching when no
    /// field changed.
    pub async fn record<T: Tracked>(
        &self,
        old: Option<&T>,
        new: &T,
    ) -> Result<Option<DispatchReport>, ModuleError> {
        let changes = diff(old, new)?;
        if changes.is_empty() {
            trace!(entity = T::ENTITY, id = %new.id(), "No field changed, nothing recorded");
            return Ok(None);
        }

        let event = EntityChanged {
            entity: T::ENTITY.to_owned(),
            id: new.id(),
            tenant_domain: new.tenant().map(ToOwned::to_owned),
            changes,
        };
        self.registry.dispatch(&event).await.map(Some)
    }
}

/// Top-level fields that differ between `old` and `new`, sorted by field name.
///
/// A field present on only one side is reported against `null` on the other.
pub fn diff<T: Serialize>(old: Option<&T>, new: &T) -> Result<Vec<FieldChange>, ModuleError> {
    let old = match old {
        Some(value) => as_object::<T>(serde_json::to_value(value)?)?,
        None => Map::new(),
    };
    let new = as_object::<T>(serde_json::to_value(new)?)?;

    let mut fields: Vec<&String> = old.keys().chain(new.keys()).collect();
    fields.sort_unstable();
    fields.dedup();

    Ok(fields
        .into_iter()
        .filter_map(|field| {
            let before = old.get(field).unwrap_or(&Value::Null);
            let after = new.get(field).unwrap_or(&Value::Null);
            (before != after).then(|| FieldChange {
                field: field.clone(),
                old: before.clone(),
                new: after.clone(),
            })
        })
        .collect())
}

fn as_object<T>(value: Value) -> Result<Map<String, Value>, ModuleError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ModuleError::Internal {
            message: format!("`{}` must serialize to an object, got {other}", std::any::type_name::<T>())
                .into(),
            context: Some("change recording".into()),
        }),
    }
}
