//! Domain events and their envelope.
//!
//! Producers hand the runtime an [`EventEnvelope`]: an event type plus an opaque JSON
//! object. Typed events implement [`DomainEvent`] so both sides of a subscription agree on
//! the payload shape without the runtime knowing about it.

use crate::constants::{CALL_HANGUP, DEVICE_REGISTERED, ENTITY_CHANGED, RECORDING_COMPLETED};
use crate::error::{ModuleError, ModuleErrorExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event payload: string keys (unique by construction) to arbitrary JSON values.
pub type Payload = Map<String, Value>;

/// A dispatched domain event. Shared immutably between subscribers once dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event_type: String,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl EventEnvelope {
    pub fn new(event_type: impl Into<String>, payload: Payload) -> Self {
        Self { event_type: event_type.into(), payload, tenant_id: None }
    }

    #[must_use]
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Wraps a typed event. The tenant is taken from [`DomainEvent::tenant`].
    pub fn from_event<E: DomainEvent>(event: &E) -> Result<Self, ModuleError> {
        let payload = match serde_json::to_value(event)? {
            Value::Object(map) => map,
            other => {
                return Err(ModuleError::Internal {
                    message: format!("event payload must be an object, got {other}").into(),
                    context: Some(E::EVENT_TYPE.into()),
                });
            },
        };

        Ok(Self {
            event_type: E::EVENT_TYPE.to_owned(),
            payload,
            tenant_id: event.tenant().map(ToOwned::to_owned),
        })
    }

    /// Decodes the payload as `E`, checking the event type first.
    pub fn decode<E: DomainEvent>(&self) -> Result<E, ModuleError> {
        if self.event_type != E::EVENT_TYPE {
            return Err(ModuleError::Internal {
                message: format!("expected `{}`, got `{}`", E::EVENT_TYPE, self.event_type).into(),
                context: None,
            });
        }
        let value = Value::Object(self.payload.clone());
        serde_json::from_value(value).context(E::EVENT_TYPE)
    }

    #[must_use]
    pub fn is<E: DomainEvent>(&self) -> bool {
        self.event_type == E::EVENT_TYPE
    }
}

/// A typed domain event with a fixed event-type name.
pub trait DomainEvent: Serialize + DeserializeOwned {
    const EVENT_TYPE: &'static str;

    /// Tenant the event belongs to, if any.
    fn tenant(&self) -> Option<&str> {
        None
    }
}

/// A phone or softphone (re-)registered with the switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegistered {
    pub tenant_domain: String,
    pub user: String,
    pub contact: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub expires_secs: u32,
}

impl DomainEvent for DeviceRegistered {
    const EVENT_TYPE: &'static str = DEVICE_REGISTERED;

    fn tenant(&self) -> Option<&str> {
        Some(&self.tenant_domain)
    }
}

/// A call leg ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallHangup {
    pub call_id: String,
    pub tenant_domain: String,
    pub caller: String,
    pub destination: String,
    pub hangup_cause: String,
    #[serde(default)]
    pub answered: bool,
    #[serde(default)]
    pub billsec: u64,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
}

impl DomainEvent for CallHangup {
    const EVENT_TYPE: &'static str = CALL_HANGUP;

    fn tenant(&self) -> Option<&str> {
        Some(&self.tenant_domain)
    }
}

/// A call recording was finalized on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingCompleted {
    pub call_id: String,
    pub tenant_domain: String,
    pub path: String,
    #[serde(default)]
    pub duration_secs: u64,
}

impl DomainEvent for RecordingCompleted {
    const EVENT_TYPE: &'static str = RECORDING_COMPLETED;

    fn tenant(&self) -> Option<&str> {
        Some(&self.tenant_domain)
    }
}

/// One field's old and new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: Value,
    pub new: Value,
}

/// An entity was written at its write boundary. Replaces implicit "on save" hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityChanged {
    pub entity: String,
    pub id: String,
    #[serde(default)]
    pub tenant_domain: Option<String>,
    pub changes: Vec<FieldChange>,
}

impl DomainEvent for EntityChanged {
    const EVENT_TYPE: &'static str = ENTITY_CHANGED;

    fn tenant(&self) -> Option<&str> {
        self.tenant_domain.as_deref()
    }
}
