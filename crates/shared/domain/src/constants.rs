//! Well-known identifiers shared between modules and event producers.

// Event types
pub const DEVICE_REGISTERED: &str = "device.registered";
pub const CALL_HANGUP: &str = "call.hangup";
pub const RECORDING_COMPLETED: &str = "recording.completed";
pub const ENTITY_CHANGED: &str = "entity.changed";

// Module names
pub const CALL_ROUTING: &str = "callrouting";
pub const CONTACT_CENTER: &str = "contactcenter";
pub const PROVISIONING: &str = "provisioning";
pub const ANALYTICS: &str = "analytics";
pub const MEDIA: &str = "media";
pub const AUDIT: &str = "audit";
