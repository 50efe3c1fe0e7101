use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level process configuration (`pbx.toml` plus `PBX__*` overrides).
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PbxConfigInner {
    pub modules: ModulesConfig,
    pub log: LogConfig,
    pub callrouting: CallRoutingConfig,
    pub contactcenter: ContactCenterConfig,
    pub media: MediaConfig,
    pub audit: AuditConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into modules.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct PbxConfig {
    #[serde(flatten, default)]
    inner: Arc<PbxConfigInner>,
}

impl From<PbxConfigInner> for PbxConfig {
    fn from(inner: PbxConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Deref for PbxConfig {
    type Target = PbxConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PbxConfig {
    fn deref_mut(&mut self) -> &mut PbxConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Module runtime knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Upper bound for one `handle_event` invocation.
    pub handler_timeout_ms: u64,
    /// Upper bound for one module's dialplan contribution.
    pub dialplan_timeout_ms: u64,
    /// Modules registered but started in the disabled state.
    pub disabled: Vec<String>,
}

impl ModulesConfig {
    #[must_use]
    pub const fn handler_timeout(&self) -> Duration {
        Duration::from_millis(self.handler_timeout_ms)
    }

    #[must_use]
    pub const fn dialplan_timeout(&self) -> Duration {
        Duration::from_millis(self.dialplan_timeout_ms)
    }
}

/// Logging output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub directives: Option<String>,
    pub console: bool,
    pub file: Option<LogFileConfig>,
}

/// Rolling log file sink.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogFileConfig {
    pub dir: PathBuf,
    pub rotation: String,
    pub max_files: usize,
    pub json: bool,
}

/// Extension and outbound routing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CallRoutingConfig {
    pub min_extension_len: usize,
    pub max_extension_len: usize,
    pub ring_timeout_secs: u32,
    /// Gateway used for numbers longer than an extension; outbound routing is off without one.
    pub gateway: Option<String>,
}

/// Contact-center queues.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactCenterConfig {
    pub queues: Vec<QueueConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    pub name: String,
    pub extension: String,
    /// Restricts the queue to one tenant; shared by all tenants when absent.
    #[serde(default)]
    pub tenant: Option<String>,
}

/// Media policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Tenants whose calls are recorded. `"*"` records everyone.
    pub record_tenants: Vec<String>,
    pub recordings_dir: String,
    pub format: String,
}

/// Change-trail retention.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub max_entries: usize,
}

// --- Default ---

impl Default for ModulesConfig {
    fn default() -> Self {
        Self { handler_timeout_ms: 2_000, dialplan_timeout_ms: 500, disabled: Vec::new() }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), directives: None, console: true, file: None }
    }
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("logs"), rotation: "daily".to_owned(), max_files: 10, json: false }
    }
}

impl Default for CallRoutingConfig {
    fn default() -> Self {
        Self { min_extension_len: 2, max_extension_len: 5, ring_timeout_secs: 30, gateway: None }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            record_tenants: Vec::new(),
            recordings_dir: "/var/lib/pbx/recordings".to_owned(),
            format: "wav".to_owned(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { max_entries: 1_000 }
    }
}
