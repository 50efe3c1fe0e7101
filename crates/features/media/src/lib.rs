//! Media policy: starts call recording for tenants that have it turned on.
//!
//! The recording fragment runs first (priority 10) and continues, so routing fragments from
//! other modules still apply.

use async_trait::async_trait;
use pbx_kernel::domain::ModuleError;
use pbx_kernel::domain::config::MediaConfig;
use pbx_kernel::domain::constants::MEDIA;
use pbx_kernel::domain::dialplan::{DialplanContributions, DialplanRequest, escape_attr};
use pbx_kernel::domain::module::Module;
use pbx_kernel::domain::permissions::{PermissionSet, permission_set};
use tracing::info;

pub const RECORDING_PRIORITY: i32 = 10;

const FORMATS: [&str; 2] = ["wav", "mp3"];

#[derive(Debug, Clone)]
pub struct Media {
    config: MediaConfig,
}

impl Media {
    #[must_use]
    pub const fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn records(&self, tenant: &str) -> bool {
        self.config.record_tenants.iter().any(|t| t == "*" || t == tenant)
    }
}

#[async_trait]
impl Module for Media {
    fn name(&self) -> &str {
        MEDIA
    }

    fn alias(&self) -> &str {
        "Media"
    }

    fn description(&self) -> &str {
        "Per-tenant call recording policy"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn register(&mut self) -> Result<(), ModuleError> {
        if !FORMATS.contains(&self.config.format.as_str()) {
            return Err(ModuleError::Config {
                message: format!("unsupported recording format `{}`", self.config.format).into(),
                context: Some("media.format".into()),
            });
        }
        if self.config.recordings_dir.is_empty() {
            return Err(ModuleError::Config {
                message: "recordings_dir must not be empty".into(),
                context: Some("media.recordings_dir".into()),
            });
        }
        info!(tenants = ?self.config.record_tenants, format = %self.config.format, "Recording policy loaded");
        Ok(())
    }

    async fn dialplan_contributions(
        &self,
        request: &DialplanRequest,
    ) -> Result<DialplanContributions, ModuleError> {
        let mut fragments = DialplanContributions::new();
        if !self.records(&request.tenant_domain) {
            return Ok(fragments);
        }

        let tenant = escape_attr(&request.tenant_domain);
        let path = escape_attr(&format!(
            "{}/{}/${{uuid}}.{}",
            self.config.recordings_dir.trim_end_matches('/'),
            request.tenant_domain,
            self.config.format
        ));
        fragments.insert(
            RECORDING_PRIORITY,
            format!(
                r#"<extension name="record_{tenant}" continue="true">
  <condition>
    <action application="set" data="RECORD_STEREO=true"/>
    <action application="record_session" data="{path}"/>
  </condition>
</extension>"#
            ),
        );
        Ok(fragments)
    }

    fn permissions(&self) -> PermissionSet {
        permission_set(["recording_view"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(tenants: &[&str]) -> Media {
        Media::new(MediaConfig {
            record_tenants: tenants.iter().map(|t| (*t).to_owned()).collect(),
            ..MediaConfig::default()
        })
    }

    #[tokio::test]
    async fn records_only_listed_tenants() {
        let module = media(&["acme.example"]);

        let recorded = module
            .dialplan_contributions(&DialplanRequest::new("acme.example", "100"))
            .await
            .unwrap();
        assert!(
            recorded[&RECORDING_PRIORITY]
                .contains("/var/lib/pbx/recordings/acme.example/${uuid}.wav")
        );

        let skipped = module
            .dialplan_contributions(&DialplanRequest::new("other.example", "100"))
            .await
            .unwrap();
        assert!(skipped.is_empty());
    }

    #[test]
    fn wildcard_records_everyone() {
        assert!(media(&["*"]).records("anyone.example"));
        assert!(!media(&[]).records("anyone.example"));
    }

    #[test]
    fn rejects_unknown_formats() {
        let mut module = media(&[]);
        module.config.format = "flac".to_owned();
        assert_eq!(module.register().unwrap_err().kind(), "Config");
    }
}
