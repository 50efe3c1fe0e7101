//! Contact-center queues.
//!
//! Dialing a queue's extension parks the caller in that queue (priority 50, ahead of plain
//! extension routing). Hangups carrying an agent update the [`AgentBoard`].

mod board;
mod error;

pub use crate::board::{AgentBoard, AgentStats};
pub use crate::error::{ContactCenterError, ContactCenterErrorExt};

use async_trait::async_trait;
use fxhash::FxHashSet;
use pbx_kernel::domain::ModuleError;
use pbx_kernel::domain::config::{ContactCenterConfig, QueueConfig};
use pbx_kernel::domain::constants::{CALL_HANGUP, CALL_ROUTING, CONTACT_CENTER};
use pbx_kernel::domain::dialplan::{DialplanContributions, DialplanRequest, escape_attr, exact_expression};
use pbx_kernel::domain::events::{CallHangup, EventEnvelope};
use pbx_kernel::domain::module::{BootContext, Module};
use pbx_kernel::domain::permissions::{PermissionSet, permission_set};
use tracing::{debug, info};

pub const QUEUE_PRIORITY: i32 = 50;

#[derive(Debug)]
pub struct ContactCenter {
    queues: Vec<QueueConfig>,
    board: AgentBoard,
}

impl ContactCenter {
    #[must_use]
    pub fn new(config: &ContactCenterConfig) -> Self {
        Self { queues: config.queues.clone(), board: AgentBoard::default() }
    }

    /// Handle to the live agent statistics.
    #[must_use]
    pub fn board(&self) -> AgentBoard {
        self.board.clone()
    }

    /// The queue answering `destination` for `tenant`. Tenant-specific queues win over shared ones.
    #[must_use]
    pub fn queue_for(&self, tenant: &str, destination: &str) -> Option<&QueueConfig> {
        let mut shared = None;
        for queue in self.queues.iter().filter(|q| q.extension == destination) {
            match queue.tenant.as_deref() {
                Some(t) if t == tenant => return Some(queue),
                Some(_) => {},
                None => {
                    shared.get_or_insert(queue);
                },
            }
        }
        shared
    }

    fn validate(&self) -> Result<(), ContactCenterError> {
        let mut names = FxHashSet::default();
        let mut extensions = FxHashSet::default();

        for queue in &self.queues {
            if queue.name.is_empty() || queue.extension.is_empty() {
                return Err(ContactCenterError::InvalidQueue {
                    queue: queue.name.clone(),
                    message: "name and extension are required".into(),
                    context: None,
                });
            }
            if !names.insert(queue.name.as_str()) {
                return Err(ContactCenterError::QueueConflict {
                    queue: queue.name.clone(),
                    message: "duplicate name".into(),
                    context: None,
                });
            }
            if !extensions.insert((queue.tenant.as_deref(), queue.extension.as_str())) {
                return Err(ContactCenterError::QueueConflict {
                    queue: queue.name.clone(),
                    message: format!("extension {} is already taken", queue.extension).into(),
                    context: None,
                });
            }
        }
        Ok(())
    }
}

fn queue_fragment(queue: &QueueConfig, tenant: &str, destination: &str) -> String {
    let expression = escape_attr(&exact_expression(destination));
    let target = escape_attr(&format!("{}@{tenant}", queue.name));
    let name = escape_attr(&queue.name);
    format!(
        r#"<extension name="queue_{name}">
  <condition field="destination_number" expression="{expression}">
    <action application="answer"/>
    <action application="set" data="cc_export_vars=cc_queue"/>
    <action application="callcenter" data="{target}"/>
  </condition>
</extension>"#
    )
}

#[async_trait]
impl Module for ContactCenter {
    fn name(&self) -> &str {
        CONTACT_CENTER
    }

    fn alias(&self) -> &str {
        "Contact Center"
    }

    fn description(&self) -> &str {
        "Call queues and agent statistics"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn register(&mut self) -> Result<(), ModuleError> {
        self.validate()?;
        Ok(())
    }

    async fn boot(&self, peers: &BootContext) -> Result<(), ModuleError> {
        // Callers that leave a queue unanswered fall through to extension routing.
        peers.require(CALL_ROUTING)?;
        info!(queues = self.queues.len(), "Contact center ready");
        Ok(())
    }

    async fn dialplan_contributions(
        &self,
        request: &DialplanRequest,
    ) -> Result<DialplanContributions, ModuleError> {
        let mut fragments = DialplanContributions::new();
        if let Some(queue) = self.queue_for(&request.tenant_domain, &request.destination) {
            fragments.insert(
                QUEUE_PRIORITY,
                queue_fragment(queue, &request.tenant_domain, &request.destination),
            );
        }
        Ok(fragments)
    }

    fn subscribed_events(&self) -> Vec<String> {
        vec![CALL_HANGUP.to_owned()]
    }

    async fn handle_event(&self, event: &EventEnvelope) -> Result<(), ModuleError> {
        let hangup: CallHangup = event.decode()?;
        let Some(agent) = hangup.agent.as_deref() else {
            return Ok(());
        };

        self.board.record(&hangup.tenant_domain, agent, hangup.answered, hangup.billsec);
        debug!(
            tenant = %hangup.tenant_domain,
            agent,
            queue = hangup.queue.as_deref().unwrap_or("-"),
            answered = hangup.answered,
            "Agent wrap-up recorded"
        );
        Ok(())
    }

    fn permissions(&self) -> PermissionSet {
        permission_set(["queue_view", "queue_manage", "agent_status"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(name: &str, extension: &str, tenant: Option<&str>) -> QueueConfig {
        QueueConfig {
            name: name.to_owned(),
            extension: extension.to_owned(),
            tenant: tenant.map(ToOwned::to_owned),
        }
    }

    fn center(queues: Vec<QueueConfig>) -> ContactCenter {
        ContactCenter::new(&ContactCenterConfig { queues })
    }

    #[test]
    fn tenant_queues_shadow_shared_ones() {
        let cc = center(vec![
            queue("support", "5000", None),
            queue("acme_support", "5000", Some("acme.example")),
        ]);

        assert_eq!(cc.queue_for("acme.example", "5000").unwrap().name, "acme_support");
        assert_eq!(cc.queue_for("other.example", "5000").unwrap().name, "support");
        assert!(cc.queue_for("acme.example", "5001").is_none());
    }

    #[test]
    fn conflicting_queues_are_rejected() {
        let mut same_name = center(vec![queue("a", "5000", None), queue("a", "5001", None)]);
        assert!(same_name.register().is_err());

        let mut same_ext = center(vec![queue("a", "5000", None), queue("b", "5000", None)]);
        assert!(same_ext.register().is_err());

        let mut scoped = center(vec![queue("a", "5000", None), queue("b", "5000", Some("t1"))]);
        assert!(scoped.register().is_ok());
    }

    #[tokio::test]
    async fn queue_extension_gets_a_callcenter_fragment() {
        let cc = center(vec![queue("sales", "6000", None)]);
        let fragments =
            cc.dialplan_contributions(&DialplanRequest::new("t1.example", "6000")).await.unwrap();

        assert!(fragments[&QUEUE_PRIORITY].contains(r#"data="sales@t1.example""#));
        assert!(
            cc.dialplan_contributions(&DialplanRequest::new("t1.example", "100"))
                .await
                .unwrap()
                .is_empty()
        );
    }
}
