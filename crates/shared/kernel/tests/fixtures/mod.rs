use async_trait::async_trait;
use parking_lot::Mutex;
use pbx_domain::ModuleError;
use pbx_domain::dialplan::{DialplanContributions, DialplanRequest};
use pbx_domain::events::EventEnvelope;
use pbx_domain::module::{BootContext, Module};
use pbx_domain::permissions::{PermissionSet, permission_set};
use std::sync::Arc;
use std::time::Duration;

/// Ordered log of hook invocations, shared by every module in a test.
#[derive(Debug, Default, Clone)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| *e == entry).count()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub enum Behavior {
    #[default]
    Succeed,
    Fail,
    Panic,
    Hang,
}

#[derive(Debug, Default)]
pub struct TestModule {
    name: String,
    fragments: Vec<(i32, String)>,
    events: Vec<String>,
    permissions: Vec<&'static str>,
    requires: Option<String>,
    fail_register: bool,
    fail_boot: bool,
    dialplan: Behavior,
    handler: Behavior,
    journal: Journal,
}

impl TestModule {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self { name: name.to_owned(), journal: journal.clone(), ..Self::default() }
    }

    /// Adds a fragment whose text is `<name:priority/>`.
    pub fn fragment(mut self, priority: i32) -> Self {
        let xml = format!("<{}:{priority}/>", self.name);
        self.fragments.push((priority, xml));
        self
    }

    pub fn subscribe(mut self, event_type: &str) -> Self {
        self.events.push(event_type.to_owned());
        self
    }

    pub fn permissions(mut self, tokens: &[&'static str]) -> Self {
        self.permissions.extend_from_slice(tokens);
        self
    }

    pub fn requires(mut self, peer: &str) -> Self {
        self.requires = Some(peer.to_owned());
        self
    }

    pub const fn failing_register(mut self) -> Self {
        self.fail_register = true;
        self
    }

    pub const fn failing_boot(mut self) -> Self {
        self.fail_boot = true;
        self
    }

    pub const fn dialplan(mut self, behavior: Behavior) -> Self {
        self.dialplan = behavior;
        self
    }

    pub const fn handler(mut self, behavior: Behavior) -> Self {
        self.handler = behavior;
        self
    }

    pub fn boxed(self) -> Box<dyn Module> {
        Box::new(self)
    }

    fn fail(&self, hook: &str) -> ModuleError {
        ModuleError::Internal { message: format!("{} refused {hook}", self.name).into(), context: None }
    }
}

#[async_trait]
impl Module for TestModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "kernel test module"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn register(&mut self) -> Result<(), ModuleError> {
        self.journal.push(format!("register:{}", self.name));
        if self.fail_register { Err(self.fail("register")) } else { Ok(()) }
    }

    async fn boot(&self, peers: &BootContext) -> Result<(), ModuleError> {
        self.journal.push(format!("boot:{}", self.name));
        if let Some(peer) = &self.requires {
            peers.require(peer)?;
        }
        if self.fail_boot { Err(self.fail("boot")) } else { Ok(()) }
    }

    async fn dialplan_contributions(
        &self,
        _request: &DialplanRequest,
    ) -> Result<DialplanContributions, ModuleError> {
        match self.dialplan {
            Behavior::Succeed => Ok(self.fragments.iter().cloned().collect()),
            Behavior::Fail => Err(self.fail("dialplan")),
            Behavior::Panic => panic!("dialplan exploded"),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(DialplanContributions::new())
            },
        }
    }

    fn subscribed_events(&self) -> Vec<String> {
        self.events.clone()
    }

    async fn handle_event(&self, event: &EventEnvelope) -> Result<(), ModuleError> {
        match self.handler {
            Behavior::Succeed => {
                let payload = serde_json::to_string(&event.payload).unwrap_or_default();
                self.journal.push(format!("event:{}:{}:{payload}", self.name, event.event_type));
                Ok(())
            },
            Behavior::Fail => Err(self.fail("event")),
            Behavior::Panic => panic!("handler exploded"),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            },
        }
    }

    fn permissions(&self) -> PermissionSet {
        permission_set(self.permissions.iter().copied())
    }
}
