use async_trait::async_trait;
use parking_lot::Mutex;
use pbx_domain::ModuleError;
use pbx_domain::events::{EventEnvelope, Payload};
use pbx_domain::module::Module;
use pbx_domain::registry::ModuleHandle;
use std::sync::Arc;
use std::time::Duration;

/// Shared record of (module, envelope) deliveries, in the order they happened.
pub type Journal = Arc<Mutex<Vec<(String, EventEnvelope)>>>;

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
    Hang,
}

#[derive(Debug)]
pub struct Subscriber {
    pub name: String,
    pub events: Vec<String>,
    pub behavior: Behavior,
    pub journal: Journal,
}

#[async_trait]
impl Module for Subscriber {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "event bus test subscriber"
    }

    fn version(&self) -> &str {
        "0.0.1"
    }

    fn subscribed_events(&self) -> Vec<String> {
        self.events.clone()
    }

    async fn handle_event(&self, event: &EventEnvelope) -> Result<(), ModuleError> {
        match self.behavior {
            Behavior::Succeed => {
                self.journal.lock().push((self.name.clone(), event.clone()));
                Ok(())
            },
            Behavior::Fail => Err(ModuleError::Internal {
                message: "subscriber refused the event".into(),
                context: None,
            }),
            Behavior::Panic => panic!("subscriber exploded"),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                self.journal.lock().push((self.name.clone(), event.clone()));
                Ok(())
            },
        }
    }
}

/// Disables another subscriber while handling an event.
#[derive(Debug)]
pub struct Switch {
    pub events: Vec<String>,
    pub target: Arc<Mutex<Option<ModuleHandle>>>,
}

#[async_trait]
impl Module for Switch {
    fn name(&self) -> &str {
        "switch"
    }

    fn description(&self) -> &str {
        "disables its target on every event"
    }

    fn version(&self) -> &str {
        "0.0.1"
    }

    fn subscribed_events(&self) -> Vec<String> {
        self.events.clone()
    }

    async fn handle_event(&self, _event: &EventEnvelope) -> Result<(), ModuleError> {
        if let Some(target) = self.target.lock().as_ref() {
            target.set_enabled(false);
        }
        Ok(())
    }
}

/// A `switch` handle plus the slot its target goes into.
pub fn switch(order: u32, events: &[&str]) -> (ModuleHandle, Arc<Mutex<Option<ModuleHandle>>>) {
    let target = Arc::new(Mutex::new(None));
    let module = Switch {
        events: events.iter().map(|e| (*e).to_owned()).collect(),
        target: Arc::clone(&target),
    };
    (ModuleHandle::new(Box::new(module), order, true), target)
}

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn subscriber(
    name: &str,
    order: u32,
    events: &[&str],
    behavior: Behavior,
    journal: &Journal,
) -> ModuleHandle {
    let module = Subscriber {
        name: name.to_owned(),
        events: events.iter().map(|e| (*e).to_owned()).collect(),
        behavior,
        journal: Arc::clone(journal),
    };
    ModuleHandle::new(Box::new(module), order, true)
}

pub fn envelope(event_type: &str) -> EventEnvelope {
    let mut payload = Payload::new();
    payload.insert("call_id".to_owned(), serde_json::json!("c-42"));
    EventEnvelope::new(event_type, payload).with_tenant("t1.example")
}

pub fn delivered_to(journal: &Journal) -> Vec<String> {
    journal.lock().iter().map(|(name, _)| name.clone()).collect()
}
