use pbx_callrouting::CallRouting;
use pbx_contactcenter::{AgentStats, ContactCenter};
use pbx_kernel::domain::config::{CallRoutingConfig, ContactCenterConfig, QueueConfig};
use pbx_kernel::domain::dialplan::DialplanRequest;
use pbx_kernel::domain::events::CallHangup;
use pbx_kernel::{ModuleRegistry, RegistryError};

fn config() -> ContactCenterConfig {
    ContactCenterConfig {
        queues: vec![QueueConfig { name: "support".to_owned(), extension: "5000".to_owned(), tenant: None }],
    }
}

fn hangup(agent: Option<&str>, answered: bool, billsec: u64) -> CallHangup {
    hangup_at("acme.example", agent, answered, billsec)
}

fn hangup_at(tenant: &str, agent: Option<&str>, answered: bool, billsec: u64) -> CallHangup {
    CallHangup {
        call_id: "c-1".to_owned(),
        tenant_domain: tenant.to_owned(),
        caller: "+15550001".to_owned(),
        destination: "5000".to_owned(),
        hangup_cause: "NORMAL_CLEARING".to_owned(),
        answered,
        billsec,
        queue: Some("support".to_owned()),
        agent: agent.map(ToOwned::to_owned),
    }
}

#[tokio::test]
async fn queue_fragment_precedes_extension_routing() {
    let mut builder = ModuleRegistry::builder();
    builder.register(Box::new(CallRouting::new(CallRoutingConfig::default()))).unwrap();
    builder.register(Box::new(ContactCenter::new(&config()))).unwrap();
    let registry = builder.boot_all().await.unwrap();

    let dialplan = registry.dialplan(DialplanRequest::new("acme.example", "5000")).await;

    let owners: Vec<_> = dialplan.fragments.iter().map(|f| (f.priority, f.module_name.as_str())).collect();
    assert_eq!(owners, vec![(50, "contactcenter"), (100, "callrouting"), (190, "callrouting")]);
}

#[tokio::test]
async fn boot_requires_call_routing() {
    let mut builder = ModuleRegistry::builder();
    builder.register(Box::new(ContactCenter::new(&config()))).unwrap();

    let err = builder.boot_all().await.unwrap_err();
    assert!(matches!(err, RegistryError::ModuleBootFailure { ref module, .. } if module == "contactcenter"));
}

#[tokio::test]
async fn hangups_update_agent_statistics() {
    let center = ContactCenter::new(&config());
    let board = center.board();

    let mut builder = ModuleRegistry::builder();
    builder.register(Box::new(CallRouting::new(CallRoutingConfig::default()))).unwrap();
    builder.register(Box::new(center)).unwrap();
    let registry = builder.boot_all().await.unwrap();

    registry.dispatch(&hangup(Some("agent-7"), true, 120)).await.unwrap();
    registry.dispatch(&hangup(Some("agent-7"), false, 0)).await.unwrap();
    let report = registry.dispatch(&hangup(None, true, 30)).await.unwrap();
    assert!(report.is_clean());

    assert_eq!(
        board.get("acme.example", "agent-7"),
        Some(AgentStats { answered: 1, missed: 1, talk_secs: 120 })
    );
    assert_eq!(board.snapshot("acme.example").len(), 1);

    registry.set_enabled("contactcenter", false).unwrap();
    registry.dispatch(&hangup(Some("agent-7"), true, 60)).await.unwrap();
    assert_eq!(board.get("acme.example", "agent-7").map(|s| s.answered), Some(1));
}

#[tokio::test]
async fn same_agent_name_in_two_tenants_keeps_separate_statistics() {
    let center = ContactCenter::new(&config());
    let board = center.board();

    let mut builder = ModuleRegistry::builder();
    builder.register(Box::new(CallRouting::new(CallRoutingConfig::default()))).unwrap();
    builder.register(Box::new(center)).unwrap();
    let registry = builder.boot_all().await.unwrap();

    registry.dispatch(&hangup_at("acme.example", Some("agent-7"), true, 10)).await.unwrap();
    registry.dispatch(&hangup_at("globex.example", Some("agent-7"), true, 999)).await.unwrap();

    assert_eq!(
        board.get("acme.example", "agent-7"),
        Some(AgentStats { answered: 1, missed: 0, talk_secs: 10 })
    );
    assert_eq!(
        board.get("globex.example", "agent-7"),
        Some(AgentStats { answered: 1, missed: 0, talk_secs: 999 })
    );
    assert_eq!(board.snapshot("globex.example"), vec![("agent-7".to_owned(), AgentStats {
        answered: 1,
        missed: 0,
        talk_secs: 999
    })]);
}
