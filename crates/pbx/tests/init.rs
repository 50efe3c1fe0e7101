use pbx::domain::config::{PbxConfig, QueueConfig};
use pbx::kernel::RegistryError;

#[tokio::test]
async fn full_build_boots_every_module() {
    let registry = pbx::init(&PbxConfig::default()).await.expect("init");

    let names: Vec<_> = registry.list().into_iter().map(|d| d.name).collect();
    assert_eq!(names, pbx::features::ENABLED);
    assert!(registry.list().iter().all(|d| d.enabled));

    let tokens = registry.aggregate_permissions();
    assert!(tokens.contains("extension_view"));
    assert!(tokens.contains("audit_trail_view"));
    assert_eq!(
        tokens.iter().filter(|t| t.as_str() == "extension_view").count(),
        1,
        "shared tokens are reported once"
    );
}

#[tokio::test]
async fn disabled_modules_come_from_configuration() {
    let mut config = PbxConfig::default();
    config.modules.disabled = vec!["contactcenter".to_owned()];
    config.contactcenter.queues =
        vec![QueueConfig { name: "support".to_owned(), extension: "5000".to_owned(), tenant: None }];

    let registry = pbx::init(&config).await.expect("init");
    assert!(!registry.get("contactcenter").unwrap().enabled);

    let owners: Vec<_> = registry
        .dialplan(pbx::domain::dialplan::DialplanRequest::new("t1", "5000"))
        .await
        .fragments
        .into_iter()
        .map(|f| f.module_name)
        .collect();
    assert_eq!(owners, vec!["callrouting", "callrouting"]);

    registry.set_enabled("contactcenter", true).unwrap();
    let xml = registry.compose_dialplan("t1", "5000").await;
    assert!(xml[0].contains("callcenter"));
}

#[tokio::test]
async fn unknown_disabled_module_is_rejected() {
    let mut config = PbxConfig::default();
    config.modules.disabled = vec!["fax".to_owned()];

    let err = pbx::init(&config).await.unwrap_err();
    assert!(matches!(err, RegistryError::ModuleNotFound { ref name, .. } if name == "fax"));
}

#[tokio::test]
async fn recording_policy_runs_first() {
    let mut config = PbxConfig::default();
    config.media.record_tenants = vec!["*".to_owned()];

    let registry = pbx::init(&config).await.expect("init");
    let dialplan = registry.dialplan(pbx::domain::dialplan::DialplanRequest::new("t1", "100")).await;

    let priorities: Vec<_> = dialplan.fragments.iter().map(|f| f.priority).collect();
    assert_eq!(priorities, vec![10, 100, 190]);
}
