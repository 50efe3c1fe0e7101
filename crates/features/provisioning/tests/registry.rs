use chrono::Utc;
use pbx_kernel::ModuleRegistry;
use pbx_kernel::domain::events::{DeviceRegistered, EventEnvelope, Payload};
use pbx_provisioning::{Provisioning, Vendor};

fn registration(user: &str, expires_secs: u32) -> DeviceRegistered {
    DeviceRegistered {
        tenant_domain: "acme.example".to_owned(),
        user: user.to_owned(),
        contact: format!("sip:{user}@10.0.0.15:5060"),
        user_agent: Some("Yealink SIP-T54W 96.86.0.100".to_owned()),
        expires_secs,
    }
}

#[tokio::test]
async fn registrations_maintain_the_directory() {
    let provisioning = Provisioning::new();
    let directory = provisioning.directory();

    let mut builder = ModuleRegistry::builder();
    builder.register(Box::new(provisioning)).unwrap();
    let registry = builder.boot_all().await.unwrap();

    registry.dispatch(&registration("100", 3600)).await.unwrap();
    registry.dispatch(&registration("101", 3600)).await.unwrap();
    registry.dispatch(&registration("100", 1800)).await.unwrap();

    let device = directory.get("acme.example", "100").expect("registered");
    assert_eq!(device.vendor, Vendor::Yealink);
    assert!(device.expires_at > Utc::now());

    let active: Vec<_> = directory.active("acme.example", Utc::now()).into_iter().map(|d| d.user).collect();
    assert_eq!(active, vec!["100", "101"]);
    assert!(directory.active("other.example", Utc::now()).is_empty());

    registry.dispatch(&registration("101", 0)).await.unwrap();
    assert!(directory.get("acme.example", "101").is_none());
    assert_eq!(directory.len(), 1);
}

#[tokio::test]
async fn malformed_registrations_are_reported_not_fatal() {
    let mut builder = ModuleRegistry::builder();
    builder.register(Box::new(Provisioning::new())).unwrap();
    let registry = builder.boot_all().await.unwrap();

    let mut payload = Payload::new();
    payload.insert("user".to_owned(), serde_json::json!(100));
    let report = registry.dispatch_event(EventEnvelope::new("device.registered", payload)).await;

    assert_eq!(report.failed_modules().collect::<Vec<_>>(), vec!["provisioning"]);
}

#[tokio::test]
async fn lapsed_devices_do_not_accumulate() {
    let provisioning = Provisioning::new();
    let directory = provisioning.directory();

    let mut builder = ModuleRegistry::builder();
    builder.register(Box::new(provisioning)).unwrap();
    let registry = builder.boot_all().await.unwrap();

    for i in 0..100 {
        registry.dispatch(&registration(&format!("2{i:03}"), 1)).await.unwrap();
    }
    assert_eq!(directory.len(), 100);

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    registry.dispatch(&registration("100", 3600)).await.unwrap();

    assert_eq!(directory.len(), 1);
    assert!(directory.get("acme.example", "100").is_some());
}
