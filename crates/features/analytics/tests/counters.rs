use pbx_analytics::{Analytics, TenantStats};
use pbx_kernel::ModuleRegistry;
use pbx_kernel::domain::events::{CallHangup, RecordingCompleted};

fn hangup(tenant: &str, answered: bool, billsec: u64) -> CallHangup {
    CallHangup {
        call_id: format!("{tenant}-{billsec}"),
        tenant_domain: tenant.to_owned(),
        caller: "100".to_owned(),
        destination: "101".to_owned(),
        hangup_cause: if answered { "NORMAL_CLEARING" } else { "NO_ANSWER" }.to_owned(),
        answered,
        billsec,
        queue: None,
        agent: None,
    }
}

#[tokio::test]
async fn counts_calls_and_recordings_per_tenant() {
    let analytics = Analytics::new();
    let stats = analytics.stats();

    let mut builder = ModuleRegistry::builder();
    builder.register(Box::new(analytics)).unwrap();
    let registry = builder.boot_all().await.unwrap();

    registry.dispatch(&hangup("t1", true, 60)).await.unwrap();
    registry.dispatch(&hangup("t1", false, 0)).await.unwrap();
    registry.dispatch(&hangup("t2", true, 5)).await.unwrap();
    registry
        .dispatch(&RecordingCompleted {
            call_id: "t1-60".to_owned(),
            tenant_domain: "t1".to_owned(),
            path: "/var/lib/pbx/recordings/t1/t1-60.wav".to_owned(),
            duration_secs: 58,
        })
        .await
        .unwrap();

    let t1 = stats.tenant("t1");
    assert_eq!(t1, TenantStats { calls: 2, answered: 1, billsec: 60, recordings: 1, recorded_secs: 58 });
    assert_eq!(t1.answer_rate(), Some(0.5));
    assert_eq!(stats.tenant("t2").calls, 1);
    assert_eq!(stats.tenant("t3").answer_rate(), None);
}

#[tokio::test]
async fn oversized_durations_saturate_instead_of_failing() {
    let analytics = Analytics::new();
    let stats = analytics.stats();

    let mut builder = ModuleRegistry::builder();
    builder.register(Box::new(analytics)).unwrap();
    let registry = builder.boot_all().await.unwrap();

    assert!(registry.dispatch(&hangup("t1", true, u64::MAX)).await.unwrap().is_clean());
    assert!(registry.dispatch(&hangup("t1", true, 60)).await.unwrap().is_clean());

    let t1 = stats.tenant("t1");
    assert_eq!(t1.calls, 2);
    assert_eq!(t1.billsec, u64::MAX);
}
