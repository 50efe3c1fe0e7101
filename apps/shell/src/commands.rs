use crate::args::Command;
use anyhow::{Context, Result, bail};
use pbx::domain::dialplan::DialplanRequest;
use pbx::domain::events::{EventEnvelope, Payload};
use pbx::kernel::ModuleRegistry;
use std::fmt::Write as _;

pub async fn run(registry: &ModuleRegistry, command: Command) -> Result<()> {
    let output = match command {
        Command::Modules { json } => modules(registry, json)?,
        Command::Dialplan { tenant, destination, verbose } => {
            dialplan(registry, DialplanRequest::new(tenant, destination), verbose).await
        },
        Command::Emit { event_type, payload, tenant } => {
            emit(registry, event_type, &payload, tenant).await?
        },
        Command::Permissions { by_module } => permissions(registry, by_module),
    };
    print!("{output}");
    Ok(())
}

fn modules(registry: &ModuleRegistry, json: bool) -> Result<String> {
    let modules = registry.list();
    if json {
        return Ok(serde_json::to_string_pretty(&modules)? + "\n");
    }

    let mut out = format!("{:<3} {:<15} {:<16} {:<8} {:<9} {}\n", "#", "NAME", "ALIAS", "VERSION", "STATE", "ENABLED");
    for m in modules {
        let _ = writeln!(
            out,
            "{:<3} {:<15} {:<16} {:<8} {:<9} {}",
            m.registration_order, m.name, m.alias, m.version, m.lifecycle_state, m.enabled
        );
    }
    Ok(out)
}

async fn dialplan(registry: &ModuleRegistry, request: DialplanRequest, verbose: bool) -> String {
    let dialplan = registry.dialplan(request).await;
    let mut out = String::new();

    for fragment in &dialplan.fragments {
        if verbose {
            let _ = writeln!(out, "<!-- priority {} from {} -->", fragment.priority, fragment.module_name);
        }
        let _ = writeln!(out, "{}", fragment.xml);
    }
    if verbose {
        for failure in &dialplan.failures {
            let _ = writeln!(out, "<!-- dropped: {failure} -->");
        }
        if dialplan.is_empty() {
            let _ = writeln!(out, "<!-- no fragments for {} -->", dialplan.request);
        }
    }
    out
}

async fn emit(
    registry: &ModuleRegistry,
    event_type: String,
    payload: &str,
    tenant: Option<String>,
) -> Result<String> {
    if event_type.trim().is_empty() {
        bail!("event type must not be empty");
    }
    let payload: Payload = serde_json::from_str(payload).context("Payload must be a JSON object")?;

    let mut envelope = EventEnvelope::new(event_type, payload);
    if let Some(tenant) = tenant {
        envelope = envelope.with_tenant(tenant);
    }

    let report = registry.dispatch_event(envelope).await;
    let mut out = String::new();
    if report.is_noop() && report.skipped.is_empty() {
        let _ = writeln!(out, "{}: no subscribers", report.event_type);
        return Ok(out);
    }

    let _ = writeln!(out, "{}: delivered to [{}]", report.event_type, report.delivered.join(", "));
    if !report.skipped.is_empty() {
        let _ = writeln!(out, "skipped (disabled): [{}]", report.skipped.join(", "));
    }
    for failure in &report.failures {
        let _ = writeln!(out, "failed: {failure}");
    }
    Ok(out)
}

fn permissions(registry: &ModuleRegistry, by_module: bool) -> String {
    let mut out = String::new();
    if by_module {
        for (module, tokens) in registry.permissions_by_module() {
            let tokens: Vec<_> = tokens.iter().map(|t| t.as_str()).collect();
            let _ = writeln!(out, "{module}: {}", tokens.join(" "));
        }
    } else {
        for token in registry.aggregate_permissions() {
            let _ = writeln!(out, "{token}");
        }
    }
    out
}
