//! Fragment builders. Values from the request are escaped before interpolation.

use pbx_kernel::domain::dialplan::{escape_attr, exact_expression};

pub(crate) const EXTENSION_PRIORITY: i32 = 100;
pub(crate) const VOICEMAIL_PRIORITY: i32 = 190;
pub(crate) const OUTBOUND_PRIORITY: i32 = 800;

/// How a destination is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Extension,
    Outbound,
    Unroutable,
}

/// Rings the extension's registered devices.
pub(crate) fn extension(tenant: &str, destination: &str, ring_timeout_secs: u32) -> String {
    let tenant = escape_attr(tenant);
    let expression = escape_attr(&exact_expression(destination));
    let dest = escape_attr(destination);
    format!(
        r#"<extension name="local_extension_{dest}" continue="true">
  <condition field="destination_number" expression="{expression}">
    <action application="set" data="call_timeout={ring_timeout_secs}"/>
    <action application="set" data="hangup_after_bridge=true"/>
    <action application="bridge" data="user/{dest}@{tenant}"/>
  </condition>
</extension>"#
    )
}

/// Falls through to the extension's mailbox when the bridge did not answer.
pub(crate) fn voicemail(tenant: &str, destination: &str) -> String {
    let tenant = escape_attr(tenant);
    let expression = escape_attr(&exact_expression(destination));
    let dest = escape_attr(destination);
    format!(
        r#"<extension name="voicemail_{dest}">
  <condition field="destination_number" expression="{expression}">
    <action application="answer"/>
    <action application="voicemail" data="default {tenant} {dest}"/>
  </condition>
</extension>"#
    )
}

pub(crate) fn outbound(gateway: &str, destination: &str) -> String {
    let gateway = escape_attr(gateway);
    let expression = escape_attr(&exact_expression(destination));
    let dest = escape_attr(destination);
    format!(
        r#"<extension name="outbound_{dest}">
  <condition field="destination_number" expression="{expression}">
    <action application="set" data="effective_caller_id_number=${{outbound_caller_id_number}}"/>
    <action application="bridge" data="sofia/gateway/{gateway}/{dest}"/>
  </condition>
</extension>"#
    )
}
