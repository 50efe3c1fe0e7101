//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Operator shell over the PBX module runtime.
#[derive(Debug, Parser)]
#[command(name = "pbx-shell")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect and exercise the PBX module runtime")]
pub struct Cli {
    /// Configuration file (defaults to `pbx.toml` in the working directory, if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Start a module disabled; repeatable, added to `modules.disabled`
    #[arg(long = "disable", value_name = "MODULE", global = true)]
    pub disable: Vec<String>,

    /// Override the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered modules in registration order
    Modules {
        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compose the dialplan for one tenant and destination
    Dialplan {
        /// Tenant domain, e.g. `acme.example`
        tenant: String,
        /// Dialed number
        destination: String,
        /// Show priority and owning module for each fragment, and dropped modules
        #[arg(short, long)]
        verbose: bool,
    },
    /// Dispatch a domain event to subscribed modules
    Emit {
        /// Event type, e.g. `call.hangup`
        event_type: String,
        /// Payload as a JSON object
        #[arg(short, long, default_value = "{}")]
        payload: String,
        /// Tenant the event belongs to
        #[arg(short, long)]
        tenant: Option<String>,
    },
    /// Print the permission tokens of enabled modules
    Permissions {
        /// Group tokens by contributing module
        #[arg(long)]
        by_module: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "pbx-shell",
            "dialplan",
            "acme.example",
            "100",
            "--disable",
            "media",
            "--disable",
            "analytics",
            "-c",
            "conf/pbx.toml",
        ])
        .unwrap();

        assert_eq!(cli.disable, vec!["media", "analytics"]);
        assert_eq!(cli.config, Some(PathBuf::from("conf/pbx.toml")));
        assert!(matches!(
            cli.command,
            Command::Dialplan { ref tenant, ref destination, verbose: false }
                if tenant == "acme.example" && destination == "100"
        ));
    }

    #[test]
    fn emit_defaults_to_an_empty_payload() {
        let cli = Cli::try_parse_from(["pbx-shell", "emit", "call.hangup"]).unwrap();
        match cli.command {
            Command::Emit { event_type, payload, tenant } => {
                assert_eq!(event_type, "call.hangup");
                assert_eq!(payload, "{}");
                assert!(tenant.is_none());
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn a_subcommand_is_required() {
        assert!(Cli::try_parse_from(["pbx-shell"]).is_err());
    }
}
