mod commands;

use anyhow::Result;
use charmhelpers::config::{self, HelperConfig};
use charmhelpers::context::HookContext;
use clap::{Parser, Subcommand};
use commands::service::ServiceVerb;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "charmhelpers", version)]
#[command(about = "Helpers for Juju charm hooks - relation data, config, ports and services", long_about = None)]
struct Cli {
    /// Helper config file (TOML); defaults to $CHARMHELPERS_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// List relation ids for a relation name
    RelationIds {
        relation: String,
    },
    /// List units on a relation
    RelationList {
        /// Relation id (e.g. db:0)
        rid: String,
    },
    /// Read a relation attribute
    RelationGet {
        attribute: String,
        /// Remote unit (defaults to the unit of the current hook)
        unit: Option<String>,
        /// Relation id (defaults to the relation of the current hook)
        #[arg(long, short = 'r')]
        rid: Option<String>,
    },
    /// Set relation attributes for this unit
    RelationSet {
        /// Relation id (defaults to the relation of the current hook)
        #[arg(long, short = 'r')]
        rid: Option<String>,
        /// Settings as key=value
        #[arg(required = true)]
        settings: Vec<String>,
    },
    /// Read a unit attribute (e.g. private-address)
    UnitGet {
        attribute: String,
    },
    /// Read a charm config option; prints the whole config as JSON without one
    ConfigGet {
        attribute: Option<String>,
    },
    /// Exit 0 if any unit on the relation has set the key, 1 otherwise (2 on error)
    RelationMade {
        relation: String,
        #[arg(long, default_value = "private-address")]
        key: String,
    },
    /// Open a port in the unit's firewall
    Expose {
        port: u16,
        #[arg(long, short = 'p', default_value = "TCP")]
        protocol: charmhelpers::Protocol,
    },
    /// Send a message to the Juju log
    Log {
        #[arg(long, short = 'l', default_value = "INFO")]
        level: charmhelpers::LogLevel,
        message: String,
    },
    /// Resolve a hostname to an IPv4 address (defaults to this unit's private-address)
    HostIp {
        hostname: Option<String>,
    },
    /// Print this unit's IPv4 address
    UnitIp,
    /// Print this machine's hostname
    Hostname {
        /// Strip the domain and lowercase
        #[arg(long)]
        short: bool,
    },
    /// Control system services
    Service {
        action: ServiceVerb,
        #[arg(required = true)]
        services: Vec<String>,
    },
    /// Exit 0 if the service is running, 1 otherwise (2 on error)
    Running {
        service: String,
    },
    /// Install packages with the configured installer
    Install {
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// Fail unless this release supports IPv6 in charms
    Ipv6Check,
}

fn init_logging(config: &HelperConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_filter.as_deref().unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries values for the calling hook
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Exit status for a command result
///
/// `0` for success or a "yes" answer, `1` for a "no" answer from `running` or
/// `relation-made`, `2` for any error so callers can tell "no" from "broken".
fn exit_status(result: Result<bool>) -> u8 {
    match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            2
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config = config::load_config(cli.config.as_deref())?;
    init_logging(&config);

    let ctx = HookContext::new(config);
    commands::handle_command(&ctx, cli.command)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    ExitCode::from(exit_status(run(cli)))
}
