// Command module routing
//
// To add a new command:
// 1. Add the variant to `Commands` in main.rs
// 2. Put its handler in the module for its area below
// 3. Add the match arm in `handle_command`

pub mod network;
pub mod relation;
pub mod service;

use crate::Commands;
use crate::Commands::*;
use anyhow::Result;
use charmhelpers::context::HookContext;

/// Dispatch command to appropriate handler
///
/// Returns `false` for a "no" answer from `running` or `relation-made`; main
/// exits 1 for that and 2 for an error.
pub fn handle_command(ctx: &HookContext, command: Commands) -> Result<bool> {
    match command {
        RelationIds { relation } => relation::handle_relation_ids(ctx, &relation)?,
        RelationList { rid } => relation::handle_relation_list(ctx, &rid)?,
        RelationGet {
            attribute,
            unit,
            rid,
        } => relation::handle_relation_get(ctx, &attribute, unit.as_deref(), rid.as_deref())?,
        RelationSet { rid, settings } => {
            relation::handle_relation_set(ctx, rid.as_deref(), &settings)?
        }
        UnitGet { attribute } => relation::handle_unit_get(ctx, &attribute)?,
        ConfigGet { attribute } => relation::handle_config_get(ctx, attribute.as_deref())?,
        RelationMade { relation, key } => {
            return relation::handle_relation_made(ctx, &relation, &key);
        }
        Log { level, message } => relation::handle_log(ctx, level, &message)?,
        Expose { port, protocol } => network::handle_expose(ctx, port, protocol)?,
        HostIp { hostname } => network::handle_host_ip(ctx, hostname.as_deref())?,
        UnitIp => network::handle_host_ip(ctx, None)?,
        Hostname { short } => network::handle_hostname(short)?,
        Service { action, services } => service::handle_service(ctx, action, &services)?,
        Running { service } => return service::handle_running(ctx, &service),
        Install { packages } => service::handle_install(ctx, &packages)?,
        Ipv6Check => service::handle_ipv6_check(ctx)?,
    }
    Ok(true)
}

/// Print an optional value; nothing for `None`
pub(crate) fn print_value(value: Option<&str>) {
    if let Some(value) = value {
        println!("{}", value);
    }
}
