//! Port and address commands

use super::print_value;
use anyhow::Result;
use charmhelpers::context::HookContext;
use charmhelpers::services::hookenv;
use charmhelpers::utils::hostname::{get_unit_hostname, normalize_hostname};
use charmhelpers::utils::networking::{get_host_ip, get_unit_ip};
use charmhelpers::Protocol;

pub fn handle_expose(ctx: &HookContext, port: u16, protocol: Protocol) -> Result<()> {
    hookenv::expose(ctx.exec(), port, protocol)
}

/// Resolve `hostname`, or this unit's private-address when none is given
pub fn handle_host_ip(ctx: &HookContext, hostname: Option<&str>) -> Result<()> {
    let ip = match hostname {
        Some(hostname) => get_host_ip(ctx.resolver(), hostname)?,
        None => get_unit_ip(ctx.exec(), ctx.resolver())?,
    };
    print_value(ip.as_deref());
    Ok(())
}

pub fn handle_hostname(short: bool) -> Result<()> {
    let hostname = get_unit_hostname()?;
    if short {
        println!("{}", normalize_hostname(&hostname));
    } else {
        println!("{}", hostname);
    }
    Ok(())
}
