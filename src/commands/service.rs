//! Service, package and platform commands

use anyhow::Result;
use charmhelpers::context::HookContext;
use charmhelpers::services::host;
use clap::ValueEnum;

/// Service actions exposed on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceVerb {
    Start,
    Stop,
    Restart,
    /// Reload, falling back to restart
    Reload,
}

pub fn handle_service(ctx: &HookContext, verb: ServiceVerb, services: &[String]) -> Result<()> {
    let exec = ctx.exec();
    match verb {
        ServiceVerb::Start => host::start(exec, services),
        ServiceVerb::Stop => host::stop(exec, services),
        ServiceVerb::Restart => host::restart(exec, services),
        ServiceVerb::Reload => host::reload(exec, services),
    }
}

pub fn handle_running(ctx: &HookContext, service: &str) -> Result<bool> {
    host::running(ctx.exec(), service)
}

pub fn handle_install(ctx: &HookContext, packages: &[String]) -> Result<()> {
    host::install_with(ctx.exec(), ctx.installer(), packages)
}

pub fn handle_ipv6_check(ctx: &HookContext) -> Result<()> {
    let release = ctx.release_info()?;
    host::check_ipv6_compatibility(&release)?;
    println!("✓ IPv6 supported on this release");
    Ok(())
}
