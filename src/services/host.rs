//! Host operations: system services, packages and release information

use crate::error::HelperError;
use crate::utils::exec::{CommandExecutor, check_call, check_output};
use crate::utils::string::unquote;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// OS service control tool, invoked as `service <name> <action>`
pub const SERVICE_COMMAND: &str = "service";

/// Package installer used when none is configured
pub const DEFAULT_INSTALLER: &[&str] = &["apt-get", "-y", "install"];

pub const LSB_RELEASE_PATH: &str = "/etc/lsb-release";

/// Status output fragments that mean the service is up (upstart and sysvinit)
const RUNNING_MARKERS: &[&str] = &["start/running", "is running"];

/// Reload, and if the service can't (unsupported or not running) restart it
const RELOAD_PLAN: &[ServiceAction] = &[ServiceAction::Reload, ServiceAction::Restart];

/// First Ubuntu release with IPv6 support in charms (Trusty 14.04)
const IPV6_MIN_RELEASE: (u32, u32) = (14, 4);
const IPV6_MIN_CODENAME: &str = "trusty";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Reload,
    Status,
}

impl ServiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Reload => "reload",
            ServiceAction::Status => "status",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(ServiceAction::Start),
            "stop" => Ok(ServiceAction::Stop),
            "restart" => Ok(ServiceAction::Restart),
            "reload" => Ok(ServiceAction::Reload),
            "status" => Ok(ServiceAction::Status),
            _ => anyhow::bail!("Unknown service action: {}", s),
        }
    }
}

/// Run one action against one service
pub fn service_control<E: CommandExecutor>(
    exec: &E,
    service: &str,
    action: ServiceAction,
) -> Result<()> {
    check_call(exec, SERVICE_COMMAND, &[service, action.as_str()])
}

fn control_all<E: CommandExecutor, S: AsRef<str>>(
    exec: &E,
    services: &[S],
    action: ServiceAction,
) -> Result<()> {
    for service in services {
        service_control(exec, service.as_ref(), action)?;
    }
    Ok(())
}

pub fn start<E: CommandExecutor, S: AsRef<str>>(exec: &E, services: &[S]) -> Result<()> {
    control_all(exec, services, ServiceAction::Start)
}

pub fn stop<E: CommandExecutor, S: AsRef<str>>(exec: &E, services: &[S]) -> Result<()> {
    control_all(exec, services, ServiceAction::Stop)
}

pub fn restart<E: CommandExecutor, S: AsRef<str>>(exec: &E, services: &[S]) -> Result<()> {
    control_all(exec, services, ServiceAction::Restart)
}

/// Try each action in turn until one succeeds
///
/// Only a non-zero exit moves on to the next action; any other error, or a
/// failure of the last action, is returned. Yields the action that worked.
pub fn run_action_plan<E: CommandExecutor>(
    exec: &E,
    service: &str,
    plan: &[ServiceAction],
) -> Result<ServiceAction> {
    let mut last_failure = None;

    for (i, action) in plan.iter().enumerate() {
        match service_control(exec, service, *action) {
            Ok(()) => return Ok(*action),
            Err(e) if HelperError::is_command_failure(&e) => {
                if let Some(next) = plan.get(i + 1) {
                    warn!(service, failed = %action, next = %next, "service action failed, falling back");
                }
                last_failure = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_failure.unwrap_or_else(|| anyhow::anyhow!("No actions given for service {}", service)))
}

/// Reload each service, restarting the ones that can't be reloaded
pub fn reload<E: CommandExecutor, S: AsRef<str>>(exec: &E, services: &[S]) -> Result<()> {
    for service in services {
        let service = service.as_ref();
        let done = run_action_plan(exec, service, RELOAD_PLAN)?;
        debug!(service, action = %done, "service reloaded");
    }
    Ok(())
}

/// Check if a service reports itself as running
///
/// A non-zero exit from the status command means "not running".
pub fn running<E: CommandExecutor>(exec: &E, service: &str) -> Result<bool> {
    match check_output(exec, SERVICE_COMMAND, &[service, ServiceAction::Status.as_str()]) {
        Ok(status) => Ok(RUNNING_MARKERS.iter().any(|marker| status.contains(marker))),
        Err(e) if HelperError::is_command_failure(&e) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Install packages with the default installer
pub fn install<E: CommandExecutor, S: AsRef<str>>(exec: &E, packages: &[S]) -> Result<()> {
    install_with(exec, DEFAULT_INSTALLER, packages)
}

/// Install packages with an explicit installer command line (program first)
pub fn install_with<E: CommandExecutor, I: AsRef<str>, S: AsRef<str>>(
    exec: &E,
    installer: &[I],
    packages: &[S],
) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let (program, base_args) = installer
        .split_first()
        .context("Installer command is empty")?;

    let names: Vec<&str> = packages.iter().map(|p| p.as_ref()).collect();
    let args: Vec<&str> = base_args
        .iter()
        .map(|a| a.as_ref())
        .chain(names.iter().copied())
        .collect();
    check_call(exec, program.as_ref(), &args)
        .with_context(|| format!("Failed to install packages: {}", names.join(", ")))
}

/// `KEY=VALUE` pairs from an lsb-release file
pub type ReleaseInfo = HashMap<String, String>;

pub fn parse_lsb_release(content: &str) -> ReleaseInfo {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), unquote(value).to_string()))
        })
        .collect()
}

/// Release information of this machine
pub fn lsb_release() -> Result<ReleaseInfo> {
    lsb_release_from(LSB_RELEASE_PATH)
}

pub fn lsb_release_from(path: impl AsRef<Path>) -> Result<ReleaseInfo> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read release file: {}", path.display()))?;
    Ok(parse_lsb_release(&content))
}

fn parse_release_number(release: &str) -> Option<(u32, u32)> {
    let mut parts = release.split('.');
    let major = parts.next()?.trim().parse().ok()?;
    let minor = parts.next()?.trim().parse().ok()?;
    Some((major, minor))
}

/// Fail unless the platform release supports IPv6 in charms
pub fn check_ipv6_compatibility(release: &ReleaseInfo) -> Result<()> {
    // Codenames wrapped around the alphabet after zesty, so prefer the number
    let supported = if let Some(number) = release
        .get("DISTRIB_RELEASE")
        .and_then(|r| parse_release_number(r))
    {
        number >= IPV6_MIN_RELEASE
    } else if let Some(codename) = release.get("DISTRIB_CODENAME") {
        codename.to_lowercase().as_str() >= IPV6_MIN_CODENAME
    } else {
        anyhow::bail!("Release information has neither DISTRIB_RELEASE nor DISTRIB_CODENAME");
    };

    if !supported {
        return Err(HelperError::UnsupportedRelease(
            "IPv6 is not supported in charms for Ubuntu versions less than Trusty 14.04"
                .to_string(),
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::ScriptedExecutor;

    #[test]
    fn test_start_stop_restart() {
        let exec = ScriptedExecutor::new();
        start(&exec, &["apache2", "memcached"]).unwrap();
        stop(&exec, &["apache2"]).unwrap();
        restart(&exec, &[String::from("haproxy")]).unwrap();
        assert_eq!(
            exec.calls(),
            vec![
                "service apache2 start",
                "service memcached start",
                "service apache2 stop",
                "service haproxy restart",
            ]
        );
    }

    #[test]
    fn test_start_stops_at_first_failure() {
        let exec = ScriptedExecutor::new().exit("service apache2 start", 1, "");
        let err = start(&exec, &["apache2", "memcached"]).unwrap_err();
        assert!(HelperError::is_command_failure(&err));
        assert_eq!(exec.calls(), vec!["service apache2 start"]);
    }

    #[test]
    fn test_reload_success_does_not_restart() {
        let exec = ScriptedExecutor::new();
        reload(&exec, &["nginx"]).unwrap();
        assert_eq!(exec.calls(), vec!["service nginx reload"]);
    }

    #[test]
    fn test_reload_falls_back_to_restart_once() {
        let exec = ScriptedExecutor::new().exit("service nginx reload", 1, "");
        reload(&exec, &["nginx", "haproxy"]).unwrap();
        assert_eq!(
            exec.calls(),
            vec![
                "service nginx reload",
                "service nginx restart",
                "service haproxy reload",
            ]
        );
    }

    #[test]
    fn test_reload_propagates_restart_failure() {
        let exec = ScriptedExecutor::new()
            .exit("service nginx reload", 1, "")
            .exit("service nginx restart", 2, "");
        let err = reload(&exec, &["nginx"]).unwrap_err();
        match err.downcast_ref::<HelperError>() {
            Some(HelperError::CommandFailed { command, code, .. }) => {
                assert_eq!(command, "service nginx restart");
                assert_eq!(*code, Some(2));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_reload_does_not_retry_spawn_errors() {
        let exec = ScriptedExecutor::new().unavailable("service");
        assert!(reload(&exec, &["nginx"]).is_err());
        assert_eq!(exec.calls(), vec!["service nginx reload"]);
    }

    #[test]
    fn test_run_action_plan_empty() {
        let exec = ScriptedExecutor::new();
        assert!(run_action_plan(&exec, "nginx", &[]).is_err());
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_running_markers() {
        let exec = ScriptedExecutor::new()
            .reply("service mysql status", "mysql start/running, process 1234")
            .reply("service apache2 status", " * apache2 is running")
            .reply("service cron status", "cron stop/waiting");
        assert!(running(&exec, "mysql").unwrap());
        assert!(running(&exec, "apache2").unwrap());
        assert!(!running(&exec, "cron").unwrap());
    }

    #[test]
    fn test_running_non_zero_exit_is_false() {
        let exec = ScriptedExecutor::new().exit("service nginx status", 3, "nginx is running");
        assert!(!running(&exec, "nginx").unwrap());
    }

    #[test]
    fn test_running_propagates_spawn_errors() {
        let exec = ScriptedExecutor::new().unavailable("service");
        assert!(running(&exec, "nginx").is_err());
    }

    #[test]
    fn test_install() {
        let exec = ScriptedExecutor::new();
        install(&exec, &["haproxy", "python-dnspython"]).unwrap();
        install(&exec, &[] as &[&str]).unwrap();
        install_with(&exec, &["yum", "install", "-y"], &["nginx"]).unwrap();
        assert_eq!(
            exec.calls(),
            vec![
                "apt-get -y install haproxy python-dnspython",
                "yum install -y nginx",
            ]
        );
    }

    #[test]
    fn test_install_with_empty_installer() {
        let exec = ScriptedExecutor::new();
        assert!(install_with(&exec, &[] as &[&str], &["nginx"]).is_err());
    }

    #[test]
    fn test_parse_lsb_release() {
        let info = parse_lsb_release(
            "DISTRIB_ID=Ubuntu\nDISTRIB_RELEASE=14.04\nDISTRIB_CODENAME=trusty\n\
             DISTRIB_DESCRIPTION=\"Ubuntu 14.04.6 LTS\"\n\n# comment\n",
        );
        assert_eq!(info.get("DISTRIB_CODENAME").unwrap(), "trusty");
        assert_eq!(info.get("DISTRIB_DESCRIPTION").unwrap(), "Ubuntu 14.04.6 LTS");
        assert_eq!(info.len(), 4);
    }

    #[test]
    fn test_lsb_release_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lsb-release");
        std::fs::write(&path, "DISTRIB_RELEASE=12.04\nDISTRIB_CODENAME=precise\n").unwrap();
        let info = lsb_release_from(&path).unwrap();
        assert_eq!(info.get("DISTRIB_RELEASE").unwrap(), "12.04");

        assert!(lsb_release_from(dir.path().join("missing")).is_err());
    }

    fn release(number: Option<&str>, codename: Option<&str>) -> ReleaseInfo {
        let mut info = ReleaseInfo::new();
        if let Some(number) = number {
            info.insert("DISTRIB_RELEASE".to_string(), number.to_string());
        }
        if let Some(codename) = codename {
            info.insert("DISTRIB_CODENAME".to_string(), codename.to_string());
        }
        info
    }

    #[test]
    fn test_ipv6_rejects_precise() {
        let err = check_ipv6_compatibility(&release(Some("12.04"), Some("precise"))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HelperError>(),
            Some(HelperError::UnsupportedRelease(_))
        ));
        assert!(err.to_string().contains("less than Trusty 14.04"));
    }

    #[test]
    fn test_ipv6_accepts_trusty_and_later() {
        check_ipv6_compatibility(&release(Some("14.04"), Some("trusty"))).unwrap();
        check_ipv6_compatibility(&release(Some("16.04"), Some("xenial"))).unwrap();
        check_ipv6_compatibility(&release(Some("18.04"), Some("bionic"))).unwrap();
    }

    #[test]
    fn test_ipv6_codename_fallback() {
        check_ipv6_compatibility(&release(None, Some("Utopic"))).unwrap();
        assert!(check_ipv6_compatibility(&release(None, Some("saucy"))).is_err());
        assert!(check_ipv6_compatibility(&release(None, None)).is_err());
    }
}
