//! Juju hook environment: relation data, unit and charm config, logging, ports
//!
//! Each function is a single call to one of the hook tools Juju provides to a
//! running hook. Empty tool output means "no value" and comes back as `None`.

use crate::utils::exec::{CommandExecutor, check_call, check_output};
use crate::utils::string::{non_empty, split_words};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Relation key checked by `is_relation_made` when none is given
pub const DEFAULT_RELATION_KEY: &str = "private-address";

/// Severity passed to `juju-log`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => anyhow::bail!("Unknown log level: {}", s),
        }
    }
}

/// Transport protocol for `open-port`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            _ => anyhow::bail!("Unsupported protocol: {} (expected TCP or UDP)", s),
        }
    }
}

/// Send a message to the Juju controller's log
pub fn juju_log<E: CommandExecutor>(exec: &E, severity: LogLevel, message: &str) -> Result<()> {
    check_call(exec, "juju-log", &["--log-level", severity.as_str(), message])
}

/// Open a port in the unit's firewall
pub fn expose<E: CommandExecutor>(exec: &E, port: u16, protocol: Protocol) -> Result<()> {
    let spec = format!("{}/{}", port, protocol);
    check_call(exec, "open-port", &[spec.as_str()])
        .with_context(|| format!("Failed to open port {}", spec))
}

/// Relation ids for a relation name, or `None` if there are none
pub fn relation_ids<E: CommandExecutor>(exec: &E, relation: &str) -> Result<Option<Vec<String>>> {
    let out = check_output(exec, "relation-ids", &[relation])?;
    Ok(split_words(&out))
}

/// Units on the far side of a relation, or `None` if there are none
pub fn relation_list<E: CommandExecutor>(exec: &E, rid: &str) -> Result<Option<Vec<String>>> {
    let out = check_output(exec, "relation-list", &["-r", rid])?;
    Ok(split_words(&out))
}

/// Read one relation attribute
///
/// Without `rid` the relation of the current hook is used; without `unit` the
/// remote unit of the current hook.
pub fn relation_get<E: CommandExecutor>(
    exec: &E,
    attribute: &str,
    unit: Option<&str>,
    rid: Option<&str>,
) -> Result<Option<String>> {
    let mut args = Vec::new();
    if let Some(rid) = rid.filter(|r| !r.is_empty()) {
        args.push("-r");
        args.push(rid);
    }
    args.push(attribute);
    if let Some(unit) = unit.filter(|u| !u.is_empty()) {
        args.push(unit);
    }
    let out = check_output(exec, "relation-get", &args)?;
    Ok(non_empty(&out))
}

/// Write relation attributes for this unit
///
/// `rid` routes the settings to a specific relation; an empty id counts as absent.
pub fn relation_set<E, I, K, V>(exec: &E, rid: Option<&str>, settings: I) -> Result<()>
where
    E: CommandExecutor,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: fmt::Display,
{
    let pairs: Vec<String> = settings
        .into_iter()
        .map(|(k, v)| format!("{}={}", k.as_ref(), v))
        .collect();

    let mut args: Vec<&str> = Vec::new();
    if let Some(rid) = rid.filter(|r| !r.is_empty()) {
        args.push("-r");
        args.push(rid);
    }
    args.extend(pairs.iter().map(String::as_str));
    check_call(exec, "relation-set", &args)
}

/// Read one attribute of this unit (e.g. `private-address`)
pub fn unit_get<E: CommandExecutor>(exec: &E, attribute: &str) -> Result<Option<String>> {
    let out = check_output(exec, "unit-get", &[attribute])?;
    Ok(non_empty(&out))
}

/// The charm's whole configuration as a JSON object
pub fn config_get_all<E: CommandExecutor>(exec: &E) -> Result<Map<String, Value>> {
    let out = check_output(exec, "config-get", &["--format", "json"])?;
    if out.is_empty() {
        return Ok(Map::new());
    }
    let value: Value =
        serde_json::from_str(&out).context("Failed to parse config-get output as JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => anyhow::bail!("Expected a JSON object from config-get, got: {}", other),
    }
}

/// One charm configuration option, or `None` if it is unset
pub fn config_get<E: CommandExecutor>(exec: &E, attribute: &str) -> Result<Option<Value>> {
    let mut config = config_get_all(exec)?;
    Ok(config.remove(attribute).filter(|v| !v.is_null()))
}

/// Check whether any unit on any instance of `relation` has set `key`
pub fn is_relation_made<E: CommandExecutor>(exec: &E, relation: &str, key: &str) -> Result<bool> {
    for rid in relation_ids(exec, relation)?.unwrap_or_default() {
        for unit in relation_list(exec, &rid)?.unwrap_or_default() {
            if relation_get(exec, key, Some(&unit), Some(&rid))?.is_some() {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
