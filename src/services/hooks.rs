//! Hook dispatch
//!
//! Juju runs a charm hook by executing `hooks/<name>`; charms usually symlink
//! every hook to one program and pick the handler from the name it was run as.

use crate::services::hookenv::{LogLevel, juju_log};
use crate::utils::exec::CommandExecutor;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub type HookHandler<'a> = Box<dyn Fn() -> Result<()> + 'a>;

/// Registry of hook handlers keyed by hook name
#[derive(Default)]
pub struct Hooks<'a> {
    handlers: BTreeMap<String, HookHandler<'a>>,
}

impl<'a> Hooks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a hook, replacing any earlier one
    pub fn register<F>(&mut self, hook: &str, handler: F) -> &mut Self
    where
        F: Fn() -> Result<()> + 'a,
    {
        self.handlers.insert(hook.to_string(), Box::new(handler));
        self
    }

    pub fn contains(&self, hook: &str) -> bool {
        self.handlers.contains_key(hook)
    }

    /// Registered hook names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Run the handler for `hook`
    ///
    /// Returns `Ok(false)` after logging through `juju-log` when the charm has
    /// no handler for the hook. Handler errors are returned as-is.
    pub fn execute<E: CommandExecutor>(&self, exec: &E, hook: &str) -> Result<bool> {
        match self.handlers.get(hook) {
            Some(handler) => {
                debug!(hook, "running hook handler");
                handler()?;
                Ok(true)
            }
            None => {
                info!(hook, "no handler registered");
                juju_log(
                    exec,
                    LogLevel::Info,
                    &format!("This charm doesn't know how to handle '{}'.", hook),
                )?;
                Ok(false)
            }
        }
    }
}

/// Hook name from the path the program was invoked as (`argv[0]`)
pub fn hook_name_from_arg(arg0: &str) -> String {
    Path::new(arg0)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| arg0.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::ScriptedExecutor;
    use std::cell::RefCell;

    #[test]
    fn test_hook_name_from_arg() {
        assert_eq!(
            hook_name_from_arg("/var/lib/juju/agents/unit-mysql-0/charm/hooks/db-relation-joined"),
            "db-relation-joined"
        );
        assert_eq!(hook_name_from_arg("hooks/install"), "install");
        assert_eq!(hook_name_from_arg("config-changed"), "config-changed");
    }

    #[test]
    fn test_execute_runs_exactly_one_handler() {
        let ran = RefCell::new(Vec::new());
        let mut hooks = Hooks::new();
        hooks
            .register("install", || {
                ran.borrow_mut().push("install");
                Ok(())
            })
            .register("start", || {
                ran.borrow_mut().push("start");
                Ok(())
            });

        let exec = ScriptedExecutor::new();
        assert!(hooks.execute(&exec, "start").unwrap());
        assert_eq!(*ran.borrow(), vec!["start"]);
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_execute_missing_handler_logs() {
        let mut hooks = Hooks::new();
        hooks.register("install", || Ok(()));

        let exec = ScriptedExecutor::new();
        assert!(!hooks.execute(&exec, "upgrade-charm").unwrap());
        assert_eq!(
            exec.calls(),
            vec!["juju-log --log-level INFO This charm doesn't know how to handle 'upgrade-charm'."]
        );
    }

    #[test]
    fn test_execute_propagates_handler_error() {
        let mut hooks = Hooks::new();
        hooks.register("config-changed", || anyhow::bail!("bad port"));

        let exec = ScriptedExecutor::new();
        let err = hooks.execute(&exec, "config-changed").unwrap_err();
        assert_eq!(err.to_string(), "bad port");
    }

    #[test]
    fn test_register_replaces_and_lists() {
        let mut hooks = Hooks::new();
        hooks
            .register("stop", || Ok(()))
            .register("install", || anyhow::bail!("old"))
            .register("install", || Ok(()));

        assert!(hooks.contains("install"));
        assert!(!hooks.contains("start"));
        assert_eq!(hooks.names().collect::<Vec<_>>(), vec!["install", "stop"]);
        assert!(hooks.execute(&ScriptedExecutor::new(), "install").unwrap());
    }
}
