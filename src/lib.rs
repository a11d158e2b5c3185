// charmhelpers
// Helpers for Juju charm hooks

pub mod config;
pub mod context;
pub mod error;
pub mod services;
pub mod utils;

// Re-export commonly used items
pub use config::{HelperConfig, load_config};
pub use context::HookContext;
pub use error::HelperError;
pub use services::hookenv::{
    config_get, config_get_all, expose, is_relation_made, juju_log, relation_get, relation_ids,
    relation_list, relation_set, unit_get,
};
pub use services::host::{install, reload, restart, running, start, stop};
pub use services::{Hooks, LogLevel, Protocol, ServiceAction, hook_name_from_arg};
pub use utils::hostname::get_unit_hostname;
pub use utils::{CommandExecutor, Executor, Resolver, SystemResolver, get_host_ip, get_unit_ip};
