pub mod hookenv;
pub mod hooks;
pub mod host;

pub use hookenv::{LogLevel, Protocol};
pub use hooks::{Hooks, hook_name_from_arg};
pub use host::ServiceAction;
