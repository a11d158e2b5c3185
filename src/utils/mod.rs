// Utils module - code that talks to the outside world
pub mod exec;
pub mod hostname;
pub mod networking;
pub mod string;
#[cfg(test)]
pub mod testing;

// Re-export commonly used utilities
pub use exec::{CommandExecutor, Executor, check_call, check_output};
pub use networking::{Resolver, SystemResolver, get_host_ip, get_unit_ip};
pub use string::bytes_to_string;
