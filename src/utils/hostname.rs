// Hostname utilities

use anyhow::{Context, Result};

/// Get the hostname of the machine the unit runs on
pub fn get_unit_hostname() -> Result<String> {
    whoami::fallible::hostname().context("Failed to get hostname")
}

/// Normalize hostname by removing domain suffixes like .maas, .lxd, etc.
pub fn normalize_hostname(hostname: &str) -> String {
    hostname
        .trim()
        .split('.')
        .next()
        .unwrap_or(hostname)
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_unit_hostname() {
        let hostname = get_unit_hostname().unwrap();
        assert!(!hostname.trim().is_empty());
    }

    #[test]
    fn test_normalize_hostname() {
        assert_eq!(normalize_hostname("Juju-Machine-3.maas"), "juju-machine-3");
        assert_eq!(normalize_hostname("node1"), "node1");
    }
}
