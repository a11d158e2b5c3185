//! Per-invocation context shared by the CLI commands
//!
//! Bundles the pieces every helper call needs:
//! 1. The loaded helper configuration
//! 2. An executor for the hook tools
//! 3. A resolver for host lookups

use crate::config::HelperConfig;
use crate::services::host::{self, ReleaseInfo};
use crate::utils::exec::Executor;
use crate::utils::networking::SystemResolver;
use anyhow::Result;

pub struct HookContext {
    config: HelperConfig,
    executor: Executor,
    resolver: SystemResolver,
}

impl HookContext {
    pub fn new(config: HelperConfig) -> Self {
        let executor = Executor::from_config(&config);
        Self {
            config,
            executor,
            resolver: SystemResolver,
        }
    }

    /// Get the executor reference for command execution
    pub fn exec(&self) -> &Executor {
        &self.executor
    }

    pub fn resolver(&self) -> &SystemResolver {
        &self.resolver
    }

    /// Installer command line from config
    pub fn installer(&self) -> &[String] {
        &self.config.installer
    }

    /// Release information from the configured lsb-release file
    pub fn release_info(&self) -> Result<ReleaseInfo> {
        host::lsb_release_from(&self.config.lsb_release_path)
    }
}
