//! Configuration file loading for opsplane
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `OPSPLANE_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./opsplane.toml` or `./.opsplane.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/opsplane/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileAccessConfig, FileAggregateConfig, FileApprovalConfig, FileClusterConfig,
    FileConfig, FileEngineConfig, FileLoggingConfig, FileStoreConfig, Severity,
};
pub use loader::ConfigLoader;
