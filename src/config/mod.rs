pub mod definitions;
pub mod settings;
mod structs;
pub mod types;
pub mod validators;

use std::sync::{Arc, OnceLock};

pub use definitions::keys;
pub use settings::{AuthSettingsUpdate, CounterSettings, GeneralSettingsUpdate, SettingsManager};
pub use structs::*;
pub use types::{StartDate, ValueType};

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Initialize the global configuration
///
/// Loads from the given TOML path (or `config.toml` in the current
/// directory) plus `GAC__*` environment overrides. Subsequent calls
/// are no-ops.
pub fn init_config(path: Option<&str>) {
    CONFIG.get_or_init(|| Arc::new(StaticConfig::load(path)));
}

/// Get the global configuration instance
///
/// Falls back to defaults when `init_config` has not been called,
/// which keeps library users and tests free of global setup.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| Arc::new(StaticConfig::default()))
        .clone()
}
