pub mod config;
pub mod roster;
pub mod serve;

use anyhow::Context;
use rota_core::config::Config;
use std::path::Path;

/// Load the config file and apply command-line overrides.
pub fn load_config(path: &Path, db: Option<&Path>) -> anyhow::Result<Config> {
    let mut config =
        Config::load(path).with_context(|| format!("loading {}", path.display()))?;
    if let Some(db) = db {
        config.store.path = db.to_path_buf();
    }
    Ok(config)
}
