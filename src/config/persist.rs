//! Writing configuration back to disk.

use anyhow::{Context, Result};
use std::path::Path;

/// Save the entire config to a TOML file, replacing what was there.
pub fn save_config(path: &Path, config: &super::Config) -> Result<()> {
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}
