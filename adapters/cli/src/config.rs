//! Loading of progression configuration files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use rampart_core::ProgressionConfig;

/// Loads the configuration at `path`, falling back to the built-in defaults.
pub(crate) fn load(path: Option<&Path>) -> Result<ProgressionConfig> {
    let Some(path) = path else {
        return Ok(ProgressionConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read progression config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid progression config at {}", path.display()))
}

fn parse(contents: &str) -> Result<ProgressionConfig> {
    let config: ProgressionConfig =
        toml::from_str(contents).context("failed to parse progression config toml")?;
    config
        .validate()
        .context("progression config failed validation")?;
    Ok(config)
}
