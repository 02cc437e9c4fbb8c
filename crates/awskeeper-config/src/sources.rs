// Configuration source loading
//
// Priority order:
// 1. Environment variables (AWSKEEPER_* prefix, plus the Lambda's raw variables)
// 2. Config file path from --config, else AWSKEEPER_CONFIG
// 3. Inline config content from AWSKEEPER_CONFIG_CONTENT
// 4. Default config file (./awskeeper.toml)
// 5. Platform defaults

use crate::env_overrides::{self, EnvSource};
use crate::platform::Platform;
use crate::{ConfigFile, RuntimeConfig};
use anyhow::{Context, Result};
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "./awskeeper.toml";

/// Build the runtime config from every source, highest priority last.
pub fn load_config<E: EnvSource>(
    platform: Platform,
    path: Option<&Path>,
    env: &E,
) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::from_platform_defaults(platform);

    if let Some((file_config, source)) = load_from_file(path, env)? {
        config.merge(file_config);
        config.source = Some(source);
    }

    env_overrides::apply_env_overrides(&mut config, env)?;
    config.validate()?;
    Ok(config)
}

/// The file settings and a description of where they came from
fn load_from_file<E: EnvSource>(
    path: Option<&Path>,
    env: &E,
) -> Result<Option<(ConfigFile, String)>> {
    if let Some(path) = path {
        return read_config_file(path).map(Some);
    }

    if let Some(path) = env.get("CONFIG").filter(|p| !p.trim().is_empty()) {
        return read_config_file(Path::new(&path)).map(Some);
    }

    if let Some(content) = env.get("CONFIG_CONTENT") {
        let config: ConfigFile = toml::from_str(&content)
            .context("Failed to parse inline config from AWSKEEPER_CONFIG_CONTENT")?;
        return Ok(Some((config, "AWSKEEPER_CONFIG_CONTENT".to_string())));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return read_config_file(default_path).map(Some);
    }

    Ok(None)
}

fn read_config_file(path: &Path) -> Result<(ConfigFile, String)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok((config, path.display().to_string()))
}
