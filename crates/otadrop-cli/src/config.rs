use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use otadrop_core::{
    AgentConfig, DeviceIdentity, PlatformConfig, BUILD_VERSION_ENV, DEVICE_MODEL_ENV,
};
use otadrop_platform::RecoveryInstaller;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "/etc/otadrop/config.toml";

pub(crate) fn load_config(path: Option<&Path>) -> Result<AgentConfig> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    AgentConfig::from_toml_str(&raw)
        .with_context(|| format!("failed parsing config: {}", path.display()))
}

// Precedence: environment, then config override, then empty (the version
// gate and model filter both fail open on empty values).
pub(crate) fn resolve_identity(
    config: &AgentConfig,
    env_build_version: Option<String>,
    env_model: Option<String>,
) -> DeviceIdentity {
    let build_version = env_build_version
        .filter(|value| !value.is_empty())
        .or_else(|| config.device.build_version.clone())
        .unwrap_or_default();
    let model = env_model
        .filter(|value| !value.is_empty())
        .or_else(|| config.device.model.clone())
        .unwrap_or_default();
    DeviceIdentity::new(build_version, model)
}

pub(crate) fn identity_from_host(config: &AgentConfig) -> DeviceIdentity {
    resolve_identity(
        config,
        std::env::var(BUILD_VERSION_ENV).ok(),
        std::env::var(DEVICE_MODEL_ENV).ok(),
    )
}

pub(crate) fn build_surface(platform: &PlatformConfig) -> RecoveryInstaller {
    let mut installer =
        RecoveryInstaller::new(&platform.trusted_keys_dir, &platform.control_dir);
    if let Some(trigger) = &platform.trigger_command {
        installer = installer.with_trigger_command(trigger.clone());
    }
    installer
}
