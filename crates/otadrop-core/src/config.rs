use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::candidate::DEFAULT_PACKAGE_PREFIX;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentConfig {
    pub source_dir: PathBuf,
    pub staging_dir: PathBuf,
    #[serde(default = "default_package_prefix")]
    pub package_prefix: String,
    #[serde(default)]
    pub device: DeviceOverrides,
    #[serde(default)]
    pub platform: PlatformConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceOverrides {
    pub build_version: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformConfig {
    #[serde(default = "default_trusted_keys_dir")]
    pub trusted_keys_dir: PathBuf,
    #[serde(default = "default_control_dir")]
    pub control_dir: PathBuf,
    #[serde(default)]
    pub trigger_command: Option<Vec<String>>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            trusted_keys_dir: default_trusted_keys_dir(),
            control_dir: default_control_dir(),
            trigger_command: None,
        }
    }
}

impl AgentConfig {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse otadrop config")?;
        if config.package_prefix.trim().is_empty() {
            return Err(anyhow!("package_prefix must not be empty"));
        }
        if config.source_dir.as_os_str().is_empty() {
            return Err(anyhow!("source_dir must not be empty"));
        }
        if config.staging_dir.as_os_str().is_empty() {
            return Err(anyhow!("staging_dir must not be empty"));
        }
        if let Some(trigger) = &config.platform.trigger_command {
            if trigger.is_empty() {
                return Err(anyhow!("platform.trigger_command must name a program"));
            }
        }
        Ok(config)
    }
}

fn default_package_prefix() -> String {
    DEFAULT_PACKAGE_PREFIX.to_string()
}

fn default_trusted_keys_dir() -> PathBuf {
    PathBuf::from("/etc/otadrop/trusted-keys")
}

fn default_control_dir() -> PathBuf {
    PathBuf::from("/var/lib/otadrop/recovery")
}
