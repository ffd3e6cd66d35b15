use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context, Result};

use crate::signature::{sha256_digest_reader, verify_ed25519_signature};
use crate::{InstallSurface, Verification};

pub const SIGNATURE_TRAILER_LEN: u64 = 64;
pub const RECOVERY_COMMAND_FILE: &str = "command";

// Host implementation of the install surface: the trust root is a
// directory of hex-encoded Ed25519 public keys owned by the platform
// image, and install enqueues the staged package for the recovery
// mechanism through its control directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryInstaller {
    trusted_keys_dir: PathBuf,
    control_dir: PathBuf,
    trigger_command: Option<Vec<String>>,
}

impl RecoveryInstaller {
    pub fn new(trusted_keys_dir: impl Into<PathBuf>, control_dir: impl Into<PathBuf>) -> Self {
        Self {
            trusted_keys_dir: trusted_keys_dir.into(),
            control_dir: control_dir.into(),
            trigger_command: None,
        }
    }

    pub fn with_trigger_command(mut self, trigger_command: Vec<String>) -> Self {
        self.trigger_command = Some(trigger_command);
        self
    }

    pub fn trusted_keys_dir(&self) -> &Path {
        &self.trusted_keys_dir
    }

    pub fn command_file_path(&self) -> PathBuf {
        self.control_dir.join(RECOVERY_COMMAND_FILE)
    }

    pub fn load_trusted_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let entries = fs::read_dir(&self.trusted_keys_dir).with_context(|| {
            format!(
                "failed to read trusted key store: {}",
                self.trusted_keys_dir.display()
            )
        })?;
        for entry in entries {
            let entry = entry.with_context(|| {
                format!(
                    "failed reading trusted key store entry: {}",
                    self.trusted_keys_dir.display()
                )
            })?;
            let path = entry.path();
            if path.extension().and_then(|v| v.to_str()) != Some("pub") {
                continue;
            }
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read trusted key: {}", path.display()))?;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            keys.push(trimmed.to_string());
        }
        keys.sort();
        Ok(keys)
    }

    fn verify_package(&self, package: &Path) -> Result<Verification> {
        let metadata = fs::metadata(package)
            .with_context(|| format!("failed to stat staged package: {}", package.display()))?;
        let total_len = metadata.len();
        if total_len <= SIGNATURE_TRAILER_LEN {
            return Ok(Verification::Rejected {
                reason: format!(
                    "package is too short ({total_len} bytes) to carry a signature trailer"
                ),
            });
        }
        let payload_len = total_len - SIGNATURE_TRAILER_LEN;

        let mut file = File::open(package)
            .with_context(|| format!("failed to open staged package: {}", package.display()))?;
        let digest = sha256_digest_reader(&mut (&mut file).take(payload_len))
            .with_context(|| format!("failed to hash staged package: {}", package.display()))?;

        let mut trailer = [0u8; SIGNATURE_TRAILER_LEN as usize];
        file.read_exact(&mut trailer).with_context(|| {
            format!(
                "failed to read signature trailer of staged package: {}",
                package.display()
            )
        })?;

        let keys = self.load_trusted_keys()?;
        if keys.is_empty() {
            return Ok(Verification::Rejected {
                reason: format!(
                    "trust store {} holds no keys",
                    self.trusted_keys_dir.display()
                ),
            });
        }

        for key in &keys {
            // A malformed key file must not mask a valid key elsewhere in
            // the store.
            match verify_ed25519_signature(&digest, key, &trailer) {
                Ok(true) => return Ok(Verification::Trusted),
                Ok(false) => continue,
                Err(_) => continue,
            }
        }

        Ok(Verification::Rejected {
            reason: "signature does not match any trusted key".to_string(),
        })
    }

    pub(crate) fn install_with_runner<RunCommand>(
        &self,
        package: &Path,
        mut run: RunCommand,
    ) -> Result<()>
    where
        RunCommand: FnMut(&mut Command, &str) -> Result<()>,
    {
        fs::create_dir_all(&self.control_dir).with_context(|| {
            format!(
                "failed to create recovery control dir: {}",
                self.control_dir.display()
            )
        })?;

        let command_path = self.command_file_path();
        fs::write(
            &command_path,
            format!("--update_package={}\n", package.display()),
        )
        .with_context(|| {
            format!(
                "failed to write recovery command file: {}",
                command_path.display()
            )
        })?;

        if let Some(trigger) = &self.trigger_command {
            let (program, args) = trigger
                .split_first()
                .ok_or_else(|| anyhow!("trigger command must name a program"))?;
            let mut command = Command::new(program);
            command.args(args);
            run(&mut command, "failed to trigger the platform installer")?;
        }

        Ok(())
    }
}

impl InstallSurface for RecoveryInstaller {
    fn verify(&self, package: &Path) -> Result<Verification> {
        self.verify_package(package)
    }

    fn install(&self, package: &Path) -> Result<()> {
        self.install_with_runner(package, run_command)
    }
}

pub(crate) fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    let output = command
        .output()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    Err(anyhow!(
        "{context_message}: status={} stdout='{}' stderr='{}'",
        output.status,
        stdout.trim(),
        stderr.trim()
    ))
}
