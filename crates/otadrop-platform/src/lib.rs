mod recovery;
mod signature;

use std::path::Path;

use anyhow::Result;

pub use recovery::{RecoveryInstaller, RECOVERY_COMMAND_FILE, SIGNATURE_TRAILER_LEN};
pub use signature::{sha256_digest_reader, sha256_hex, verify_ed25519_signature};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Trusted,
    Rejected { reason: String },
}

// The platform trust boundary: verify consults the host trust root only,
// install hands the package to the host update mechanism. An Err from
// either method is an I/O failure, not a trust decision.
pub trait InstallSurface {
    fn verify(&self, package: &Path) -> Result<Verification>;
    fn install(&self, package: &Path) -> Result<()>;
}
