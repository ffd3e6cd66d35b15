use std::io::Read;

use anyhow::{anyhow, Context, Result};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

pub fn sha256_hex(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

pub fn sha256_digest_reader(reader: &mut impl Read) -> Result<[u8; 32]> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = reader
            .read(&mut buffer)
            .context("failed to read payload while hashing")?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().into())
}

pub fn verify_ed25519_signature(
    payload: &[u8],
    public_key_hex: &str,
    signature_bytes: &[u8],
) -> Result<bool> {
    let public_key_bytes =
        hex::decode(public_key_hex.trim()).context("failed to decode Ed25519 public key hex")?;
    let public_key_len = public_key_bytes.len();
    let public_key_array: [u8; 32] = public_key_bytes.try_into().map_err(|_| {
        anyhow!(
            "invalid Ed25519 public key length: expected 32 bytes, got {}",
            public_key_len
        )
    })?;

    let signature_len = signature_bytes.len();
    let signature_array: [u8; 64] = signature_bytes.try_into().map_err(|_| {
        anyhow!(
            "invalid Ed25519 signature length: expected 64 bytes, got {}",
            signature_len
        )
    })?;

    let verifying_key =
        VerifyingKey::from_bytes(&public_key_array).context("invalid Ed25519 public key bytes")?;
    let signature = Signature::from_bytes(&signature_array);

    Ok(verifying_key.verify(payload, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn test_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    #[test]
    fn verify_accepts_valid_signature() {
        let key = test_key();
        let payload = sha256_digest_reader(&mut b"firmware".as_slice()).expect("must hash");
        let signature = key.sign(&payload);
        let public_key_hex = hex::encode(key.verifying_key().to_bytes());

        let verified =
            verify_ed25519_signature(&payload, &public_key_hex, &signature.to_bytes())
                .expect("verification must complete");
        assert!(verified);
    }

    #[test]
    fn verify_returns_false_for_tampered_payload() {
        let key = test_key();
        let payload = sha256_digest_reader(&mut b"firmware".as_slice()).expect("must hash");
        let signature = key.sign(&payload);
        let public_key_hex = hex::encode(key.verifying_key().to_bytes());

        let tampered = sha256_digest_reader(&mut b"tampered".as_slice()).expect("must hash");
        let verified =
            verify_ed25519_signature(&tampered, &public_key_hex, &signature.to_bytes())
                .expect("verification must complete");
        assert!(!verified);
    }

    #[test]
    fn verify_errors_for_invalid_public_key_hex_or_length() {
        let payload = [0u8; 32];
        let signature = [0u8; 64];

        let invalid_hex = verify_ed25519_signature(&payload, "zz", &signature);
        assert!(invalid_hex.is_err());

        let invalid_length = verify_ed25519_signature(&payload, "00", &signature);
        assert!(invalid_length.is_err());
    }

    #[test]
    fn verify_errors_for_invalid_signature_length() {
        let key = test_key();
        let public_key_hex = hex::encode(key.verifying_key().to_bytes());

        let invalid = verify_ed25519_signature(&[0u8; 32], &public_key_hex, &[0u8; 12]);
        assert!(invalid.is_err());
    }

    #[test]
    fn sha256_digest_reader_matches_one_shot_digest() {
        let payload = vec![0xC3u8; 100_000];
        let streamed = sha256_digest_reader(&mut payload.as_slice()).expect("must hash");
        assert_eq!(hex::encode(streamed), sha256_hex(&payload));
    }
}
