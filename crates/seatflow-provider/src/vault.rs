//! AES-256-GCM credential vault.
//!
//! Stored credentials are encrypted with a process-wide master key; the
//! transport encoding is base64 over `nonce || ciphertext` with a random
//! 12-byte nonce per entry.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use rand::rngs::OsRng;

use seatflow_core::config::vault::VaultConfig;
use seatflow_core::error::AppError;
use seatflow_core::result::AppResult;
use seatflow_core::traits::CredentialVault;

const NONCE_LEN: usize = 12;
const MASTER_KEY_LEN: usize = 32;

/// Credential vault backed by AES-256-GCM.
#[derive(Clone)]
pub struct AesCredentialVault {
    cipher: Aes256Gcm,
}

impl AesCredentialVault {
    /// Build a vault from configuration. The master key must decode to
    /// exactly 32 bytes.
    pub fn new(config: &VaultConfig) -> AppResult<Self> {
        let key = BASE64
            .decode(&config.master_key_b64)
            .map_err(|e| AppError::configuration(format!("Vault master key is not base64: {e}")))?;
        if key.len() != MASTER_KEY_LEN {
            return Err(AppError::configuration(format!(
                "Vault master key must be {MASTER_KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|_| AppError::configuration("Vault master key rejected by cipher"))?;
        Ok(Self { cipher })
    }
}

impl std::fmt::Debug for AesCredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesCredentialVault").finish_non_exhaustive()
    }
}

impl CredentialVault for AesCredentialVault {
    fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| AppError::credential("Credential encryption failed"))?;

        let mut raw = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(raw))
    }

    fn decrypt(&self, ciphertext: &str) -> AppResult<String> {
        let raw = BASE64
            .decode(ciphertext)
            .map_err(|_| AppError::credential("Credential ciphertext is not valid base64"))?;
        if raw.len() <= NONCE_LEN {
            return Err(AppError::credential("Credential ciphertext is truncated"));
        }
        let (nonce, body) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| AppError::credential("Credential decryption failed"))?;
        String::from_utf8(plaintext)
            .map_err(|_| AppError::credential("Decrypted credential is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatflow_core::error::ErrorKind;

    fn vault_with_key(byte: u8) -> AesCredentialVault {
        let config = VaultConfig {
            master_key_b64: BASE64.encode([byte; MASTER_KEY_LEN]),
        };
        AesCredentialVault::new(&config).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let vault = vault_with_key(7);
        let ciphertext = vault.encrypt("sk-team-token").unwrap();
        assert_ne!(ciphertext, "sk-team-token");
        assert_eq!(vault.decrypt(&ciphertext).unwrap(), "sk-team-token");
    }

    #[test]
    fn test_nonce_makes_ciphertexts_differ() {
        let vault = vault_with_key(7);
        let a = vault.encrypt("same input").unwrap();
        let b = vault.encrypt("same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails_decryption() {
        let ciphertext = vault_with_key(7).encrypt("secret").unwrap();
        let err = vault_with_key(8).decrypt(&ciphertext).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Credential);
    }

    #[test]
    fn test_garbage_input_fails() {
        let vault = vault_with_key(7);
        assert!(vault.decrypt("not base64 !!!").is_err());
        assert!(vault.decrypt(&BASE64.encode(b"short")).is_err());
    }

    #[test]
    fn test_bad_master_key_rejected() {
        let config = VaultConfig {
            master_key_b64: BASE64.encode([1u8; 16]),
        };
        let err = AesCredentialVault::new(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
