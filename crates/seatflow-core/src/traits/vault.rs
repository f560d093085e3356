//! Credential vault trait.

use crate::result::AppResult;

/// Encrypts and decrypts stored team credentials.
///
/// Decryption failure is a `Credential` error and, when it happens after
/// a committed reservation, triggers compensation.
pub trait CredentialVault: Send + Sync + 'static {
    /// Encrypt a plaintext credential for storage.
    fn encrypt(&self, plaintext: &str) -> AppResult<String>;

    /// Decrypt a stored credential ciphertext.
    fn decrypt(&self, ciphertext: &str) -> AppResult<String>;
}
