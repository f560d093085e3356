//! Credential vault configuration.

use serde::{Deserialize, Serialize};

/// Settings for the credential vault that protects stored team
/// access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Base64-encoded 32-byte AES-256-GCM master key.
    pub master_key_b64: String,
}
