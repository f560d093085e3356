//! External invitation provider configuration.

use serde::{Deserialize, Serialize};

/// Settings for the workspace provider that receives invitation calls.
///
/// The provider owns its own retry and timeout policy; the orchestrator
/// only reacts to the final success/failure outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API.
    pub base_url: String,
    /// Request timeout in seconds for provider calls.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}
