//! Exchange-level configuration

use serde::{Deserialize, Serialize};

/// Top-level configuration for one exchange deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Character cap for a single message's compact rendering
    pub compact_chars: usize,
    /// Default trajectory token budget when the caller passes none
    pub default_max_tokens: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            compact_chars: 2000,
            default_max_tokens: 4000,
        }
    }
}
