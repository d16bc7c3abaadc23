//! Compressor configuration

use serde::{Deserialize, Serialize};

use flow_core::{FlowError, Result};

/// Tuning knobs for [`crate::ContextCompressor`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressorConfig {
    /// Characters per estimated token
    pub chars_per_token: usize,

    /// Free-text fields longer than this get an extractive summary
    pub long_text_threshold: usize,

    /// Character cap for an extractive summary
    pub summary_max_chars: usize,

    /// Strings at most this long count as categorical, not narrative
    pub categorical_max_chars: usize,

    /// Messages kept per data kind under temporal compression (`k`)
    pub keep_per_type: usize,

    /// Character cap for concatenated text fields in a merged message
    pub merged_text_max_chars: usize,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            chars_per_token: 4,
            long_text_threshold: 200,
            summary_max_chars: 500,
            categorical_max_chars: 32,
            keep_per_type: 1,
            merged_text_max_chars: 800,
        }
    }
}

impl CompressorConfig {
    /// Create a new configuration builder
    pub fn builder() -> CompressorConfigBuilder {
        CompressorConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.chars_per_token == 0 {
            return Err(FlowError::Config(
                "chars_per_token must be greater than 0".to_string(),
            ));
        }
        if self.keep_per_type == 0 {
            return Err(FlowError::Config(
                "keep_per_type must be greater than 0".to_string(),
            ));
        }
        if self.summary_max_chars == 0 {
            return Err(FlowError::Config(
                "summary_max_chars must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`CompressorConfig`]
#[derive(Debug, Default)]
pub struct CompressorConfigBuilder {
    chars_per_token: Option<usize>,
    long_text_threshold: Option<usize>,
    summary_max_chars: Option<usize>,
    categorical_max_chars: Option<usize>,
    keep_per_type: Option<usize>,
    merged_text_max_chars: Option<usize>,
}

impl CompressorConfigBuilder {
    /// Set characters per estimated token
    pub fn chars_per_token(mut self, chars: usize) -> Self {
        self.chars_per_token = Some(chars);
        self
    }

    /// Set the long-text summarization threshold
    pub fn long_text_threshold(mut self, chars: usize) -> Self {
        self.long_text_threshold = Some(chars);
        self
    }

    /// Set the extractive-summary character cap
    pub fn summary_max_chars(mut self, chars: usize) -> Self {
        self.summary_max_chars = Some(chars);
        self
    }

    /// Set the categorical-string length cutoff
    pub fn categorical_max_chars(mut self, chars: usize) -> Self {
        self.categorical_max_chars = Some(chars);
        self
    }

    /// Set how many messages to keep per data kind (`k`)
    pub fn keep_per_type(mut self, k: usize) -> Self {
        self.keep_per_type = Some(k);
        self
    }

    /// Set the merged-text character cap
    pub fn merged_text_max_chars(mut self, chars: usize) -> Self {
        self.merged_text_max_chars = Some(chars);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<CompressorConfig> {
        let defaults = CompressorConfig::default();

        let config = CompressorConfig {
            chars_per_token: self.chars_per_token.unwrap_or(defaults.chars_per_token),
            long_text_threshold: self.long_text_threshold.unwrap_or(defaults.long_text_threshold),
            summary_max_chars: self.summary_max_chars.unwrap_or(defaults.summary_max_chars),
            categorical_max_chars: self
                .categorical_max_chars
                .unwrap_or(defaults.categorical_max_chars),
            keep_per_type: self.keep_per_type.unwrap_or(defaults.keep_per_type),
            merged_text_max_chars: self
                .merged_text_max_chars
                .unwrap_or(defaults.merged_text_max_chars),
        };

        config.validate()?;
        Ok(config)
    }
}
