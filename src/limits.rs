//! Configurable bounds for tokenization, arena growth and value vectors.

use serde::{Deserialize, Serialize};

use crate::error::SkinError;

pub const MAX_EXPRESSION_LENGTH: usize = 4096;
pub const MAX_TOKEN_LENGTH: usize = 1024;
pub const MAX_NUM_TOKENS: usize = 512;
pub const NODE_POOL_SIZE: usize = 4096;
pub const MAX_VALUES: usize = 4096;
pub const MAX_NAME_LENGTH: usize = 256;

/// Node ids are `u32`, so no arena may hold more nodes than this.
pub const MAX_ARENA_CAPACITY: usize = u32::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Upper bounds applied while lexing, parsing and evaluating.
///
/// Every field falls back to its default when omitted from JSON input.
pub struct Limits {
    /// Maximum expression length in bytes.
    pub max_expression_len: usize,
    /// Maximum length of a single token in bytes.
    pub max_token_len: usize,
    /// Maximum number of tokens per expression.
    pub max_tokens: usize,
    /// Number of nodes an arena can hold.
    pub arena_capacity: usize,
    /// Maximum number of values in a node's vector.
    pub max_values: usize,
    /// Maximum length of a leaf name (bound input or literal text).
    pub max_name_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_expression_len: MAX_EXPRESSION_LENGTH,
            max_token_len: MAX_TOKEN_LENGTH,
            max_tokens: MAX_NUM_TOKENS,
            arena_capacity: NODE_POOL_SIZE,
            max_values: MAX_VALUES,
            max_name_len: MAX_NAME_LENGTH,
        }
    }
}

impl Limits {
    /// Parses limits from JSON text, validating that every bound is non-zero.
    pub fn from_json_str(input: &str) -> Result<Self, SkinError> {
        let limits: Limits = serde_json::from_str(input)
            .map_err(|e| SkinError::Config(format!("invalid limits: {e}")))?;
        limits.validate()?;
        Ok(limits)
    }

    /// Rejects zero bounds and arena capacities that node ids cannot address.
    pub fn validate(&self) -> Result<(), SkinError> {
        let fields = [
            ("max_expression_len", self.max_expression_len),
            ("max_token_len", self.max_token_len),
            ("max_tokens", self.max_tokens),
            ("arena_capacity", self.arena_capacity),
            ("max_values", self.max_values),
            ("max_name_len", self.max_name_len),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(SkinError::Config(format!("{name} must be greater than 0")));
            }
        }
        if self.arena_capacity > MAX_ARENA_CAPACITY {
            return Err(SkinError::Config(format!(
                "arena_capacity must be at most {MAX_ARENA_CAPACITY}"
            )));
        }
        Ok(())
    }
}
