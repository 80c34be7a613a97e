//! Engine configuration
//!
//! Sizing for the tween pool and defaults applied to new tweens. Every field
//! is optional in TOML; missing fields take their defaults.
//!
//! ```toml
//! pool_capacity = 200
//! cache_capacity = 32
//! default_easing = "EaseOutCubic"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::Result;

/// Tween engine configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Tween shells prewarmed in the fixed pool
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,
    /// Shells kept in the LRU fallback cache once the fixed pool is full
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Properties records available to freshly allocated shells
    #[serde(default = "default_properties_capacity")]
    pub properties_capacity: usize,
    /// Easing used by tweens that set neither an easing nor a curve
    #[serde(default)]
    pub default_easing: Easing,
}

fn default_pool_capacity() -> usize {
    400
}

fn default_cache_capacity() -> usize {
    64
}

fn default_properties_capacity() -> usize {
    400
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_capacity: default_pool_capacity(),
            cache_capacity: default_cache_capacity(),
            properties_capacity: default_properties_capacity(),
            default_easing: Easing::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML source
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        tracing::debug!(
            "engine config: pool={} cache={} properties={}",
            config.pool_capacity,
            config.cache_capacity,
            config.properties_capacity
        );
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("loading engine config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_default_easing(mut self, easing: Easing) -> Self {
        self.default_easing = easing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TweenError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.pool_capacity, 400);
        assert_eq!(config.cache_capacity, 64);
        assert_eq!(config.properties_capacity, 400);
        assert_eq!(config.default_easing, Easing::Linear);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            pool_capacity = 8
            default_easing = "EaseOutBounce"
            "#,
        )
        .unwrap();
        assert_eq!(config.pool_capacity, 8);
        assert_eq!(config.cache_capacity, 64);
        assert_eq!(config.default_easing, Easing::EaseOutBounce);
    }

    #[test]
    fn test_invalid_toml() {
        let err = EngineConfig::from_toml_str("pool_capacity = \"many\"").unwrap_err();
        assert!(matches!(err, TweenError::Config(_)));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glide.toml");
        fs::write(&path, "cache_capacity = 3\n").unwrap();

        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.cache_capacity, 3);

        let missing = EngineConfig::from_path(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, TweenError::Io(_)));
    }
}
