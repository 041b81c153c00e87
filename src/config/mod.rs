// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Warren configuration subsystem
//!
//! The subsystem is deliberately **pluggable**.  A running proxy is created
//! from an ordered list of [`ConfigProvider`]s; later providers override
//! earlier ones.  Typical stacking order looks like this:
//!
//! 1. `FileConfigProvider` – `networkproxy.properties` (or JSON/TOML/YAML)
//! 2. `EnvConfigProvider`  – `WARREN_HEALTH_PATH=/q/health`
//! 3. *your* provider implementing [`ConfigProvider`]
//!
//! Calling [`Config::get`] is therefore *deterministic*: the highest-priority
//! provider that yields a key wins.
//!
//! Raw values resolved through the chain are folded into a typed
//! [`ProxySettings`], which applies the lenient coercion rules of the
//! properties surface: an invalid scalar keeps the default and logs a
//! warning instead of failing resolution.

mod env;
pub mod error;
mod file;
mod settings;


pub use env::EnvConfigProvider;
pub use error::ConfigError;
pub use file::FileConfigProvider;
pub use settings::{ProxySettings, VerboseLevel};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Core configuration provider trait that all configuration sources must implement.
/// This trait is object-safe since it doesn't contain generic methods.
pub trait ConfigProvider: Debug + Send + Sync {
    /// Check if the configuration provider has a value for the given key.
    fn has(&self, key: &str) -> bool;

    /// Get the name of the configuration provider for debugging purposes.
    fn provider_name(&self) -> &str;

    /// Get a raw configuration value by key.
    /// Returns a JSON Value that can be later deserialized into specific types.
    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError>;
}

/// Extension trait for ConfigProvider that provides methods for typed access.
/// This trait is not object-safe because it has generic methods.
pub trait ConfigProviderExt: ConfigProvider {
    /// Get a configuration value by key and deserialize it to the specified type.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get_raw(key)? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                ConfigError::ParseError(format!("failed to deserialize '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }
}

// Implement ConfigProviderExt for any type that implements ConfigProvider
impl<T: ConfigProvider> ConfigProviderExt for T {}

/// Builder for the configuration system.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    providers: Vec<Arc<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    /// Create a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration provider.
    pub fn with_provider<P: ConfigProvider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Config {
        Config {
            providers: self.providers,
        }
    }
}

/// Main configuration struct that holds all providers and handles retrieving values.
#[derive(Debug, Clone, Default)]
pub struct Config {
    providers: Vec<Arc<dyn ConfigProvider>>,
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Get a raw configuration value.
    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        // Iterate through providers in reverse order to respect priority
        // Later providers (higher index) should override earlier ones
        for provider in self.providers.iter().rev() {
            if provider.has(key) {
                return provider.get_raw(key);
            }
        }
        Ok(None)
    }

    /// Check whether any provider in the chain carries the given key.
    pub fn has(&self, key: &str) -> bool {
        self.providers.iter().any(|p| p.has(key))
    }

    /// Get a configuration value by key, checking all providers in priority order.
    /// Returns the first value found.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get_raw(key)? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                ConfigError::ParseError(format!("failed to deserialize '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }

    /// Get a configuration value by key with a default fallback value.
    pub fn get_or_default<T: DeserializeOwned>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.get(key)? {
            Some(value) => Ok(value),
            None => Ok(default),
        }
    }

    /// Get a raw value without deserializing, for callers that coerce themselves.
    pub fn get_value(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        self.get_raw(key)
    }

    /// Create a default configuration using the file-based provider.
    pub fn default_file(file_path: &str) -> Result<Self, ConfigError> {
        let provider = FileConfigProvider::new(file_path)?;
        Ok(Self::builder().with_provider(provider).build())
    }
}
