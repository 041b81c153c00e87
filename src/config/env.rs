// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Environment variable-based configuration provider implementation.

use std::collections::HashMap;
use std::env;

use serde_json::{json, Value};

use super::ConfigError;
use super::ConfigProvider;

/// Configuration provider that retrieves values from environment variables.
///
/// Variable names are mapped onto the camelCase properties surface:
/// `WARREN_HEALTH_PATH` becomes `healthPath`, `WARREN_NETWORK_PROXY_NODES`
/// becomes `networkProxyNodes`.
#[derive(Debug)]
pub struct EnvConfigProvider {
    /// Prefix for environment variables (e.g., "WARREN_").
    prefix: String,
    /// Cache of environment variables that match the prefix.
    cache: HashMap<String, String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable configuration provider with the specified prefix.
    pub fn new(prefix: &str) -> Self {
        let mut provider = Self {
            prefix: prefix.to_string(),
            cache: HashMap::new(),
        };

        // Pre-load all environment variables with the specified prefix
        provider.refresh_cache();

        provider
    }

    /// Refresh the cache of environment variables.
    pub fn refresh_cache(&mut self) {
        self.cache.clear();

        for (key, value) in env::vars() {
            if key.starts_with(&self.prefix) {
                let config_key = Self::to_camel_case(&key[self.prefix.len()..]);
                self.cache.insert(config_key, value);
            }
        }
    }

    /// Convert `HEALTH_PATH` style variable suffixes to `healthPath` keys.
    fn to_camel_case(suffix: &str) -> String {
        let mut key = String::with_capacity(suffix.len());

        for (i, segment) in suffix.split('_').filter(|s| !s.is_empty()).enumerate() {
            let segment = segment.to_lowercase();
            if i == 0 {
                key.push_str(&segment);
            } else {
                let mut chars = segment.chars();
                if let Some(first) = chars.next() {
                    key.push(first.to_ascii_uppercase());
                    key.push_str(chars.as_str());
                }
            }
        }

        key
    }

    /// Parse a string value into a JSON Value.
    fn parse_value_to_json(&self, value: &str) -> Result<Value, ConfigError> {
        // Try boolean
        if value.eq_ignore_ascii_case("true") {
            return Ok(json!(true));
        } else if value.eq_ignore_ascii_case("false") {
            return Ok(json!(false));
        }

        // Try number
        if let Ok(int_val) = value.parse::<i64>() {
            return Ok(json!(int_val));
        }

        if let Ok(float_val) = value.parse::<f64>() {
            return Ok(json!(float_val));
        }

        // Default to string; node DSL strings stay verbatim
        Ok(json!(value))
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new("WARREN_")
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_raw(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        match self.cache.get(key) {
            Some(value) => self.parse_value_to_json(value).map(Some),
            None => Ok(None),
        }
    }

    fn has(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    fn provider_name(&self) -> &str {
        "env"
    }
}
