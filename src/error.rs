// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error type shared by everything downstream of configuration resolution.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while compiling or serving the proxy topology.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Upstream HTTP client error
    #[error("HTTP client error: {0}")]
    ClientError(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The upstream call exceeded the configured request budget
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// No route matched the request
    #[error("routing error: {0}")]
    RoutingError(String),

    /// The matched pool had no backend capacity
    #[error("no backend available: {0}")]
    Unavailable(String),

    /// Authentication gate rejected the request
    #[error("security error: {0}")]
    SecurityError(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<crate::config::ConfigError> for ProxyError {
    fn from(err: crate::config::ConfigError) -> Self {
        ProxyError::ConfigError(err.to_string())
    }
}
