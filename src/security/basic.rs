// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Basic authentication gate.

use base64::{engine::general_purpose, Engine as _};
use log::warn;
use subtle::ConstantTimeEq;

use crate::error::ProxyError;

const BASIC: &str = "basic ";

/// Validates `Authorization: Basic` headers against a single `user:password`
/// credential pair.
#[derive(Debug)]
pub struct BasicAuthGate {
    username: String,
    password: String,
}

impl BasicAuthGate {
    /// Create a gate from a `user:password` credential string. A credential
    /// without a colon is treated as a username with an empty password.
    pub fn new(credential: &str) -> Self {
        let (username, password) = credential.split_once(':').unwrap_or((credential, ""));
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Validate credentials using constant-time comparison, so response
    /// timing leaks neither the username nor the password.
    fn validate_constant_time(&self, username: &str, password: &str) -> bool {
        let username_match = self.username.as_bytes().ct_eq(username.as_bytes());
        let password_match = self.password.as_bytes().ct_eq(password.as_bytes());
        bool::from(username_match & password_match)
    }

    /// Check an `Authorization` header value. `Ok(())` admits the request;
    /// any failure is a [`ProxyError::SecurityError`], which the engine
    /// answers with an unauthorized response.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), ProxyError> {
        let header = match authorization {
            Some(h) => h,
            None => {
                return Err(self.reject("Missing authorization header"));
            }
        };

        if !header.to_lowercase().starts_with(BASIC) {
            return Err(self.reject(&format!(
                "Invalid authorization scheme: expected 'Basic', got '{}'",
                header.split_whitespace().next().unwrap_or("")
            )));
        }

        let encoded = header[BASIC.len()..].trim();
        if encoded.is_empty() {
            return Err(self.reject("Empty basic auth credentials"));
        }

        let decoded = match general_purpose::STANDARD.decode(encoded) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(s) => s,
                Err(e) => {
                    return Err(self.reject(&format!("Invalid UTF-8 in credentials: {e}")));
                }
            },
            Err(e) => {
                return Err(self.reject(&format!("Failed to base64 decode credentials: {e}")));
            }
        };

        let (username, password) = decoded.split_once(':').unwrap_or((decoded.as_str(), ""));

        if self.validate_constant_time(username, password) {
            Ok(())
        } else {
            Err(self.reject("Invalid basic auth credentials"))
        }
    }

    fn reject(&self, reason: &str) -> ProxyError {
        let err = ProxyError::SecurityError(reason.to_string());
        warn!("{err}");
        err
    }
}
