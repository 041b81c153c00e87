// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests {
    use crate::security::BasicAuthGate;
    use base64::{engine::general_purpose, Engine as _};

    fn basic_header(user: &str, password: &str) -> String {
        format!(
            "Basic {}",
            general_purpose::STANDARD.encode(format!("{user}:{password}"))
        )
    }

    #[test]
    fn test_valid_credentials_pass() {
        let gate = BasicAuthGate::new("user:password");
        let header = basic_header("user", "password");
        assert!(gate.authorize(Some(&header)).is_ok());
    }

    #[test]
    fn test_missing_header_rejected() {
        let gate = BasicAuthGate::new("user:password");
        assert!(gate.authorize(None).is_err());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let gate = BasicAuthGate::new("user:password");
        let header = basic_header("user", "nope");
        assert!(gate.authorize(Some(&header)).is_err());
    }

    #[test]
    fn test_wrong_username_rejected() {
        let gate = BasicAuthGate::new("user:password");
        let header = basic_header("admin", "password");
        assert!(gate.authorize(Some(&header)).is_err());
    }

    #[test]
    fn test_non_basic_scheme_rejected() {
        let gate = BasicAuthGate::new("user:password");
        assert!(gate.authorize(Some("Bearer token123")).is_err());
    }

    #[test]
    fn test_malformed_base64_rejected() {
        let gate = BasicAuthGate::new("user:password");
        assert!(gate.authorize(Some("Basic !!!not-base64!!!")).is_err());
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let gate = BasicAuthGate::new("user:password");
        let encoded = general_purpose::STANDARD.encode("user:password");
        assert!(gate.authorize(Some(&format!("basic {encoded}"))).is_ok());
        assert!(gate.authorize(Some(&format!("BASIC {encoded}"))).is_ok());
    }

    #[test]
    fn test_password_containing_colon() {
        let gate = BasicAuthGate::new("user:pass:word");
        let header = basic_header("user", "pass:word");
        assert!(gate.authorize(Some(&header)).is_ok());
    }

    #[test]
    fn test_credential_without_colon_means_empty_password() {
        let gate = BasicAuthGate::new("user");
        let header = basic_header("user", "");
        assert!(gate.authorize(Some(&header)).is_ok());

        let wrong = basic_header("user", "something");
        assert!(gate.authorize(Some(&wrong)).is_err());
    }
}
