// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health endpoint.
//!
//! `GET <healthPath>` answers with a fixed body; any other method on the
//! path is a 404, and a disabled health path never reaches this module.

use hyper::{Method, Response};
use reqwest::Body;

use super::simple_response;

/// The fixed health response body.
pub const HEALTH_UP_BODY: &str = "{ \"status\": \"UP\" }";

/// Answer a request that hit the configured health path.
pub fn respond(method: &Method) -> Response<Body> {
    if method == Method::GET {
        let mut response = simple_response(200, Body::from(HEALTH_UP_BODY));
        response.headers_mut().insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("application/json"),
        );
        response
    } else {
        simple_response(404, Body::from("Not Found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_up_body() {
        let response = respond(&Method::GET);
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()[hyper::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_other_methods_are_not_found() {
        assert_eq!(respond(&Method::POST).status(), 404);
        assert_eq!(respond(&Method::DELETE).status(), 404);
        assert_eq!(respond(&Method::HEAD).status(), 404);
    }

    #[test]
    fn test_body_is_the_exact_contract() {
        assert_eq!(HEALTH_UP_BODY, "{ \"status\": \"UP\" }");
    }
}
