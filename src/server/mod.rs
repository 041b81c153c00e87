// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP engine for Warren.
//!
//! The server is a *thin* wrapper around **hyper-util**. It owns the
//! listening socket and walks each request through the compiled
//! [`DispatchTable`]: health check, route lookup, authentication gate,
//! backend-pool acquisition, forward via reqwest.
//!
//! **Protocol support**
//! Uses `hyper_util::server::conn::auto::Builder`, so the same connection
//! transparently handles both HTTP/1.1 *and* HTTP/2; no protocol-specific
//! logic lives here.
//!
//! ## Body streaming
//! Inbound bodies are **streamed** straight into the upstream connection,
//! and upstream response bodies are streamed back. The backend-pool slot is
//! held until the response body finishes streaming.

mod access;
mod health;

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as AutoBuilder;
use log::{debug, error, info, warn};
use reqwest::Body;
use tokio::signal;
use url::Url;

use crate::config::ProxySettings;
use crate::dispatch::{DispatchTable, RouteTarget};
use crate::error::ProxyError;
use crate::logging::lifecycle;
use crate::topology::{HttpMethod, Topology};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// HTTP server serving a compiled dispatch table.
#[derive(Debug, Clone)]
pub struct ProxyServer {
    settings: Arc<ProxySettings>,
    topology: Arc<Topology>,
    table: Arc<DispatchTable>,
    client: reqwest::Client,
}

/// Shared per-request context.
#[derive(Debug, Clone)]
struct ServerContext {
    settings: Arc<ProxySettings>,
    table: Arc<DispatchTable>,
    client: reqwest::Client,
}

impl ProxyServer {
    /// Create a new proxy server over a compiled dispatch table.
    ///
    /// The upstream client carries no global timeout; the per-route request
    /// budget is enforced around each forwarded call instead.
    pub fn new(
        settings: Arc<ProxySettings>,
        topology: Arc<Topology>,
        table: Arc<DispatchTable>,
    ) -> Result<Self, ProxyError> {
        // redirects pass through to the client untouched
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(ProxyError::ClientError)?;

        Ok(Self {
            settings,
            topology,
            table,
            client,
        })
    }

    /// The compiled dispatch table this server queries.
    pub fn dispatch_table(&self) -> &Arc<DispatchTable> {
        &self.table
    }

    /// Bind and run the accept loop until Ctrl-C or SIGTERM.
    ///
    /// A bind failure emits the failure banner and surfaces as an `Err`;
    /// whether to terminate the process is the caller's decision.
    pub async fn start(&self) -> Result<(), ProxyError> {
        let addr = format!("{}:{}", self.settings.hostname, self.settings.port);

        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                self.print_startup_failure();
                warn!(
                    "Could not start proxy [{}] on port [{}]: {e}",
                    self.settings.hostname, self.settings.port
                );
                return Err(e.into());
            }
        };
        let local_addr = listener.local_addr()?;

        if self.settings.verbose_level.prints_banner() {
            lifecycle::print_startup(&self.settings, &self.topology, Some(local_addr));
        }
        info!("Warren proxy listening on http://{local_addr}");

        // prepare signal futures (no errors at creation)
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let mut term_stream = signal(SignalKind::terminate())
            .map_err(|e| ProxyError::Other(format!("Cannot install SIGTERM handler: {e}")))?;

        #[cfg(unix)]
        let sigterm = term_stream.recv();
        #[cfg(not(unix))]
        let sigterm = std::future::pending::<Option<()>>();

        tokio::pin!(ctrl_c);
        tokio::pin!(sigterm);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Received Ctrl-C; shutting down");
                    break;
                }
                _ = &mut sigterm => {
                    info!("Received SIGTERM; shutting down");
                    break;
                }
                accept = listener.accept() => {
                    match accept {
                        Ok((stream, remote_addr)) => {
                            let context = ServerContext {
                                settings: self.settings.clone(),
                                table: self.table.clone(),
                                client: self.client.clone(),
                            };
                            let client_ip = remote_addr.ip().to_string();

                            tokio::spawn(async move {
                                let service = service_fn(move |req: Request<Incoming>| {
                                    handle_request(req, context.clone(), client_ip.clone())
                                });
                                let io = TokioIo::new(stream);

                                let builder = {
                                    let mut b = AutoBuilder::new(TokioExecutor::new());
                                    b.http1();
                                    b.http2();
                                    b
                                };

                                if let Err(e) = builder.serve_connection(io, service).await {
                                    let err_str = e.to_string();
                                    if !err_str.contains("connection closed")
                                        && !err_str.contains("connection reset")
                                    {
                                        error!("Connection error: {e}");
                                    }
                                }
                            });
                        }
                        Err(e) => error!("Accept error: {e}"),
                    }
                }
            }
        }

        info!("Shutdown complete");
        Ok(())
    }

    fn print_startup_failure(&self) {
        if self.settings.verbose_level.prints_banner() {
            lifecycle::print_startup(&self.settings, &self.topology, None);
        }
    }
}

/// Handle an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    context: ServerContext,
    client_ip: String,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();
    let version = format!("{:?}", req.version());
    let referer = header_string(&req, hyper::header::REFERER);
    let user_agent = header_string(&req, hyper::header::USER_AGENT);

    debug!("Received request: {method} {path}");

    let response = match process_request(req, &context).await {
        Ok(response) => response,
        Err(e) => error_response(&e, &method, &path),
    };

    access::record(
        &context.settings,
        &client_ip,
        &method,
        &path,
        &version,
        response.status().as_u16(),
        referer.as_deref(),
        user_agent.as_deref(),
    );

    Ok(response)
}

/// Walk a request through health check, dispatch lookup, authentication
/// gate and backend forwarding.
async fn process_request(
    req: Request<Incoming>,
    context: &ServerContext,
) -> Result<Response<Body>, ProxyError> {
    let path = req.uri().path().to_owned();

    // the health endpoint is answered before any routing
    if let Some(health_path) = context.settings.health_path.as_deref() {
        if path == health_path {
            return Ok(health::respond(req.method()));
        }
    }

    let method = req
        .method()
        .as_str()
        .parse::<HttpMethod>()
        .map_err(|_| ProxyError::RoutingError(format!("Unsupported method: {}", req.method())))?;

    let target = context
        .table
        .resolve(method, &path)
        .cloned()
        .ok_or_else(|| {
            ProxyError::RoutingError(format!("No route matched the request: {method} {path}"))
        })?;

    if let Some(gate) = target.auth_gate() {
        let authorization = req
            .headers()
            .get(hyper::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        gate.authorize(authorization)?;
    }

    forward(req, method, &target, context).await
}

/// Forward a request to the next backend instance of the target's pool.
async fn forward(
    req: Request<Incoming>,
    method: HttpMethod,
    target: &RouteTarget,
    context: &ServerContext,
) -> Result<Response<Body>, ProxyError> {
    let Some(instance) = target.pool().acquire() else {
        return Err(ProxyError::Unavailable(target.resource().to_string()));
    };

    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = join_target(instance.uri(), path_and_query);

    debug!("Forwarding {method} {} -> {url}", parts.uri.path());

    // Incoming → Stream → reqwest::Body
    let byte_stream = body.into_data_stream().map_ok(Bytes::from);
    let outbound = Body::wrap_stream(byte_stream);

    let mut headers = parts.headers;
    // the upstream host comes from the instance URI
    headers.remove(hyper::header::HOST);

    let request = context
        .client
        .request(method.into(), url)
        .headers(headers)
        .body(outbound);

    let budget = target.max_request_time();
    let upstream = tokio::time::timeout(budget, request.send())
        .await
        .map_err(|_| ProxyError::Timeout(budget))?
        .map_err(ProxyError::ClientError)?;

    let status = upstream.status().as_u16();
    let response_headers = upstream.headers().clone();

    // the guard rides along so the pool slot stays held until the body
    // finishes streaming
    let stream = upstream.bytes_stream().map_ok(move |chunk| {
        let _ = &instance;
        chunk
    });

    let mut response = simple_response(status, Body::wrap_stream(stream));
    *response.headers_mut() = response_headers;
    Ok(response)
}

/// Join a backend base URI and a request path+query.
fn join_target(base: &Url, path_and_query: &str) -> String {
    format!(
        "{}{}",
        base.as_str().trim_end_matches('/'),
        path_and_query
    )
}

/// Map a processing error onto its response.
fn error_response(error: &ProxyError, method: &str, path: &str) -> Response<Body> {
    let (status, message) = match error {
        ProxyError::Timeout(d) => {
            warn!("Request {method} {path} timed out after {d:?}");
            (504, format!("Gateway Timeout after {d:?}"))
        }
        ProxyError::RoutingError(msg) => {
            warn!("Routing error for {method} {path}: {msg}");
            (404, "Route not found".to_string())
        }
        ProxyError::Unavailable(resource) => {
            warn!("No backend available for {method} {path} [{resource}]");
            (503, "Service Unavailable".to_string())
        }
        ProxyError::SecurityError(msg) => {
            warn!("Security error for {method} {path}: {msg}");
            (401, "Unauthorized".to_string())
        }
        ProxyError::ClientError(err) => {
            error!("Upstream error for {method} {path}: {err}");
            (502, "Bad Gateway".to_string())
        }
        _ => {
            error!("Internal error processing {method} {path}: {error}");
            (500, "Internal Server Error".to_string())
        }
    };

    let mut response = simple_response(status, Body::from(message));
    if status == 401 {
        response.headers_mut().insert(
            hyper::header::WWW_AUTHENTICATE,
            hyper::header::HeaderValue::from_static("Basic realm=\"warren\""),
        );
    }
    response
}

/// Build a response without the fallible builder path.
fn simple_response(status: u16, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() =
        hyper::StatusCode::from_u16(status).unwrap_or(hyper::StatusCode::INTERNAL_SERVER_ERROR);
    response
}

fn header_string(req: &Request<Incoming>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_target_appends_request_path() {
        let base = Url::parse("http://localhost:9000/").unwrap();
        assert_eq!(join_target(&base, "/abc/xyz"), "http://localhost:9000/abc/xyz");
    }

    #[test]
    fn test_join_target_keeps_base_path_and_query() {
        let base = Url::parse("http://localhost:9000/k").unwrap();
        assert_eq!(
            join_target(&base, "/abc/?q=1"),
            "http://localhost:9000/k/abc/?q=1"
        );
    }

    #[test]
    fn test_error_response_status_mapping() {
        let timeout = error_response(
            &ProxyError::Timeout(std::time::Duration::from_millis(100)),
            "GET",
            "/a/",
        );
        assert_eq!(timeout.status(), 504);

        let unavailable = error_response(&ProxyError::Unavailable("/a/".into()), "GET", "/a/");
        assert_eq!(unavailable.status(), 503);

        let routing = error_response(&ProxyError::RoutingError("none".into()), "GET", "/a/");
        assert_eq!(routing.status(), 404);

        let security = error_response(&ProxyError::SecurityError("denied".into()), "GET", "/a/");
        assert_eq!(security.status(), 401);
        assert!(security.headers().contains_key(hyper::header::WWW_AUTHENTICATE));
    }
}
