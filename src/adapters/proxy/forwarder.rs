//! Reqwest-backed forwarding of an admitted request to its upstream.
//!
//! The outbound request is `base + path + query` with the caller's method,
//! headers and body. The body is collected up to a fixed limit first. The provider-selection header, `Host`, `Content-Length`
//! and hop-by-hop headers are removed first. The upstream response is handed
//! back with its status, headers (minus hop-by-hop) and a streamed body.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use http::{header, HeaderMap, HeaderName, Uri};
use http_body_util::{BodyExt, LengthLimitError, Limited};

/// Header selecting the upstream provider. Never forwarded.
pub const PROVIDER_HEADER: &str = "x-llm-provider";

/// Upstream response header carrying the cost of the call.
pub const USAGE_COST_HEADER: &str = "x-usage-cost";

/// Largest request body forwarded unless configured otherwise (10 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Errors raised before an upstream response head was received.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream transport failed: {0}")]
    Transport(String),

    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),

    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl From<reqwest::Error> for ForwardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ForwardError::Timeout
        } else if err.is_builder() {
            ForwardError::InvalidTarget(err.to_string())
        } else {
            ForwardError::Transport(err.to_string())
        }
    }
}

/// An upstream response together with the measurements taken on the way.
#[derive(Debug)]
pub struct ForwardedResponse {
    /// Response to hand back to the caller.
    pub response: Response,
    /// Time from send until the response head arrived.
    pub latency_ms: u64,
    /// Value of the usage cost header, 0 when absent or malformed.
    pub cost: f64,
}

/// Forwards requests over a shared connection pool.
#[derive(Debug, Clone)]
pub struct ProxyForwarder {
    client: reqwest::Client,
    body_limit: usize,
}

impl ProxyForwarder {
    /// Creates a forwarder. `timeout` bounds each upstream exchange.
    ///
    /// Redirects are returned to the caller rather than followed.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ForwardError> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            body_limit: DEFAULT_BODY_LIMIT,
        })
    }

    /// Sets the largest request body, in bytes, that will be forwarded.
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Sends `request` to `base` and returns the upstream response.
    pub async fn forward(&self, request: Request, base: &str) -> Result<ForwardedResponse, ForwardError> {
        let (parts, body) = request.into_parts();

        let target = target_url(base, &parts.uri);
        let url = reqwest::Url::parse(&target)
            .map_err(|e| ForwardError::InvalidTarget(format!("{}: {}", target, e)))?;

        let body = Limited::new(body, self.body_limit)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    ForwardError::BodyTooLarge {
                        limit: self.body_limit,
                    }
                } else {
                    ForwardError::Transport(format!("reading request body: {}", e))
                }
            })?
            .to_bytes();

        let started = Instant::now();
        let upstream = self
            .client
            .request(parts.method, url)
            .headers(outbound_headers(&parts.headers))
            .body(body)
            .send()
            .await?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let cost = parse_cost(upstream.headers());
        let status = upstream.status();
        let headers = strip_hop_by_hop(upstream.headers());

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;

        Ok(ForwardedResponse {
            response,
            latency_ms,
            cost,
        })
    }
}

/// Joins `base` with the path and query of `uri`.
pub fn target_url(base: &str, uri: &Uri) -> String {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    format!("{}{}", base.trim_end_matches('/'), path_and_query)
}

/// Reads the usage cost header. Absent, unparseable, negative or
/// non-finite values count as zero.
pub fn parse_cost(headers: &HeaderMap) -> f64 {
    headers
        .get(USAGE_COST_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|cost| cost.is_finite() && *cost >= 0.0)
        .unwrap_or(0.0)
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

fn outbound_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = strip_hop_by_hop(headers);
    out.remove(PROVIDER_HEADER);
    out.remove(header::HOST);
    out.remove(header::CONTENT_LENGTH);
    out
}

fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_hop_by_hop(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Method, StatusCode};
    use axum::Router;

    // ════════════════════════════════════════════════════════════════════════════
    // Header handling
    // ════════════════════════════════════════════════════════════════════════════

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn parse_cost_reads_decimal_header() {
        assert_eq!(parse_cost(&headers(&[("x-usage-cost", "0.0125")])), 0.0125);
        assert_eq!(parse_cost(&headers(&[("x-usage-cost", " 3 ")])), 3.0);
    }

    #[test]
    fn parse_cost_defaults_to_zero() {
        assert_eq!(parse_cost(&HeaderMap::new()), 0.0);
        assert_eq!(parse_cost(&headers(&[("x-usage-cost", "abc")])), 0.0);
        assert_eq!(parse_cost(&headers(&[("x-usage-cost", "-4")])), 0.0);
        assert_eq!(parse_cost(&headers(&[("x-usage-cost", "NaN")])), 0.0);
        assert_eq!(parse_cost(&headers(&[("x-usage-cost", "inf")])), 0.0);
    }

    #[test]
    fn outbound_headers_drop_internal_and_hop_by_hop() {
        let out = outbound_headers(&headers(&[
            ("x-llm-provider", "openai"),
            ("host", "gateway.local"),
            ("content-length", "12"),
            ("connection", "keep-alive"),
            ("transfer-encoding", "chunked"),
            ("authorization", "Bearer sk-1"),
            ("content-type", "application/json"),
        ]));

        assert!(out.get("x-llm-provider").is_none());
        assert!(out.get("host").is_none());
        assert!(out.get("content-length").is_none());
        assert!(out.get("connection").is_none());
        assert!(out.get("transfer-encoding").is_none());
        assert_eq!(out.get("authorization").unwrap(), "Bearer sk-1");
        assert_eq!(out.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn repeated_headers_are_preserved() {
        let out = outbound_headers(&headers(&[("accept", "a"), ("accept", "b")]));
        assert_eq!(out.get_all("accept").iter().count(), 2);
    }

    #[test]
    fn target_url_keeps_path_and_query() {
        let uri: Uri = "/v1/chat/completions?stream=true".parse().unwrap();
        assert_eq!(
            target_url("https://api.openai.com/", &uri),
            "https://api.openai.com/v1/chat/completions?stream=true"
        );
    }

    #[test]
    fn target_url_defaults_to_root() {
        let uri: Uri = "http://gateway.local".parse().unwrap();
        assert_eq!(target_url("http://upstream", &uri), "http://upstream/");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Live forwarding
    // ════════════════════════════════════════════════════════════════════════════

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn forwards_request_and_returns_upstream_response() {
        let app = Router::new().fallback(|request: Request| async move {
            let provider_seen = request.headers().contains_key(PROVIDER_HEADER);
            let method = request.method().clone();
            let uri = request.uri().to_string();
            let body = axum::body::to_bytes(request.into_body(), usize::MAX)
                .await
                .unwrap();
            let mut response = Response::new(Body::from(format!(
                "{} {} {} {}",
                method,
                uri,
                provider_seen,
                String::from_utf8_lossy(&body)
            )));
            *response.status_mut() = StatusCode::CREATED;
            response
                .headers_mut()
                .insert(USAGE_COST_HEADER, HeaderValue::from_static("1.5"));
            response
        });
        let base = spawn_upstream(app).await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/embed?model=small")
            .header(PROVIDER_HEADER, "cohere")
            .body(Body::from("hello"))
            .unwrap();

        let forwarder = ProxyForwarder::new(None).unwrap();
        let forwarded = forwarder.forward(request, &base).await.unwrap();

        assert_eq!(forwarded.cost, 1.5);
        assert_eq!(forwarded.response.status(), StatusCode::CREATED);
        let body = axum::body::to_bytes(forwarded.response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"POST /v1/embed?model=small false hello");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let app = Router::new().fallback(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        });
        let base = spawn_upstream(app).await;

        let forwarder = ProxyForwarder::new(Some(Duration::from_millis(100))).unwrap();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let result = forwarder.forward(request, &base).await;

        assert!(matches!(result, Err(ForwardError::Timeout)));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let forwarder = ProxyForwarder::new(Some(Duration::from_secs(2))).unwrap();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let result = forwarder.forward(request, &format!("http://{}", addr)).await;

        assert!(matches!(result, Err(ForwardError::Transport(_))));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_sending() {
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = hits.clone();
        let app = Router::new().fallback(move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                "ok"
            }
        });
        let base = spawn_upstream(app).await;
        let forwarder = ProxyForwarder::new(None).unwrap().with_body_limit(8);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .body(Body::from("way more than eight bytes"))
            .unwrap();
        let result = forwarder.forward(request, &base).await;
        assert!(matches!(result, Err(ForwardError::BodyTooLarge { limit: 8 })));
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 0);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .body(Body::from("8 bytes!"))
            .unwrap();
        assert!(forwarder.forward(request, &base).await.is_ok());
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_base_is_invalid_target() {
        let forwarder = ProxyForwarder::new(None).unwrap();
        let request = Request::builder().uri("/x").body(Body::empty()).unwrap();
        let result = forwarder.forward(request, "not a url").await;

        assert!(matches!(result, Err(ForwardError::InvalidTarget(_))));
    }
}
