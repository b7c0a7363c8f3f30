use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use http::{Request, Response, StatusCode, Uri, Version};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::proxy::http_result::{HttpError, HttpResult};
use crate::proxy::synthetic_response::{synthetic_error_response, RespBody};

type HttpClient = Client<HttpConnector, Incoming>;

pub fn create_client(connect_timeout: Duration) -> HttpClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(connect_timeout));
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Rewrite `uri` so that it targets `upstream` (a `host:port` authority),
/// keeping path and query
pub fn upstream_uri(upstream: &str, uri: &Uri) -> HttpResult<Uri> {
    let pq = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    format!("http://{upstream}{pq}")
        .parse::<Uri>()
        .map_err(|e| HttpError::InvalidUri(e.to_string()))
}

/// Relay `req` to `upstream` over HTTP/1.1 and return its response unchanged
pub async fn forward(
    client: &HttpClient,
    upstream: &str,
    req: Request<Incoming>,
) -> HttpResult<Response<RespBody>> {
    let start = Instant::now();
    let (mut parts, body) = req.into_parts();
    parts.uri = upstream_uri(upstream, &parts.uri)?;
    parts.version = Version::HTTP_11;

    let resp = client
        .request(Request::from_parts(parts, body))
        .await
        .map_err(|e| HttpError::FailedToGetResponseFromUpstream(e.to_string()))?;

    debug!(
        upstream = %upstream,
        status = resp.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Upstream responded"
    );
    Ok(resp.map(|b| b.boxed()))
}

/// The protected service: every request that reaches it is relayed upstream
///
/// Relay failures never surface as service errors; they become synthetic
/// responses (502 for an unreachable upstream).
#[derive(Clone)]
pub struct Upstream {
    address: Arc<str>,
    client: HttpClient,
}

impl Upstream {
    pub fn new(address: impl Into<Arc<str>>, connect_timeout: Duration) -> Self {
        Self { address: address.into(), client: create_client(connect_timeout) }
    }
}

impl Service<Request<Incoming>> for Upstream {
    type Response = Response<RespBody>;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let client = self.client.clone();
        let address = Arc::clone(&self.address);

        Box::pin(async move {
            match forward(&client, &address, req).await {
                Ok(resp) => Ok(resp),
                Err(e) => {
                    warn!(upstream = %address, error = %e, error_type = e.error_type(), "Forwarding failed");
                    Ok(synthetic_error_response(StatusCode::from(e)))
                }
            }
        })
    }
}
