use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use hyper::body::to_bytes;
use hyper::client::HttpConnector;
use hyper::{Body, Client, Request, StatusCode, Uri};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};
use tokio::time::timeout;
use webpki_roots::TLS_SERVER_ROOTS;

use crate::traits::{AgentError, AgentResult};

pub(crate) type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Timeout applied to each request, and to each wait for a streamed chunk,
/// when a client is not configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn build_https_client() -> HyperClient {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(TLS_SERVER_ROOTS.iter().map(|anchor| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            anchor.subject,
            anchor.spki,
            anchor.name_constraints,
        )
    }));

    let config = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let connector = HttpsConnector::from((http, Arc::new(config)));

    Client::builder().build::<_, Body>(connector)
}

/// Target URL that is parsed eagerly but only rejected when first used.
#[derive(Clone, Debug)]
pub(crate) struct Endpoint {
    raw: String,
    parsed: Result<Uri, String>,
}

impl Endpoint {
    pub(crate) fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = parse_uri(&raw);
        Self { raw, parsed }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.raw
    }

    pub(crate) fn uri(&self) -> AgentResult<Uri> {
        self.parsed
            .clone()
            .map_err(|reason| AgentError::configuration(format!("`{}`: {reason}", self.raw)))
    }
}

fn parse_uri(raw: &str) -> Result<Uri, String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err("URL must start with http:// or https://".to_owned());
    }
    trimmed
        .parse::<Uri>()
        .map_err(|err| format!("invalid URL: {err}"))
}

/// Sends `request` and returns the body of a successful response.
///
/// `limit` bounds the whole exchange, body included.
pub(crate) async fn send(
    client: &HyperClient,
    request: Request<Body>,
    limit: Duration,
    label: &str,
) -> AgentResult<Bytes> {
    let exchange = async {
        let response = client
            .request(request)
            .await
            .map_err(|err| AgentError::transport(format!("{label} request failed: {err}")))?;
        let status = response.status();
        let bytes = read_body(response.into_body(), label).await?;
        if !status.is_success() {
            return Err(status_error(status, &bytes, label));
        }
        Ok::<_, AgentError>(bytes)
    };

    timeout(limit, exchange)
        .await
        .map_err(|_| timed_out(label, limit))?
}

/// Sends `request` and hands back the body of a successful response unread.
///
/// `limit` bounds the wait for the response headers and, on an error status,
/// the read of the error body. Reading a successful body is left to the
/// caller.
pub(crate) async fn open_stream(
    client: &HyperClient,
    request: Request<Body>,
    limit: Duration,
    label: &str,
) -> AgentResult<Body> {
    let response = timeout(limit, client.request(request))
        .await
        .map_err(|_| timed_out(label, limit))?
        .map_err(|err| AgentError::transport(format!("{label} request failed: {err}")))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response.into_body());
    }

    let bytes = timeout(limit, read_body(response.into_body(), label))
        .await
        .map_err(|_| timed_out(label, limit))??;
    Err(status_error(status, &bytes, label))
}

async fn read_body(body: Body, label: &str) -> AgentResult<Bytes> {
    to_bytes(body)
        .await
        .map_err(|err| AgentError::transport(format!("failed to read {label} response: {err}")))
}

fn status_error(status: StatusCode, body: &[u8], label: &str) -> AgentError {
    let reason = String::from_utf8_lossy(body);
    AgentError::response(format!("{label} returned {status}: {reason}"))
}

fn timed_out(label: &str, limit: Duration) -> AgentError {
    AgentError::transport(format!("{label} request timed out after {limit:?}"))
}
