// crates/blobcheck-store-s3/src/insecure.rs
// ============================================================================
// Module: Unverified TLS Transport
// Description: Smithy HTTP client backed by reqwest without certificate checks.
// Purpose: Support candidates that set AWS_SKIP_TLS_VERIFY.
// Dependencies: aws-smithy-runtime-api, aws-smithy-types, http-body-util, reqwest
// ============================================================================

//! ## Overview
//! Self-hosted providers often serve certificates signed by a private CA.
//! When a candidate asks to skip TLS verification, the S3 client is handed
//! this transport instead of the SDK default. Request bodies are buffered in
//! memory; the probe only ever sends a few bytes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use aws_smithy_runtime_api::client::http::HttpClient;
use aws_smithy_runtime_api::client::http::HttpConnector;
use aws_smithy_runtime_api::client::http::HttpConnectorFuture;
use aws_smithy_runtime_api::client::http::HttpConnectorSettings;
use aws_smithy_runtime_api::client::http::SharedHttpConnector;
use aws_smithy_runtime_api::client::orchestrator::HttpRequest;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::ConnectorError;
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_runtime_api::http::StatusCode;
use aws_smithy_types::body::SdkBody;
use http_body_util::BodyExt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Headers reqwest derives from the URL and body itself.
const MANAGED_HEADERS: [&str; 3] = ["host", "content-length", "transfer-encoding"];

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client that accepts any server certificate.
#[derive(Debug, Clone)]
pub(crate) struct InsecureHttpClient {
    /// Underlying reqwest client.
    client: reqwest::Client,
}

impl InsecureHttpClient {
    /// Builds the client.
    pub(crate) fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().danger_accept_invalid_certs(true).build()?;
        Ok(Self {
            client,
        })
    }
}

impl HttpClient for InsecureHttpClient {
    fn http_connector(
        &self,
        _settings: &HttpConnectorSettings,
        _components: &RuntimeComponents,
    ) -> SharedHttpConnector {
        SharedHttpConnector::new(self.clone())
    }
}

impl HttpConnector for InsecureHttpClient {
    fn call(&self, request: HttpRequest) -> HttpConnectorFuture {
        let client = self.client.clone();
        HttpConnectorFuture::new(async move { send(&client, request).await })
    }
}

/// Forwards one smithy request through reqwest.
async fn send(
    client: &reqwest::Client,
    mut request: HttpRequest,
) -> Result<HttpResponse, ConnectorError> {
    let method = reqwest::Method::from_bytes(request.method().as_bytes())
        .map_err(|err| ConnectorError::other(err.into(), None))?;
    let body = request
        .take_body()
        .collect()
        .await
        .map_err(ConnectorError::io)?
        .to_bytes();

    let mut builder = client.request(method, request.uri());
    for (name, value) in request.headers() {
        if !MANAGED_HEADERS.iter().any(|managed| name.eq_ignore_ascii_case(managed)) {
            builder = builder.header(name, value);
        }
    }
    let response = builder.body(body).send().await.map_err(|err| {
        if err.is_timeout() {
            ConnectorError::timeout(err.into())
        } else {
            ConnectorError::io(err.into())
        }
    })?;

    let status = StatusCode::try_from(response.status().as_u16())
        .map_err(|err| ConnectorError::other(err.into(), None))?;
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let bytes = response.bytes().await.map_err(|err| ConnectorError::io(err.into()))?;

    let mut converted = HttpResponse::new(status, SdkBody::from(bytes));
    for (name, value) in headers {
        converted.headers_mut().append(name, value);
    }
    Ok(converted)
}
