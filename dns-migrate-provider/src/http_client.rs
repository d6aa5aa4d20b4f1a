//! Shared HTTP plumbing
//!
//! Each provider signs and builds its own `RequestBuilder`; this module only sends it,
//! logs it, and turns transport-level failures into [`ProviderError`]s.
//! Retrying is layered on top by the providers through [`crate::retry`], so that signed
//! requests can be rebuilt per attempt.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// Connect timeout for every provider client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Whole-request deadline for every provider client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Build a client with explicit deadlines.
pub fn create_http_client(provider_name: &str, request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .build()
        .map_err(|e| ProviderError::Configuration {
            provider: provider_name.to_string(),
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Send one request and return `(status, body)`.
    ///
    /// HTTP 429 becomes [`ProviderError::RateLimited`] (honouring `Retry-After`),
    /// 502–504 become [`ProviderError::NetworkError`]. Other statuses are returned to the
    /// caller, which knows how to read the provider's error envelope.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url_or_action: &str,
    ) -> Result<(u16, String)> {
        log::debug!("[{provider_name}] {method_name} {url_or_action}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{provider_name}] {status_code} {}",
            truncate_for_log(&body)
        );

        match status_code {
            429 => {
                log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
                Err(ProviderError::RateLimited {
                    provider: provider_name.to_string(),
                    retry_after,
                    raw_message: Some(truncate_for_log(&body)),
                })
            }
            502..=504 => {
                log::warn!("[{provider_name}] Upstream unavailable (HTTP {status_code})");
                Err(ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
                })
            }
            _ => Ok((status_code, body)),
        }
    }

    /// Decode a JSON body, logging an excerpt when it does not match `T`.
    pub fn parse_json<T>(response_text: &str, provider_name: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!(
                "[{provider_name}] JSON parse failed: {e}; body: {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn get(server: &MockServer) -> Result<(u16, String)> {
        let client = create_http_client("test", DEFAULT_REQUEST_TIMEOUT)?;
        let url = format!("{}/probe", server.uri());
        HttpUtils::execute_request(client.get(&url), "test", "GET", &url).await
    }

    #[tokio::test]
    async fn passes_through_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let res = get(&server).await;
        assert!(
            matches!(&res, Ok((404, body)) if body == "missing"),
            "unexpected: {res:?}"
        );
    }

    #[tokio::test]
    async fn maps_429_with_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;

        let res = get(&server).await;
        assert!(
            matches!(
                res,
                Err(ProviderError::RateLimited {
                    retry_after: Some(7),
                    ..
                })
            ),
            "unexpected: {res:?}"
        );
    }

    #[tokio::test]
    async fn maps_gateway_errors_to_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/probe"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let res = get(&server).await;
        assert!(
            matches!(&res, Err(e) if e.is_retryable()),
            "unexpected: {res:?}"
        );
    }

    #[test]
    fn parse_json_reports_parse_error() {
        let res: Result<serde_json::Value> = HttpUtils::parse_json("{not json", "test");
        assert!(matches!(res, Err(ProviderError::ParseError { .. })));
    }
}
