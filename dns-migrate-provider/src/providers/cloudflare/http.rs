//! Cloudflare HTTP 请求方法

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::retry::with_retry;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{CloudflareProvider, CloudflareResponse};

impl CloudflareProvider {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("X-Auth-Email", &self.email)
            .header("X-Auth-Key", &self.api_key)
    }

    /// Error for a failed response whose body is not a Cloudflare envelope.
    fn status_error(&self, status: u16, body: &str, ctx: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        let raw_message = Some(format!("HTTP {status}: {body}"));
        match status {
            401 => ProviderError::InvalidCredentials {
                provider,
                raw_message,
            },
            403 => ProviderError::PermissionDenied {
                provider,
                raw_message,
            },
            404 => match ctx.record_id {
                Some(record_id) => ProviderError::RecordNotFound {
                    provider,
                    record_id,
                    raw_message,
                },
                None => ProviderError::DomainNotFound {
                    provider,
                    domain: ctx.domain.unwrap_or_else(|| self.zone_id.clone()),
                    raw_message,
                },
            },
            _ => ProviderError::NetworkError {
                provider,
                detail: format!("HTTP {status}: {body}"),
            },
        }
    }

    /// One attempt: send, then unwrap the envelope.
    async fn call_once<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        ctx: ErrorContext,
    ) -> Result<(Option<T>, Option<u32>)> {
        let mut request = self.authorize(self.client.request(method.clone(), url));
        if let Some(body) = body {
            request = request.json(body);
        }
        let (status, text) =
            HttpUtils::execute_request(request, self.provider_name(), method.as_str(), url).await?;

        let envelope: CloudflareResponse<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if status >= 400 => return Err(self.status_error(status, &text, ctx)),
            Err(e) => return Err(self.parse_error(e)),
        };

        if !envelope.success {
            let Some(first) = envelope.errors.first() else {
                return Err(self.status_error(status, &text, ctx));
            };
            return Err(self.map_error(
                RawApiError::with_code(first.code.to_string(), first.message.clone()),
                ctx,
            ));
        }

        let total = envelope.result_info.map(|info| info.total_count);
        Ok((envelope.result, total))
    }

    /// Send one API call (retried per [`RetryPolicy`](crate::RetryPolicy)) and unwrap the
    /// envelope. Returns the `result` and the `result_info.total_count`, if any.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        ctx: ErrorContext,
    ) -> Result<(Option<T>, Option<u32>)> {
        let url = format!("{}{path}", self.base_url);
        let label = format!("{method} {path}");

        let outcome = with_retry(&self.retry_policy, &label, || {
            self.call_once(method.clone(), &url, body, ctx.clone())
        })
        .await;

        if let Err(ref err) = outcome {
            if err.is_expected() {
                log::warn!("{err}");
            } else {
                log::error!("{err}");
            }
        }
        outcome
    }

    /// Like [`call`](Self::call) but requires a `result`.
    pub(crate) async fn call_result<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        ctx: ErrorContext,
    ) -> Result<T> {
        let (result, _) = self.call(method, path, body, ctx).await?;
        result.ok_or_else(|| self.parse_error("响应中缺少 result 字段"))
    }
}
