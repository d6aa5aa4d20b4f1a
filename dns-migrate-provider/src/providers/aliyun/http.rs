//! 阿里云 RPC 请求 (参数在 query string 中, body 为空)

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::retry::with_retry;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

use super::sign::SignInput;
use super::{ALIYUN_DNS_VERSION, AliyunProvider, EMPTY_BODY_SHA256, serialize_to_query_string};

/// `Code` / `Message` of an error body, if present.
fn api_error(value: &Value) -> Option<RawApiError> {
    let code = value.get("Code").and_then(Value::as_str)?;
    let message = value
        .get("Message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(RawApiError::with_code(code, message))
}

impl AliyunProvider {
    /// One signed attempt.
    async fn request_once<T: DeserializeOwned>(
        &self,
        action: &str,
        query: &str,
        ctx: ErrorContext,
    ) -> Result<T> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let nonce = uuid::Uuid::new_v4().to_string();
        let authorization = self.authorization(&SignInput {
            action,
            query,
            timestamp: &timestamp,
            nonce: &nonce,
        })?;

        let url = if query.is_empty() {
            format!("{}/", self.endpoint)
        } else {
            format!("{}/?{query}", self.endpoint)
        };

        let request = self
            .client
            .post(&url)
            .header("x-acs-action", action)
            .header("x-acs-version", ALIYUN_DNS_VERSION)
            .header("x-acs-date", &timestamp)
            .header("x-acs-signature-nonce", &nonce)
            .header("x-acs-content-sha256", EMPTY_BODY_SHA256)
            .header("Authorization", authorization);

        let (status, text) =
            HttpUtils::execute_request(request, self.provider_name(), "POST", action).await?;

        // 错误响应体带 Code/Message，HTTP 状态码可能是 200 也可能是 4xx
        if let Some(raw) = serde_json::from_str::<Value>(&text)
            .ok()
            .as_ref()
            .and_then(api_error)
        {
            return Err(self.map_error(raw, ctx));
        }
        if status >= 400 {
            return Err(ProviderError::NetworkError {
                provider: self.provider_name().to_string(),
                detail: format!("HTTP {status}: {}", truncate_for_log(&text)),
            });
        }

        HttpUtils::parse_json(&text, self.provider_name())
    }

    /// Call an RPC action, retrying per the provider's policy. Every attempt is signed anew.
    pub(crate) async fn request<T: DeserializeOwned, P: Serialize>(
        &self,
        action: &str,
        params: &P,
        ctx: ErrorContext,
    ) -> Result<T> {
        let query = serialize_to_query_string(params)?;

        let outcome = with_retry(&self.retry_policy, action, || {
            self.request_once(action, &query, ctx.clone())
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
}
