//! Cloudflare error mapping
//!
//! Reference: <https://developers.cloudflare.com/fundamentals/api/reference/errors/>

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::CloudflareProvider;

/// 6003 bad request headers, 6103/6111 malformed auth headers,
/// 9109 unauthorized, 10000 authentication error.
const AUTH_CODES: &[i64] = &[6003, 6103, 6111, 9109, 10000];

/// Parameter named by each validation code.
fn invalid_param(code: i64) -> Option<&'static str> {
    match code {
        1004 => Some("record"),
        9000 => Some("name"),
        9005 | 9006 | 9009 => Some("content"),
        9021 => Some("ttl"),
        9041 => Some("proxied"),
        _ => None,
    }
}

impl ProviderErrorMapper for CloudflareProvider {
    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        let Some(code) = raw.code.as_deref().and_then(|c| c.parse::<i64>().ok()) else {
            return self.unknown_error(raw);
        };

        if AUTH_CODES.contains(&code) {
            return ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            };
        }
        if let Some(param) = invalid_param(code) {
            return ProviderError::InvalidParameter {
                provider,
                param: param.to_string(),
                detail: raw.message,
            };
        }

        match code {
            // An identical or conflicting record already exists
            81053..=81058 => ProviderError::RecordExists {
                provider,
                record_name: context
                    .record_name
                    .unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },
            81044 => ProviderError::RecordNotFound {
                provider,
                record_id: context.record_id.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },
            81045 => ProviderError::QuotaExceeded {
                provider,
                raw_message: Some(raw.message),
            },
            // No route / invalid object identifier: the zone id is wrong
            7000 | 7003 => ProviderError::DomainNotFound {
                provider,
                domain: context.domain.unwrap_or_else(|| self.zone_id.clone()),
                raw_message: Some(raw.message),
            },
            971 => ProviderError::RateLimited {
                provider,
                retry_after: None,
                raw_message: Some(raw.message),
            },
            _ => self.unknown_error(raw),
        }
    }
}
