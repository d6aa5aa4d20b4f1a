//! 阿里云错误映射
//!
//! 参考: <https://api.aliyun.com/document/Alidns/2015-01-09/errorCode>

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::AliyunProvider;

/// Parameter named by each validation code.
fn invalid_param(code: &str) -> Option<&'static str> {
    let param = match code {
        "InvalidRR.TypeEmpty" | "SubDomainInvalid.Type" => "type",
        "InvalidRR.AValue" | "InvalidRR.AAAAValue" | "InvalidRR.MXValue" | "InvalidRR.NSValue"
        | "InvalidRR.CNAMEValue" | "SubDomainInvalid.Value" => "content",
        "InvalidRR.RrEmpty" | "InvalidRR.Format" | "InvalidRR.Length" | "Record.Invalid.Rr" => {
            "name"
        }
        "SubDomainInvalid.TTL" => "ttl",
        "SubDomainInvalid.Priority" => "priority",
        "SubDomainInvalid.Line" | "UnsupportedLine" => "line",
        "InvalidDomainName.Format" | "InvalidDomainName.Suffix" | "InvalidDomainName.Length"
        | "DomainEmpty" => "domain",
        _ => return None,
    };
    Some(param)
}

impl ProviderErrorMapper for AliyunProvider {
    fn provider_name(&self) -> &'static str {
        "aliyun"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        let Some(code) = raw.code.as_deref() else {
            return self.unknown_error(raw);
        };

        if let Some(param) = invalid_param(code) {
            return ProviderError::InvalidParameter {
                provider,
                param: param.to_string(),
                detail: raw.message,
            };
        }
        if code.starts_with("QuotaExceeded") || code == "LineDnsSlb.QuotaExceeded" {
            return ProviderError::QuotaExceeded {
                provider,
                raw_message: Some(raw.message),
            };
        }

        let domain = || context.domain.clone().unwrap_or_else(|| self.domain_name.clone());
        match code {
            "InvalidAccessKeyId.NotFound"
            | "InvalidAccessKeyId.Inactive"
            | "SignatureDoesNotMatch"
            | "IncompleteSignature" => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },
            "DomainRecordDuplicate" | "DomainRecordConflict" => ProviderError::RecordExists {
                provider,
                record_name: context
                    .record_name
                    .unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },
            "DomainRecordNotBelongToUser" | "InvalidRecordId.NotFound" | "InvalidRR.NoExist" => {
                ProviderError::RecordNotFound {
                    provider,
                    record_id: context.record_id.unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                }
            }
            "InvalidDomainName.NoExist" | "DomainNotFound" => ProviderError::DomainNotFound {
                provider,
                domain: domain(),
                raw_message: Some(raw.message),
            },
            "Throttling" | "Throttling.User" | "Throttling.Api" => ProviderError::RateLimited {
                provider,
                retry_after: None,
                raw_message: Some(raw.message),
            },
            "DomainRecordLocked" | "DomainExpiredDNSForbidden" | "Forbidden.DomainExpired" => {
                ProviderError::DomainLocked {
                    provider,
                    domain: domain(),
                    raw_message: Some(raw.message),
                }
            }
            "Forbidden"
            | "Forbidden.RAM"
            | "Forbidden.RiskControl"
            | "OperationDomain.NoPermission"
            | "IncorrectDomainUser" => ProviderError::PermissionDenied {
                provider,
                raw_message: Some(raw.message),
            },
            _ => self.unknown_error(raw),
        }
    }
}
