use serde::{Deserialize, Serialize};

/// Unified error type for every DNS provider operation.
///
/// Each variant carries a `provider` field naming the backend that produced it.
/// Variants serialize with a `code` tag so callers can forward them as structured data.
///
/// Use [`kind`](Self::kind) to branch on the broad category and
/// [`is_retryable`](Self::is_retryable) to decide whether a retry makes sense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// Missing or malformed provider configuration. Raised before any network call.
    Configuration {
        /// Provider that produced the error.
        provider: String,
        /// What is wrong with the configuration.
        detail: String,
    },

    /// A record failed shape or content validation, or the API rejected a parameter.
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Name of the offending parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// A record with the same name/type/content already exists.
    RecordExists {
        /// Provider that produced the error.
        provider: String,
        /// Name of the conflicting record.
        record_name: String,
        /// Original message from the provider API, if any.
        raw_message: Option<String>,
    },

    /// The credentials were rejected.
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original message from the provider API, if any.
        raw_message: Option<String>,
    },

    /// The credentials are valid but lack permission for the operation.
    PermissionDenied {
        /// Provider that produced the error.
        provider: String,
        /// Original message from the provider API, if any.
        raw_message: Option<String>,
    },

    /// API rate limit hit (HTTP 429 or a throttling code).
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Seconds to wait before retrying, when the API says so.
        retry_after: Option<u64>,
        /// Original message from the provider API, if any.
        raw_message: Option<String>,
    },

    /// The record id does not exist on this provider.
    RecordNotFound {
        /// Provider that produced the error.
        provider: String,
        /// The id that was looked up.
        record_id: String,
        /// Original message from the provider API, if any.
        raw_message: Option<String>,
    },

    /// The zone / domain does not exist or is not visible to these credentials.
    DomainNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Domain or zone identifier.
        domain: String,
        /// Original message from the provider API, if any.
        raw_message: Option<String>,
    },

    /// The backend has no support for the requested feature.
    Unsupported {
        /// Provider that produced the error.
        provider: String,
        /// Feature name, e.g. `email_forwarding`.
        feature: String,
    },

    /// The domain is locked or suspended.
    DomainLocked {
        /// Provider that produced the error.
        provider: String,
        /// Domain name.
        domain: String,
        /// Original message from the provider API, if any.
        raw_message: Option<String>,
    },

    /// Account quota exhausted. Not transient, unlike [`RateLimited`](Self::RateLimited).
    QuotaExceeded {
        /// Provider that produced the error.
        provider: String,
        /// Original message from the provider API, if any.
        raw_message: Option<String>,
    },

    /// Connection-level failure or a 5xx gateway response.
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The request exceeded its deadline.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The provider response could not be decoded.
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// A request body or query could not be encoded.
    SerializationError {
        /// Provider that produced the error.
        provider: String,
        /// Details about the failure.
        detail: String,
    },

    /// Any provider error code without a dedicated variant.
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

/// Broad error category, independent of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    Authentication,
    RateLimit,
    NotFound,
    Unsupported,
    Provider,
}

impl ProviderError {
    /// Name of the provider that produced this error.
    pub fn provider(&self) -> &str {
        match self {
            Self::Configuration { provider, .. }
            | Self::InvalidParameter { provider, .. }
            | Self::RecordExists { provider, .. }
            | Self::InvalidCredentials { provider, .. }
            | Self::PermissionDenied { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::RecordNotFound { provider, .. }
            | Self::DomainNotFound { provider, .. }
            | Self::Unsupported { provider, .. }
            | Self::DomainLocked { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::NetworkError { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::SerializationError { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::InvalidParameter { .. } | Self::RecordExists { .. } => ErrorKind::Validation,
            Self::InvalidCredentials { .. } | Self::PermissionDenied { .. } => {
                ErrorKind::Authentication
            }
            Self::RateLimited { .. } => ErrorKind::RateLimit,
            Self::RecordNotFound { .. } | Self::DomainNotFound { .. } => ErrorKind::NotFound,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::DomainLocked { .. }
            | Self::QuotaExceeded { .. }
            | Self::NetworkError { .. }
            | Self::Timeout { .. }
            | Self::ParseError { .. }
            | Self::SerializationError { .. }
            | Self::Unknown { .. } => ErrorKind::Provider,
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Transport failures, rate limits and unmapped provider errors are retryable.
    /// An unmapped error whose message mentions authentication is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Unknown { raw_message, .. } => {
                !raw_message.to_ascii_lowercase().contains("auth")
            }
            _ => false,
        }
    }

    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// `true` 时使用 `warn`，`false` 时使用 `error`。
    pub fn is_expected(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Configuration
                | ErrorKind::Validation
                | ErrorKind::Authentication
                | ErrorKind::NotFound
                | ErrorKind::Unsupported
        ) || matches!(
            self,
            Self::QuotaExceeded { .. } | Self::DomainLocked { .. }
        )
    }
}

fn with_raw(f: &mut std::fmt::Formatter<'_>, head: &str, raw: Option<&String>) -> std::fmt::Result {
    match raw {
        Some(msg) => write!(f, "{head}: {msg}"),
        None => f.write_str(head),
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] ", self.provider())?;
        match self {
            Self::Configuration { detail, .. } => write!(f, "Configuration error: {detail}"),
            Self::InvalidParameter { param, detail, .. } => {
                write!(f, "Invalid parameter '{param}': {detail}")
            }
            Self::RecordExists { record_name, .. } => {
                write!(f, "Record '{record_name}' already exists")
            }
            Self::InvalidCredentials { raw_message, .. } => {
                with_raw(f, "Invalid credentials", raw_message.as_ref())
            }
            Self::PermissionDenied { raw_message, .. } => {
                with_raw(f, "Permission denied", raw_message.as_ref())
            }
            Self::RateLimited { retry_after, .. } => match retry_after {
                Some(secs) => write!(f, "Rate limited (retry after {secs}s)"),
                None => f.write_str("Rate limited"),
            },
            Self::RecordNotFound { record_id, .. } => write!(f, "Record '{record_id}' not found"),
            Self::DomainNotFound {
                domain,
                raw_message,
                ..
            } => with_raw(f, &format!("Domain '{domain}' not found"), raw_message.as_ref()),
            Self::Unsupported { feature, .. } => write!(f, "Unsupported feature: {feature}"),
            Self::DomainLocked {
                domain,
                raw_message,
                ..
            } => with_raw(f, &format!("Domain '{domain}' is locked"), raw_message.as_ref()),
            Self::QuotaExceeded { .. } => f.write_str("Quota exceeded"),
            Self::NetworkError { detail, .. } => write!(f, "Network error: {detail}"),
            Self::Timeout { detail, .. } => write!(f, "Request timeout: {detail}"),
            Self::ParseError { detail, .. } => write!(f, "Parse error: {detail}"),
            Self::SerializationError { detail, .. } => write!(f, "Serialization error: {detail}"),
            Self::Unknown { raw_message, .. } => f.write_str(raw_message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown(msg: &str) -> ProviderError {
        ProviderError::Unknown {
            provider: "t".into(),
            raw_code: None,
            raw_message: msg.into(),
        }
    }

    // ---- kind ----

    #[test]
    fn auth_variants_classify_as_authentication() {
        let a = ProviderError::InvalidCredentials {
            provider: "t".into(),
            raw_message: None,
        };
        let b = ProviderError::PermissionDenied {
            provider: "t".into(),
            raw_message: None,
        };
        assert_eq!(a.kind(), ErrorKind::Authentication);
        assert_eq!(b.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn not_found_variants_classify_as_not_found() {
        let e = ProviderError::DomainNotFound {
            provider: "t".into(),
            domain: "example.com".into(),
            raw_message: None,
        };
        assert_eq!(e.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn transport_failures_classify_as_provider() {
        let e = ProviderError::Timeout {
            provider: "t".into(),
            detail: "15s".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Provider);
        assert_eq!(unknown("boom").kind(), ErrorKind::Provider);
    }

    // ---- is_retryable ----

    #[test]
    fn transient_errors_are_retryable() {
        assert!(
            ProviderError::RateLimited {
                provider: "t".into(),
                retry_after: Some(3),
                raw_message: None,
            }
            .is_retryable()
        );
        assert!(
            ProviderError::NetworkError {
                provider: "t".into(),
                detail: "reset".into(),
            }
            .is_retryable()
        );
        assert!(unknown("internal error").is_retryable());
    }

    #[test]
    fn auth_errors_are_never_retryable() {
        assert!(
            !ProviderError::InvalidCredentials {
                provider: "t".into(),
                raw_message: None,
            }
            .is_retryable()
        );
        assert!(!unknown("Authentication token expired").is_retryable());
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        let e = ProviderError::InvalidParameter {
            provider: "t".into(),
            param: "content".into(),
            detail: "bad".into(),
        };
        assert!(!e.is_retryable());
        assert!(e.is_expected());
    }

    // ---- Display ----

    #[test]
    fn display_is_prefixed_with_provider() {
        let e = ProviderError::Configuration {
            provider: "aliyun".into(),
            detail: "missing AccessKey Secret".into(),
        };
        assert_eq!(
            e.to_string(),
            "[aliyun] Configuration error: missing AccessKey Secret"
        );
    }

    #[test]
    fn display_appends_raw_message_when_present() {
        let e = ProviderError::DomainNotFound {
            provider: "cloudflare".into(),
            domain: "zone-1".into(),
            raw_message: Some("Invalid zone identifier".into()),
        };
        assert_eq!(
            e.to_string(),
            "[cloudflare] Domain 'zone-1' not found: Invalid zone identifier"
        );
    }

    #[test]
    fn display_unsupported() {
        let e = ProviderError::Unsupported {
            provider: "aliyun".into(),
            feature: "email_forwarding".into(),
        };
        assert_eq!(e.to_string(), "[aliyun] Unsupported feature: email_forwarding");
    }

    // ---- serde ----

    #[test]
    fn serializes_with_code_tag() {
        let e = ProviderError::RateLimited {
            provider: "cloudflare".into(),
            retry_after: Some(60),
            raw_message: None,
        };
        let json = serde_json::to_value(&e).unwrap_or_default();
        assert_eq!(json["code"], "RateLimited");
        assert_eq!(json["retry_after"], 60);
    }
}
