//! Record validation shared by every provider.
//!
//! Runs before any network call. Shape rules (type, name, content present) come first,
//! then the per-type content grammar. TTLs are never rejected, only clamped through a
//! provider's [`TtlPolicy`].

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ProviderError, Result};
use crate::types::{CreateDnsRecordRequest, DnsRecordType};

const MAX_DOMAIN_LEN: usize = 253;
const MAX_TEXT_LEN: usize = 255;

static DOMAIN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?)*\.?$",
    )
    .ok()
});

static CAA_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"^(\d+)\s+(issue|issuewild|iodef)\s+"([^"]*)"$"#).ok());

/// TTL band of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub min: u32,
    pub max: u32,
    /// Used when the caller gives no TTL (or `0`).
    pub default: u32,
    /// Sentinel value passed through untouched (Cloudflare's `1` = automatic).
    pub auto: Option<u32>,
}

impl TtlPolicy {
    /// Bring `ttl` into the legal band. Never fails.
    pub fn clamp(&self, ttl: Option<u32>) -> u32 {
        match ttl {
            None | Some(0) => self.default,
            Some(v) if Some(v) == self.auto => v,
            Some(v) => v.clamp(self.min, self.max),
        }
    }
}

/// Parsed MX content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MxContent<'a> {
    pub priority: u16,
    pub target: &'a str,
}

/// Parsed SRV content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrvContent<'a> {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: &'a str,
}

/// Parsed CAA content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaaContent {
    pub flags: u8,
    pub tag: String,
    pub value: String,
}

/// Domain-label grammar check used for CNAME, NS, PTR, MX and SRV targets.
pub fn is_valid_domain(name: &str) -> bool {
    name.len() <= MAX_DOMAIN_LEN
        && DOMAIN_RE
            .as_ref()
            .is_some_and(|re| re.is_match(name))
}

fn invalid(provider: &str, param: &str, detail: impl Into<String>) -> ProviderError {
    ProviderError::InvalidParameter {
        provider: provider.to_string(),
        param: param.to_string(),
        detail: detail.into(),
    }
}

fn parse_u16_in(token: &str, min: u16) -> Option<u16> {
    token.parse::<u16>().ok().filter(|v| *v >= min)
}

/// Parse `"<priority> <target>"`.
pub fn parse_mx<'a>(provider: &str, content: &'a str) -> Result<MxContent<'a>> {
    let parts: Vec<&str> = content.split(' ').collect();
    let &[priority, target] = parts.as_slice() else {
        return Err(invalid(
            provider,
            "content",
            "MX content must be \"<priority> <target>\"",
        ));
    };
    let priority = parse_u16_in(priority, 0).ok_or_else(|| {
        invalid(
            provider,
            "content",
            "MX priority must be an integer between 0 and 65535",
        )
    })?;
    if !is_valid_domain(target) {
        return Err(invalid(
            provider,
            "content",
            format!("MX target '{target}' is not a valid domain name"),
        ));
    }
    Ok(MxContent { priority, target })
}

/// Parse `"<priority> <weight> <port> <target>"`.
pub fn parse_srv<'a>(provider: &str, content: &'a str) -> Result<SrvContent<'a>> {
    let parts: Vec<&str> = content.split(' ').collect();
    let &[priority, weight, port, target] = parts.as_slice() else {
        return Err(invalid(
            provider,
            "content",
            "SRV content must be \"<priority> <weight> <port> <target>\"",
        ));
    };
    let priority = parse_u16_in(priority, 0).ok_or_else(|| {
        invalid(
            provider,
            "content",
            "SRV priority must be an integer between 0 and 65535",
        )
    })?;
    let weight = parse_u16_in(weight, 0).ok_or_else(|| {
        invalid(
            provider,
            "content",
            "SRV weight must be an integer between 0 and 65535",
        )
    })?;
    let port = parse_u16_in(port, 1).ok_or_else(|| {
        invalid(
            provider,
            "content",
            "SRV port must be an integer between 1 and 65535",
        )
    })?;
    if !is_valid_domain(target) {
        return Err(invalid(
            provider,
            "content",
            format!("SRV target '{target}' is not a valid domain name"),
        ));
    }
    Ok(SrvContent {
        priority,
        weight,
        port,
        target,
    })
}

/// Parse `<flag> <tag> "<value>"`.
pub fn parse_caa(provider: &str, content: &str) -> Result<CaaContent> {
    let caps = CAA_RE
        .as_ref()
        .and_then(|re| re.captures(content))
        .ok_or_else(|| {
            invalid(
                provider,
                "content",
                "CAA content must be <flag> <issue|issuewild|iodef> \"<value>\"",
            )
        })?;
    let flags = caps[1]
        .parse::<u8>()
        .map_err(|_| invalid(provider, "content", "CAA flag must be between 0 and 255"))?;
    Ok(CaaContent {
        flags,
        tag: caps[2].to_string(),
        value: caps[3].to_string(),
    })
}

/// Content in the unified grammar.
///
/// Callers may give MX/SRV content without the leading priority and put it in the
/// `priority` field instead; this folds it back in. When both are given the content wins.
pub fn canonical_content(req: &CreateDnsRecordRequest) -> String {
    let content = req.content.trim();
    let expected_tokens = match req.record_type {
        DnsRecordType::Mx => 2,
        DnsRecordType::Srv => 4,
        _ => return content.to_string(),
    };
    match req.priority {
        Some(p) if content.split(' ').count() == expected_tokens - 1 => format!("{p} {content}"),
        _ => content.to_string(),
    }
}

/// Check the per-type content grammar.
pub fn validate_content(provider: &str, record_type: &DnsRecordType, content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(invalid(provider, "content", "Record content cannot be empty"));
    }

    match record_type {
        DnsRecordType::A => {
            if content.parse::<Ipv4Addr>().is_err() {
                return Err(invalid(
                    provider,
                    "content",
                    format!("'{content}' is not a valid IPv4 address"),
                ));
            }
        }
        DnsRecordType::Aaaa => {
            if content.parse::<Ipv6Addr>().is_err() {
                return Err(invalid(
                    provider,
                    "content",
                    format!("'{content}' is not a valid IPv6 address"),
                ));
            }
        }
        DnsRecordType::Cname => {
            if content.parse::<Ipv4Addr>().is_ok() {
                return Err(invalid(
                    provider,
                    "content",
                    "CNAME target cannot be an IP address",
                ));
            }
            if !is_valid_domain(content) {
                return Err(invalid(
                    provider,
                    "content",
                    format!("CNAME target '{content}' is not a valid domain name"),
                ));
            }
        }
        DnsRecordType::Mx => {
            parse_mx(provider, content)?;
        }
        DnsRecordType::Txt => {
            if content.chars().count() > MAX_TEXT_LEN {
                return Err(invalid(
                    provider,
                    "content",
                    format!("TXT content exceeds {MAX_TEXT_LEN} characters"),
                ));
            }
            if content.chars().any(|c| c.is_ascii_control()) {
                return Err(invalid(
                    provider,
                    "content",
                    "TXT content cannot contain control characters",
                ));
            }
        }
        DnsRecordType::Ns | DnsRecordType::Ptr => {
            if !is_valid_domain(content) {
                return Err(invalid(
                    provider,
                    "content",
                    format!("{record_type} target '{content}' is not a valid domain name"),
                ));
            }
        }
        DnsRecordType::Srv => {
            parse_srv(provider, content)?;
        }
        DnsRecordType::Caa => {
            parse_caa(provider, content)?;
        }
        DnsRecordType::Other(_) => {
            if content.chars().count() > MAX_TEXT_LEN {
                return Err(invalid(
                    provider,
                    "content",
                    format!("Record content exceeds {MAX_TEXT_LEN} characters"),
                ));
            }
        }
    }
    Ok(())
}

/// Validate shape and content of a record before it is sent anywhere.
pub fn validate_record(provider: &str, req: &CreateDnsRecordRequest) -> Result<()> {
    if req.record_type.as_str().trim().is_empty() {
        return Err(invalid(provider, "type", "Record type is required"));
    }
    if req.name.trim().is_empty() {
        return Err(invalid(provider, "name", "Record name is required"));
    }
    if req.content.trim().is_empty() {
        return Err(invalid(provider, "content", "Record content is required"));
    }

    let content = canonical_content(req);
    if req.record_type == DnsRecordType::Mx && !content.contains(' ') {
        return Err(invalid(provider, "priority", "MX records require a priority"));
    }
    validate_content(provider, &req.record_type, &content)
}
