//! 阿里云 ACS3-HMAC-SHA256 签名
//!
//! 参考: <https://www.alibabacloud.com/help/zh/sdk/product-overview/v3-request-structure-and-signature>

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::providers::common::hmac_sha256;

use super::{ALIYUN_DNS_VERSION, AliyunProvider, EMPTY_BODY_SHA256};

const ALGORITHM: &str = "ACS3-HMAC-SHA256";
const SIGNED_HEADERS: &str =
    "host;x-acs-action;x-acs-content-sha256;x-acs-date;x-acs-signature-nonce;x-acs-version";

/// Per-attempt signing inputs.
pub(crate) struct SignInput<'a> {
    pub action: &'a str,
    /// Sorted, RFC3986-encoded query string.
    pub query: &'a str,
    /// `%Y-%m-%dT%H:%M:%SZ`
    pub timestamp: &'a str,
    pub nonce: &'a str,
}

impl AliyunProvider {
    /// Canonical request for an RPC call with an empty body.
    fn canonical_request(&self, input: &SignInput<'_>) -> String {
        let SignInput {
            action,
            query,
            timestamp,
            nonce,
        } = input;
        let host = &self.host;
        let headers = format!(
            "host:{host}\nx-acs-action:{action}\nx-acs-content-sha256:{EMPTY_BODY_SHA256}\nx-acs-date:{timestamp}\nx-acs-signature-nonce:{nonce}\nx-acs-version:{ALIYUN_DNS_VERSION}\n"
        );
        format!("POST\n/\n{query}\n{headers}\n{SIGNED_HEADERS}\n{EMPTY_BODY_SHA256}")
    }

    /// `Authorization` header value for one attempt.
    pub(crate) fn authorization(&self, input: &SignInput<'_>) -> Result<String> {
        let canonical = self.canonical_request(input);
        let digest = hex::encode(Sha256::digest(canonical.as_bytes()));
        let string_to_sign = format!("{ALGORITHM}\n{digest}");
        log::trace!("[aliyun] string to sign for {}: {string_to_sign}", input.action);

        let signature = hex::encode(hmac_sha256(
            "aliyun",
            self.access_key_secret.as_bytes(),
            string_to_sign.as_bytes(),
        )?);

        Ok(format!(
            "{ALGORITHM} Credential={},SignedHeaders={SIGNED_HEADERS},Signature={signature}",
            self.access_key_id
        ))
    }
}
