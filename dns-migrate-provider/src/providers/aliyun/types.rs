//! 阿里云 API 类型定义和 query string 编码

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProviderError, Result};

// ============ Query string ============

/// Percent-encode per RFC3986: unreserved bytes pass through, the rest become `%XX`.
pub fn rfc3986_encode(s: &str) -> String {
    s.bytes().fold(String::with_capacity(s.len()), |mut out, b| {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{b:02X}");
        }
        out
    })
}

/// Flatten a JSON value into RPC parameters.
///
/// Nested objects use dotted keys, arrays are numbered from 1 (`Key.1`, `Key.2`), nulls
/// are dropped.
fn flatten_params(key: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    let child = |suffix: &str| {
        if key.is_empty() {
            suffix.to_string()
        } else {
            format!("{key}.{suffix}")
        }
    };
    match value {
        Value::Null => {}
        Value::Object(fields) => {
            for (name, v) in fields {
                flatten_params(&child(name), v, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_params(&child(&(i + 1).to_string()), v, out);
            }
        }
        Value::String(s) => {
            out.insert(key.to_string(), s.clone());
        }
        other => {
            out.insert(key.to_string(), other.to_string());
        }
    }
}

/// Serialize request parameters as the sorted, encoded query string that gets signed.
pub fn serialize_to_query_string<T: Serialize>(params: &T) -> Result<String> {
    let value = serde_json::to_value(params).map_err(|e| ProviderError::SerializationError {
        provider: "aliyun".to_string(),
        detail: e.to_string(),
    })?;

    let mut flat = BTreeMap::new();
    flatten_params("", &value, &mut flat);

    Ok(flat
        .iter()
        .map(|(k, v)| format!("{}={}", rfc3986_encode(k), rfc3986_encode(v)))
        .collect::<Vec<_>>()
        .join("&"))
}

// ============ Request parameters ============

/// `AddDomainRecord` / `UpdateDomainRecord`. Exactly one of `domain_name` and
/// `record_id` is set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(rename = "RR")]
    pub rr: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    pub value: String,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    pub line: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordIdParams<'a> {
    pub record_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDomainRecordsParams<'a> {
    pub domain_name: &'a str,
    pub page_number: u32,
    pub page_size: u32,
    /// 主机记录关键字（模糊搜索）
    #[serde(rename = "RRKeyWord", skip_serializing_if = "Option::is_none")]
    pub rr_keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_key_word: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_key_word: Option<&'a str>,
}

// ============ Responses ============

#[derive(Debug, Deserialize)]
pub struct DescribeDomainRecordsResponse {
    #[serde(rename = "DomainRecords")]
    pub domain_records: Option<DomainRecordsWrapper>,
    #[serde(rename = "TotalCount")]
    pub total_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DomainRecordsWrapper {
    #[serde(rename = "Record", default)]
    pub record: Vec<AliyunRecord>,
}

/// A record from `DescribeDomainRecords` or `DescribeDomainRecordInfo`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AliyunRecord {
    pub record_id: String,
    pub domain_name: Option<String>,
    #[serde(rename = "RR")]
    pub rr: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    pub value: String,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    pub priority: Option<u16>,
    pub create_timestamp: Option<i64>,
    pub update_timestamp: Option<i64>,
}

/// `AddDomainRecord`, `UpdateDomainRecord` and `DeleteDomainRecord` all answer with the id.
#[derive(Debug, Deserialize)]
pub struct RecordIdResponse {
    #[serde(rename = "RecordId")]
    pub record_id: Option<String>,
}
