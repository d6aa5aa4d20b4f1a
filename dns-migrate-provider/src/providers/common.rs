//! Provider 公共工具函数

use std::future::Future;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{ProviderError, Result};
use crate::types::{DnsRecord, PaginatedResponse, RecordFilters};

type HmacSha256 = Hmac<Sha256>;

// ============ HMAC-SHA256 ============

pub fn hmac_sha256(provider: &str, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| ProviderError::SerializationError {
        provider: provider.to_string(),
        detail: format!("HMAC key rejected: {e}"),
    })?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

// ============ 域名名称处理 ============

/// 去掉域名末尾的点
pub fn normalize_domain_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_string()
}

/// Host label relative to `zone`.
///
/// `"www.example.com"` → `"www"`, `"example.com"` or `"@"` → `"@"`.
/// Names outside the zone are kept as given.
pub fn full_name_to_relative(full_name: &str, zone_name: &str) -> String {
    let full = normalize_domain_name(full_name);
    let zone = normalize_domain_name(zone_name);

    if full.is_empty() || full == "@" || full.eq_ignore_ascii_case(&zone) {
        return "@".to_string();
    }
    let suffix = format!(".{}", zone.to_ascii_lowercase());
    if full.to_ascii_lowercase().ends_with(&suffix) {
        full[..full.len() - suffix.len()].to_string()
    } else {
        full
    }
}

/// `"www"` + `"example.com"` → `"www.example.com"`; `"@"` → `"example.com"`.
pub fn relative_to_full_name(relative_name: &str, zone_name: &str) -> String {
    let zone = normalize_domain_name(zone_name);
    if relative_name == "@" || relative_name.is_empty() {
        zone
    } else {
        format!("{relative_name}.{zone}")
    }
}

// ============ Pagination ============

/// One backend page: records plus the backend's total count.
pub type BackendPage = (Vec<DnsRecord>, u32);

/// Serve `filters.page`/`filters.per_page` from a backend capped at `max_page_size`.
///
/// When the requested page fits, one backend call is made. Otherwise the backend pages
/// covering the requested window are fetched in order and the window is sliced out.
pub async fn paginate<F, Fut>(
    filters: &RecordFilters,
    max_page_size: u32,
    mut fetch: F,
) -> Result<PaginatedResponse<DnsRecord>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<BackendPage>>,
{
    let page = filters.page();
    let per_page = filters.per_page();

    if per_page <= max_page_size {
        let (items, total) = fetch(page, per_page).await?;
        return Ok(PaginatedResponse::new(items, page, per_page, total));
    }

    let start = u64::from(page - 1) * u64::from(per_page);
    let end = start + u64::from(per_page);
    let size = u64::from(max_page_size);
    let first_backend_page = start / size + 1;
    let last_backend_page = end.div_ceil(size);

    let mut collected = Vec::new();
    let mut total = 0;
    for backend_page in first_backend_page..=last_backend_page {
        let backend_page = u32::try_from(backend_page).map_err(|_| ProviderError::InvalidParameter {
            provider: "pagination".to_string(),
            param: "page".to_string(),
            detail: format!("page {page} is out of range"),
        })?;
        let (items, backend_total) = fetch(backend_page, max_page_size).await?;
        total = backend_total;
        let short = items.len() < max_page_size as usize;
        collected.extend(items);
        if short || u64::from(backend_page) * size >= u64::from(total) {
            break;
        }
    }

    let skip = usize::try_from(start - (first_backend_page - 1) * size).unwrap_or(usize::MAX);
    let items: Vec<DnsRecord> = collected
        .into_iter()
        .skip(skip)
        .take(per_page as usize)
        .collect();
    Ok(PaginatedResponse::new(items, page, per_page, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DnsRecordType;
    use std::sync::Mutex;

    fn record(i: u32) -> DnsRecord {
        DnsRecord {
            id: i.to_string(),
            zone_id: None,
            zone_name: None,
            name: format!("r{i}.example.com"),
            record_type: DnsRecordType::A,
            content: "192.0.2.1".into(),
            ttl: 600,
            priority: None,
            comment: None,
            tags: Vec::new(),
            proxied: false,
            proxiable: false,
            created_on: None,
            modified_on: None,
            meta: None,
        }
    }

    /// Backend holding `total` records, capped at `max` per page.
    async fn backend_page(total: u32, page: u32, size: u32) -> Result<BackendPage> {
        let start = (page - 1) * size;
        let items = (start..(start + size).min(total)).map(record).collect();
        Ok((items, total))
    }

    // ---- names ----

    #[test]
    fn relative_names() {
        assert_eq!(full_name_to_relative("www.example.com", "example.com"), "www");
        assert_eq!(full_name_to_relative("example.com.", "example.com"), "@");
        assert_eq!(full_name_to_relative("@", "example.com"), "@");
        assert_eq!(full_name_to_relative("a.b.Example.com", "example.com"), "a.b");
        assert_eq!(full_name_to_relative("mail", "example.com"), "mail");
    }

    #[test]
    fn full_names() {
        assert_eq!(relative_to_full_name("@", "example.com"), "example.com");
        assert_eq!(relative_to_full_name("www", "example.com."), "www.example.com");
    }

    #[test]
    fn hmac_matches_known_vector() {
        // RFC 4231 test case 2
        let mac = hmac_sha256("t", b"Jefe", b"what do ya want for nothing?").unwrap_or_default();
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    // ---- paginate ----

    #[tokio::test]
    async fn small_page_is_a_single_call() {
        let calls = Mutex::new(Vec::new());
        let filters = RecordFilters {
            page: Some(2),
            per_page: Some(20),
            ..Default::default()
        };
        let res = paginate(&filters, 100, |p, s| {
            if let Ok(mut c) = calls.lock() {
                c.push((p, s));
            }
            backend_page(250, p, s)
        })
        .await;
        assert!(res.is_ok(), "unexpected: {res:?}");
        let Ok(res) = res else { return };
        assert_eq!(res.items.first().map(|r| r.id.as_str()), Some("20"));
        assert_eq!(res.total_count, 250);
        assert_eq!(calls.lock().map(|c| c.clone()).unwrap_or_default(), vec![(2, 20)]);
    }

    #[tokio::test]
    async fn large_page_walks_backend_pages() {
        let filters = RecordFilters {
            page: Some(1),
            per_page: Some(250),
            ..Default::default()
        };
        let res = paginate(&filters, 100, |p, s| backend_page(260, p, s)).await;
        assert!(res.is_ok(), "unexpected: {res:?}");
        let Ok(res) = res else { return };
        assert_eq!(res.count, 250);
        assert_eq!(res.items.last().map(|r| r.id.as_str()), Some("249"));
        assert!(res.has_more);
    }

    #[tokio::test]
    async fn unaligned_window_is_sliced() {
        let filters = RecordFilters {
            page: Some(2),
            per_page: Some(150),
            ..Default::default()
        };
        let res = paginate(&filters, 100, |p, s| backend_page(260, p, s)).await;
        assert!(res.is_ok(), "unexpected: {res:?}");
        let Ok(res) = res else { return };
        // window [150, 260)
        assert_eq!(res.count, 110);
        assert_eq!(res.items.first().map(|r| r.id.as_str()), Some("150"));
        assert!(!res.has_more);
    }
}
