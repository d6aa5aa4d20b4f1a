//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use dns_migrate_provider::{
    CreateDnsRecordRequest, DnsConfig, DnsProvider, DnsRecord, DnsRecordType, RecordFilters,
    create_provider,
};

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(res.is_ok(), "{}: {res:?}", format_args!($($msg)+));
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 唯一的测试记录标签，统一以 `_test-` 开头便于清理
pub fn generate_test_label() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}", &uuid.to_string()[..8])
}

/// 每种类型的 (创建, 更新) 内容，均使用统一的内容语法
pub fn test_record_content(record_type: &DnsRecordType) -> (&'static str, &'static str) {
    match record_type {
        DnsRecordType::A => ("192.0.2.1", "192.0.2.2"),
        DnsRecordType::Aaaa => ("2001:db8::1", "2001:db8::2"),
        DnsRecordType::Cname => ("target1.example.com", "target2.example.com"),
        DnsRecordType::Mx => ("10 mail1.example.com", "20 mail2.example.com"),
        DnsRecordType::Srv => ("0 5 443 srv1.example.com", "10 10 8443 srv2.example.com"),
        DnsRecordType::Caa => ("0 issue \"letsencrypt.org\"", "0 issue \"digicert.com\""),
        _ => ("test-value-1", "test-value-2"),
    }
}

/// 测试上下文 - 封装 Provider 和测试域名
pub struct TestContext {
    pub provider: Arc<dyn DnsProvider>,
    pub domain: String,
}

impl TestContext {
    /// 创建 Cloudflare 测试上下文
    pub fn cloudflare() -> Option<Self> {
        let config = DnsConfig::cloudflare(
            env::var("CF_ZONE_ID").ok()?,
            env::var("CF_API_KEY").ok()?,
            env::var("CF_EMAIL").ok()?,
        );
        Some(Self {
            provider: create_provider(&config).ok()?,
            domain: env::var("TEST_DOMAIN").ok()?,
        })
    }

    /// 创建 Aliyun 测试上下文
    pub fn aliyun() -> Option<Self> {
        let domain = env::var("TEST_DOMAIN").ok()?;
        let mut config = DnsConfig::aliyun(
            env::var("ALIYUN_ACCESS_KEY_ID").ok()?,
            env::var("ALIYUN_ACCESS_KEY_SECRET").ok()?,
            domain.clone(),
        );
        config.aliyun_region = env::var("ALIYUN_REGION").ok();
        Some(Self {
            provider: create_provider(&config).ok()?,
            domain,
        })
    }

    /// 测试记录的完整名称
    pub fn fqdn(&self, label: &str) -> String {
        format!("{label}.{}", self.domain)
    }

    /// 创建一条 TXT 测试记录
    pub async fn create_test_record(&self) -> Option<DnsRecord> {
        let request = CreateDnsRecordRequest::new(
            DnsRecordType::Txt,
            self.fqdn(&generate_test_label()),
            "integration-test",
        )
        .with_ttl(600);
        self.provider.create_record(&request).await.ok()
    }

    /// 查找并清理所有测试记录（名称含 `_test-`）
    pub async fn cleanup_all_test_records(&self) {
        if let Ok(records) = self
            .provider
            .list_all_records(&RecordFilters::default())
            .await
        {
            for record in records.iter().filter(|r| r.name.contains("_test-")) {
                let _ = self.provider.delete_record(&record.id).await;
            }
        }
    }
}
