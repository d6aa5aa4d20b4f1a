//! Cloudflare Email Routing
//!
//! Reference: <https://developers.cloudflare.com/api/resources/email_routing/>

use reqwest::Method;
use serde_json::Value;

use crate::error::Result;
use crate::traits::{ErrorContext, ProviderErrorMapper};
use crate::types::EmailSettings;

use super::CloudflareProvider;
use super::types::{EmailRoutingAction, EmailRoutingMatcher, EmailRoutingRule};

fn forward_to(destination: &str) -> Vec<EmailRoutingAction> {
    vec![EmailRoutingAction {
        action_type: "forward",
        value: vec![destination.to_string()],
    }]
}

impl CloudflareProvider {
    fn email_path(&self, suffix: &str) -> String {
        format!("/zones/{}/email/routing{suffix}", self.zone_id)
    }

    async fn email_call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<()> {
        self.call::<Value>(method, path, body, ErrorContext::domain(&self.zone_id))
            .await?;
        Ok(())
    }

    /// Enable or disable routing, then install the catch-all and each literal rule.
    ///
    /// Rules are created, never reconciled against existing ones.
    pub(crate) async fn apply_email_settings(&self, settings: &EmailSettings) -> Result<bool> {
        let toggle = if settings.enabled { "/enable" } else { "/disable" };
        let empty = Value::Object(serde_json::Map::new());
        self.email_call(Method::POST, &self.email_path(toggle), Some(&empty))
            .await?;

        if !settings.enabled {
            log::info!("[cloudflare] Email routing disabled for zone {}", self.zone_id);
            return Ok(true);
        }

        if let Some(ref catch_all) = settings.catch_all {
            let rule = EmailRoutingRule {
                name: Some("catch-all".to_string()),
                enabled: true,
                matchers: vec![EmailRoutingMatcher {
                    matcher_type: "all",
                    field: None,
                    value: None,
                }],
                actions: forward_to(catch_all),
            };
            let body = serde_json::to_value(&rule).map_err(|e| self.parse_error(e))?;
            self.email_call(Method::PUT, &self.email_path("/rules/catch_all"), Some(&body))
                .await?;
        }

        for rule in &settings.rules {
            let body = EmailRoutingRule {
                name: Some(rule.name.clone()),
                enabled: true,
                matchers: vec![EmailRoutingMatcher {
                    matcher_type: "literal",
                    field: Some("to"),
                    value: Some(rule.pattern.clone()),
                }],
                actions: forward_to(&rule.destination),
            };
            let body = serde_json::to_value(&body).map_err(|e| self.parse_error(e))?;
            self.email_call(Method::POST, &self.email_path("/rules"), Some(&body))
                .await?;
        }

        log::info!(
            "[cloudflare] Email routing enabled for zone {} with {} rule(s)",
            self.zone_id,
            settings.rules.len()
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::retry::RetryPolicy;
    use crate::traits::DnsProvider;
    use crate::types::{EmailForwardRule, EmailSettings};

    use super::CloudflareProvider;

    fn ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "result": {},
        }))
    }

    #[tokio::test]
    async fn enabling_installs_catch_all_and_rules() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/zones/zone-1/email/routing/enable"))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/zones/zone-1/email/routing/rules/catch_all"))
            .and(body_partial_json(json!({
                "matchers": [{"type": "all"}],
                "actions": [{"type": "forward", "value": ["inbox@example.net"]}],
            })))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/zones/zone-1/email/routing/rules"))
            .and(body_partial_json(json!({
                "name": "sales",
                "matchers": [{"type": "literal", "field": "to", "value": "sales@example.com"}],
            })))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;

        let p = CloudflareProvider::builder("zone-1", "key", "ops@example.com")
            .base_url(server.uri())
            .retry_policy(RetryPolicy::none())
            .build()
            .unwrap();
        let settings = EmailSettings {
            enabled: true,
            catch_all: Some("inbox@example.net".to_string()),
            rules: vec![EmailForwardRule {
                name: "sales".to_string(),
                pattern: "sales@example.com".to_string(),
                destination: "team@example.net".to_string(),
            }],
        };
        let res = p.configure_email_forwarding(&settings).await;
        assert!(matches!(res, Ok(true)), "unexpected: {res:?}");
    }

    #[tokio::test]
    async fn disabling_skips_rules() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/zones/zone-1/email/routing/disable"))
            .respond_with(ok())
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/zones/zone-1/email/routing/rules"))
            .respond_with(ok())
            .expect(0)
            .mount(&server)
            .await;

        let p = CloudflareProvider::builder("zone-1", "key", "ops@example.com")
            .base_url(server.uri())
            .retry_policy(RetryPolicy::none())
            .build()
            .unwrap();
        let settings = EmailSettings {
            enabled: false,
            catch_all: None,
            rules: vec![EmailForwardRule {
                name: "ignored".to_string(),
                pattern: "a@example.com".to_string(),
                destination: "b@example.net".to_string(),
            }],
        };
        let res = p.configure_email_forwarding(&settings).await;
        assert!(matches!(res, Ok(true)), "unexpected: {res:?}");
    }
}
