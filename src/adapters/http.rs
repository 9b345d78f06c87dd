use crate::config::TargetConfig;
use crate::domain::model::IntentStatus;
use crate::domain::ports::IntentApi;
use crate::utils::error::{LoadTestError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateIntentRequest<'a> {
    sub_total: u32,
    tip: u32,
    tax: u32,
    merchant_reference: String,
    manual_card_entry: bool,
    postback_url: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIntentResponse {
    #[serde(default)]
    intent_id: String,
}

#[derive(Debug, Serialize)]
struct ProcessIntentRequest<'a> {
    tid: &'a str,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    #[serde(default)]
    status: String,
}

/// reqwest-backed client for the device payment-intent endpoints.
#[derive(Debug, Clone)]
pub struct HttpIntentClient {
    client: Client,
    host: String,
    postback_url: String,
}

impl HttpIntentClient {
    pub fn new(target: &TargetConfig) -> Result<Self> {
        let mut api_key = HeaderValue::from_str(&target.api_key).map_err(|e| {
            LoadTestError::InvalidConfigValueError {
                field: "api_key".to_string(),
                value: "<redacted>".to_string(),
                reason: e.to_string(),
            }
        })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(target.request_timeout)
            .build()?;

        Ok(Self {
            client,
            host: target.host.trim_end_matches('/').to_string(),
            postback_url: target.postback_url.clone(),
        })
    }

    fn merchant_url(&self, merchant_id: &str, path: &str) -> String {
        format!("{}/devices/merchant/{}/{}", self.host, merchant_id, path)
    }

    async fn error_for_status(response: Response) -> LoadTestError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        LoadTestError::UnexpectedStatus { status, body }
    }
}

#[async_trait]
impl IntentApi for HttpIntentClient {
    async fn create_intent(&self, merchant_id: &str) -> Result<String> {
        let url = self.merchant_url(merchant_id, "intent/payment");
        let payload = CreateIntentRequest {
            sub_total: 1,
            tip: 0,
            tax: 0,
            merchant_reference: chrono::Local::now().format("%Y%m%d%H%M%S").to_string(),
            manual_card_entry: false,
            postback_url: &self.postback_url,
        };

        tracing::debug!("POST {}", url);
        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let created: CreateIntentResponse = response.json().await?;
        Ok(created.intent_id)
    }

    async fn process_intent(
        &self,
        merchant_id: &str,
        terminal_id: &str,
        intent_id: &str,
    ) -> Result<u16> {
        let url = self.merchant_url(merchant_id, &format!("intent/{}/process", intent_id));

        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(&ProcessIntentRequest { tid: terminal_id })
            .send()
            .await?;
        Ok(response.status().as_u16())
    }

    async fn get_intent_status(&self, merchant_id: &str, intent_id: &str) -> Result<IntentStatus> {
        let url = self.merchant_url(merchant_id, &format!("intent/{}", intent_id));

        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let intent: IntentResponse = response.json().await?;
        Ok(IntentStatus::from(intent.status.as_str()))
    }

    async fn get_terminal_status(&self, merchant_id: &str, terminal_id: &str) -> Result<String> {
        let url = self.merchant_url(merchant_id, &format!("terminals/{}", terminal_id));

        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let body: serde_json::Value = response.json().await?;
        Ok(body
            .pointer("/terminal/status/connectivity")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn client(server: &MockServer) -> HttpIntentClient {
        HttpIntentClient::new(&TargetConfig {
            host: server.base_url(),
            api_key: "test-key".to_string(),
            postback_url: "https://postback.example.com/hook".to_string(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_intent_sends_payload_and_key() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/devices/merchant/M1/intent/payment")
                .header("x-api-key", "test-key")
                .json_body_partial(
                    r#"{
                        "subTotal": 1,
                        "tip": 0,
                        "tax": 0,
                        "manualCardEntry": false,
                        "postbackUrl": "https://postback.example.com/hook"
                    }"#,
                );
            then.status(201)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"intentId": "intent-42"}));
        });

        let intent_id = client(&server).create_intent("M1").await.unwrap();

        mock.assert();
        assert_eq!(intent_id, "intent-42");
    }

    #[tokio::test]
    async fn test_create_intent_failure_carries_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/devices/merchant/M1/intent/payment");
            then.status(503).body("maintenance");
        });

        let err = client(&server).create_intent("M1").await.unwrap_err();

        assert!(matches!(
            err,
            LoadTestError::UnexpectedStatus { status: 503, ref body } if body == "maintenance"
        ));
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[tokio::test]
    async fn test_process_intent_returns_raw_status() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/devices/merchant/M1/intent/intent-42/process")
                .json_body(serde_json::json!({"tid": "T1"}));
            then.status(422);
        });

        let code = client(&server).process_intent("M1", "T1", "intent-42").await.unwrap();

        mock.assert();
        assert_eq!(code, 422);
    }

    #[tokio::test]
    async fn test_get_intent_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/devices/merchant/M1/intent/intent-42");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"intentId": "intent-42", "status": "COMPLETED"}));
        });

        let status = client(&server).get_intent_status("M1", "intent-42").await.unwrap();

        assert_eq!(status, IntentStatus::Completed);
    }

    #[tokio::test]
    async fn test_get_terminal_status_tolerates_missing_field() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/devices/merchant/M1/terminals/T1");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "terminal": {"status": {"connectivity": "AVAILABLE"}}
                }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/devices/merchant/M1/terminals/T2");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"terminal": {}}));
        });

        let client = client(&server);
        assert_eq!(client.get_terminal_status("M1", "T1").await.unwrap(), "AVAILABLE");
        assert_eq!(client.get_terminal_status("M1", "T2").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_host_trailing_slash_is_ignored() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/devices/merchant/M1/intent/i-1");
            then.status(200).json_body(serde_json::json!({"status": "PROCESSING"}));
        });

        let client = HttpIntentClient::new(&TargetConfig {
            host: format!("{}/", server.base_url()),
            api_key: "k".to_string(),
            postback_url: "https://postback.example.com".to_string(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap();

        assert_eq!(client.get_intent_status("M1", "i-1").await.unwrap(), IntentStatus::Processing);
        mock.assert();
    }
}
