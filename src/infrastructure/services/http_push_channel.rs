// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::push_channel::{DeliveryError, PushChannel};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header;
use sha2::Sha256;
use std::time::Duration;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// 签名头
pub const SIGNATURE_HEADER: &str = "X-Crawlgraph-Signature";

/// 基于HTTP的推送通道实现
///
/// 向 `{endpoint}/@connections/{connection_id}` 发送POST请求。
pub struct HttpPushChannel {
    /// HTTP 客户端
    client: reqwest::Client,
    /// 签名密钥，未配置时不签名
    secret: Option<String>,
    /// 单次推送超时
    timeout: Duration,
}

impl HttpPushChannel {
    /// 创建新的HTTP推送通道
    ///
    /// # 参数
    ///
    /// * `client` - HTTP 客户端
    /// * `secret` - 签名密钥
    /// * `timeout` - 单次推送超时
    pub fn new(client: reqwest::Client, secret: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            secret: secret.filter(|s| !s.is_empty()),
            timeout,
        }
    }

    /// 为负载生成签名
    fn generate_signature(&self, payload: &str) -> Option<String> {
        let secret = self.secret.as_ref()?;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(payload.as_bytes());
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    /// 构造连接地址
    fn connection_url(endpoint: &str, connection_id: &str) -> Result<Url, DeliveryError> {
        let mut url = Url::parse(endpoint)
            .map_err(|e| DeliveryError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| DeliveryError::InvalidEndpoint(endpoint.to_string()))?
            .pop_if_empty()
            .push("@connections")
            .push(connection_id);
        Ok(url)
    }
}

#[async_trait]
impl PushChannel for HttpPushChannel {
    async fn push(
        &self,
        endpoint: &str,
        connection_id: &str,
        payload: &str,
    ) -> Result<(), DeliveryError> {
        let url = Self::connection_url(endpoint, connection_id)?;

        let mut request = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .timeout(self.timeout);

        if let Some(signature) = self.generate_signature(payload) {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Rejected(response.status().as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn channel(secret: Option<&str>) -> HttpPushChannel {
        HttpPushChannel::new(
            reqwest::Client::new(),
            secret.map(str::to_string),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_connection_url() {
        let url = HttpPushChannel::connection_url("https://push.example.com/prod/", "abc=").unwrap();
        assert_eq!(url.as_str(), "https://push.example.com/prod/@connections/abc=");

        let url = HttpPushChannel::connection_url("https://push.example.com", "a b").unwrap();
        assert_eq!(url.as_str(), "https://push.example.com/@connections/a%20b");

        assert!(matches!(
            HttpPushChannel::connection_url("not a url", "abc"),
            Err(DeliveryError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_push_delivers_signed_payload() {
        let payload = r#"{"CrawlID":"crawl-1"}"#;
        let channel = channel(Some("secret"));
        let expected = channel.generate_signature(payload).unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/@connections/conn-1"))
            .and(header(SIGNATURE_HEADER, expected.as_str()))
            .and(body_string(payload))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        channel.push(&server.uri(), "conn-1", payload).await.unwrap();
    }

    #[tokio::test]
    async fn test_push_gone_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let result = channel(None).push(&server.uri(), "conn-1", "{}").await;

        assert!(matches!(result, Err(DeliveryError::Rejected(410))));
    }

    #[tokio::test]
    async fn test_push_unreachable_is_transport_error() {
        let result = channel(None)
            .push("http://127.0.0.1:1", "conn-1", "{}")
            .await;

        assert!(matches!(result, Err(DeliveryError::Transport(_))));
    }

    #[test]
    fn test_no_secret_means_no_signature() {
        assert!(channel(None).generate_signature("{}").is_none());
        assert!(channel(Some("")).generate_signature("{}").is_none());
    }
}
