// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 推送错误类型
///
/// 任何推送失败都被视为订阅者已失效的信号。
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// 端点拒绝投递（非2xx状态，例如410 Gone）
    #[error("Endpoint rejected delivery with status {0}")]
    Rejected(u16),

    /// 传输错误
    #[error("Transport error: {0}")]
    Transport(String),

    /// 投递端点无效
    #[error("Invalid delivery endpoint: {0}")]
    InvalidEndpoint(String),
}

/// 推送通道特质
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// 将负载推送给 `(endpoint, connection_id)` 标识的订阅者
    ///
    /// # 参数
    ///
    /// * `endpoint` - 投递端点
    /// * `connection_id` - 连接ID
    /// * `payload` - JSON负载
    async fn push(
        &self,
        endpoint: &str,
        connection_id: &str,
        payload: &str,
    ) -> Result<(), DeliveryError>;
}
