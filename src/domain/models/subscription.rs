// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 订阅实体
///
/// 一个实时连接对某次爬取的订阅。主键为 `connection_id`，
/// 同一连接同一时刻至多订阅一次爬取；另有按 `crawl_id` 的二级查询路径。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// 被订阅的爬取运行ID
    #[serde(rename = "CrawlID")]
    pub crawl_id: String,
    /// 推送通道上的连接ID
    #[serde(rename = "ConnectionID")]
    pub connection_id: String,
    /// 推送端点地址
    #[serde(rename = "DeliveryEndpoint")]
    pub delivery_endpoint: String,
}

impl Subscription {
    pub fn new(
        crawl_id: impl Into<String>,
        connection_id: impl Into<String>,
        delivery_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            crawl_id: crawl_id.into(),
            connection_id: connection_id.into(),
            delivery_endpoint: delivery_endpoint.into(),
        }
    }
}
