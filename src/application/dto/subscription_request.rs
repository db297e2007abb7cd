// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 订阅请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SubscriptionRequestDto {
    #[serde(rename = "CrawlID", default)]
    #[validate(length(min = 1, message = "CrawlID is required"))]
    pub crawl_id: String,
    #[serde(rename = "ConnectionID", default)]
    #[validate(length(min = 1, message = "ConnectionID is required"))]
    pub connection_id: String,
    /// 推送端点，变更通过 `{DeliveryEndpoint}/@connections/{ConnectionID}` 投递
    #[serde(rename = "DeliveryEndpoint", default)]
    #[validate(url(message = "DeliveryEndpoint must be a valid URL"))]
    pub delivery_endpoint: String,
}
