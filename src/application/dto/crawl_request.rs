// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 爬取启动请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CrawlRequestDto {
    /// 根页面URL
    #[serde(rename = "RootURL", default)]
    #[validate(length(min = 1, message = "RootURL is required"))]
    pub root_url: String,
    /// 爬取运行ID
    #[serde(rename = "CrawlID", default)]
    #[validate(length(min = 1, message = "CrawlID is required"))]
    pub crawl_id: String,
}
