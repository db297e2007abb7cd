// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 链接关系实体
///
/// 记录某次爬取中一个页面的全部出站链接。
/// 以 `(crawl_id, parent_url)` 为键，每个键至多一条记录，后写覆盖先写。
/// 爬取存续期间不会被删除。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRelationship {
    /// 爬取运行ID
    #[serde(rename = "CrawlID")]
    pub crawl_id: String,
    /// 规范化后的父页面URL
    #[serde(rename = "ParentURL")]
    pub parent_url: String,
    /// 过滤后的绝对子URL，保持页面中的出现顺序
    #[serde(rename = "ChildURLs", default)]
    pub child_urls: Vec<String>,
}

impl LinkRelationship {
    pub fn new(
        crawl_id: impl Into<String>,
        parent_url: impl Into<String>,
        child_urls: Vec<String>,
    ) -> Self {
        Self {
            crawl_id: crawl_id.into(),
            parent_url: parent_url.into(),
            child_urls,
        }
    }
}
