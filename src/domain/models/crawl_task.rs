// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 根页面的深度
pub const ROOT_DEPTH: u32 = 1;

/// 爬取任务
///
/// 表示"在某次爬取中以给定深度抓取并处理这一个URL"的工作单元。
/// 任务一经创建即不可变，由爬取流水线消费。
///
/// 线上格式为 `{"URL": .., "CrawlID": .., "Depth": ..}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTask {
    /// 待抓取的页面URL
    #[serde(rename = "URL")]
    pub url: String,
    /// 爬取运行ID，同一次遍历中的所有任务共享
    #[serde(rename = "CrawlID")]
    pub crawl_id: String,
    /// 深度，根页面为1，每跳加1
    #[serde(rename = "Depth")]
    pub depth: u32,
}

impl CrawlTask {
    /// 创建根任务
    pub fn root(url: impl Into<String>, crawl_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            crawl_id: crawl_id.into(),
            depth: ROOT_DEPTH,
        }
    }

    /// 派生子任务：同一个爬取ID，深度加1
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            crawl_id: self.crawl_id.clone(),
            depth: self.depth + 1,
        }
    }

    /// 从队列消息体解码任务
    ///
    /// 解码是宽松的：无法解析的消息体得到零值字段，
    /// 缺失的 `CrawlID` 会被分配新的随机ID，缺失或为0的 `Depth` 取1。
    pub fn decode(body: &str) -> Self {
        let message: CrawlTaskMessage = serde_json::from_str(body).unwrap_or_default();
        message.into()
    }
}

impl fmt::Display for CrawlTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} (crawl {})", self.url, self.depth, self.crawl_id)
    }
}

/// 队列中的原始任务消息
///
/// 每个字段都允许缺失，缺省值在转换为 [`CrawlTask`] 时补齐。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CrawlTaskMessage {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "CrawlID")]
    pub crawl_id: String,
    #[serde(rename = "Depth")]
    pub depth: i64,
}

impl From<CrawlTaskMessage> for CrawlTask {
    fn from(message: CrawlTaskMessage) -> Self {
        let crawl_id = if message.crawl_id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            message.crawl_id
        };

        let depth = if message.depth <= 0 {
            ROOT_DEPTH
        } else {
            u32::try_from(message.depth).unwrap_or(u32::MAX)
        };

        Self {
            url: message.url,
            crawl_id,
            depth,
        }
    }
}
