// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, ScrapeRequest, ScraperEngine};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("static selector is valid")
});

/// 链接提取器特质
///
/// 抓取页面并返回其中的原始链接目标，不做任何过滤。
#[async_trait]
pub trait LinkExtractor: Send + Sync {
    /// 抓取页面并提取链接
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<String>)` - 文档顺序的原始 href
    /// * `Err(EngineError)` - 页面不可达或返回非2xx状态
    async fn extract_links(&self, page_url: &Url) -> Result<Vec<String>, EngineError>;
}

/// 基于抓取引擎的HTML链接提取器
pub struct HtmlLinkExtractor {
    engine: Arc<dyn ScraperEngine>,
    timeout: Duration,
    user_agent: String,
}

impl HtmlLinkExtractor {
    pub fn new(engine: Arc<dyn ScraperEngine>, timeout: Duration, user_agent: String) -> Self {
        Self {
            engine,
            timeout,
            user_agent,
        }
    }

    /// 从HTML中按文档顺序收集 `<a href>` 的值
    pub fn collect_hrefs(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl LinkExtractor for HtmlLinkExtractor {
    async fn extract_links(&self, page_url: &Url) -> Result<Vec<String>, EngineError> {
        info!(url = %page_url, engine = self.engine.name(), "Requesting page");

        let request = ScrapeRequest {
            url: page_url.to_string(),
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
        };

        let response = self.engine.scrape(&request).await?;
        info!(
            url = %page_url,
            status = response.status_code,
            elapsed_ms = response.response_time_ms,
            "Got response"
        );

        if !response.is_success() {
            return Err(EngineError::HttpStatus(response.status_code));
        }

        let links = Self::collect_hrefs(&response.content);
        debug!(url = %page_url, count = links.len(), "Extracted links");
        Ok(links)
    }
}
