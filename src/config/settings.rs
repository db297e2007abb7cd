// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::services::crawl_pipeline::ClaimMode;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、Redis、服务器、爬取、变更传播和指标等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// Redis配置
    pub redis: RedisSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// 爬取配置
    pub crawl: CrawlSettings,
    /// 变更传播配置
    pub propagation: PropagationSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// Redis配置设置
#[derive(Debug, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL
    pub url: String,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 爬取配置设置
#[derive(Debug, Deserialize)]
pub struct CrawlSettings {
    /// 最大深度，0表示根页面也不扩展
    pub max_depth: u32,
    /// 认领模式（look_then_write 或 conditional）
    pub claim_mode: ClaimMode,
    /// 爬取工作器数量
    pub worker_count: usize,
    /// 分发队列名称
    pub queue_name: String,
    /// 页面抓取超时时间（秒）
    pub fetch_timeout_secs: u64,
    /// 抓取时使用的User-Agent
    pub user_agent: String,
    /// 队列为空时的等待时间（毫秒）
    pub idle_backoff_ms: u64,
}

/// 变更传播配置设置
#[derive(Debug, Deserialize)]
pub struct PropagationSettings {
    /// 变更事件轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 每次轮询读取的事件数量
    pub batch_size: u64,
    /// 查询订阅时的分页大小
    pub subscriber_page_size: u64,
    /// 同时进行的推送数量上限
    pub max_concurrent_pushes: usize,
    /// 单次推送超时时间（秒）
    pub push_timeout_secs: u64,
    /// 推送签名密钥，为空时不签名
    pub signing_secret: Option<String>,
}

/// 指标配置设置
#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus导出
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和 `CRAWLGRAPH__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CRAWLGRAPH").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB pool settings
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default crawl settings
            .set_default("crawl.max_depth", 3)?
            .set_default("crawl.claim_mode", "look_then_write")?
            .set_default("crawl.worker_count", 4)?
            .set_default("crawl.queue_name", "crawlgraph:tasks")?
            .set_default("crawl.fetch_timeout_secs", 30)?
            .set_default("crawl.user_agent", "crawlgraph/0.1")?
            .set_default("crawl.idle_backoff_ms", 1000)?
            // Default propagation settings
            .set_default("propagation.poll_interval_ms", 500)?
            .set_default("propagation.batch_size", 50)?
            .set_default("propagation.subscriber_page_size", 100)?
            .set_default("propagation.max_concurrent_pushes", 10)?
            .set_default("propagation.push_timeout_secs", 10)?
            // Default metrics settings
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}
