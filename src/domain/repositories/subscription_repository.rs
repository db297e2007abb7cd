// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::link_relationship_repository::RepositoryError;
use crate::domain::models::subscription::Subscription;
use async_trait::async_trait;

/// 按爬取ID查询订阅时的默认分页大小
pub const DEFAULT_SUBSCRIBER_PAGE_SIZE: u64 = 100;

/// 订阅注册表特质
///
/// 订阅记录的唯一所有者。爬取流水线不使用该注册表，
/// 只有变更传播器和订阅/退订端点会访问它。
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// 写入订阅，同一连接ID的旧订阅被覆盖
    async fn put(&self, subscription: &Subscription) -> Result<(), RepositoryError>;

    /// 删除指定连接在指定爬取上的订阅（推送失败时的清理）
    async fn delete_by_connection_and_crawl(
        &self,
        connection_id: &str,
        crawl_id: &str,
    ) -> Result<(), RepositoryError>;

    /// 无条件删除指定连接的全部订阅（连接断开时使用）
    async fn delete_by_connection(&self, connection_id: &str) -> Result<(), RepositoryError>;

    /// 分页查询某次爬取的订阅
    ///
    /// 按 `connection_id` 升序返回，`after` 为上一页最后一个连接ID。
    async fn query_by_crawl_id_page(
        &self,
        crawl_id: &str,
        after: Option<String>,
        limit: u64,
    ) -> Result<Vec<Subscription>, RepositoryError>;

    /// 查询某次爬取的全部订阅
    ///
    /// 逐页读取直到最后一页，不会截断结果。
    async fn query_by_crawl_id(
        &self,
        crawl_id: &str,
        page_size: u64,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        let page_size = page_size.max(1);
        let mut all = Vec::new();
        let mut after = None;

        loop {
            let page = self
                .query_by_crawl_id_page(crawl_id, after.take(), page_size)
                .await?;
            let exhausted = (page.len() as u64) < page_size;
            after = page.last().map(|s| s.connection_id.clone());
            all.extend(page);

            if exhausted || after.is_none() {
                break;
            }
        }

        Ok(all)
    }
}
