// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::link_relationship::LinkRelationship;
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 链接关系仓库特质
///
/// 爬取状态存储的读写契约：按复合键 `(crawl_id, parent_url)` 点查与点写。
/// 实现必须在每次写入时追加一条变更事件，变更传播器依赖这一点。
#[async_trait]
pub trait LinkRelationshipRepository: Send + Sync {
    /// 按键查找链接关系
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(LinkRelationship))` - 页面在本次爬取中已处理
    /// * `Ok(None)` - 尚未访问，键不存在不是错误
    /// * `Err(RepositoryError)` - 存储不可用
    async fn find(
        &self,
        crawl_id: &str,
        parent_url: &str,
    ) -> Result<Option<LinkRelationship>, RepositoryError>;

    /// 写入链接关系，已存在时覆盖
    async fn save(&self, relationship: &LinkRelationship) -> Result<(), RepositoryError>;

    /// 仅当键不存在时写入
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 本次写入取得了该键
    /// * `Ok(false)` - 键已被其他写入者占用，未做任何修改
    /// * `Err(RepositoryError)` - 存储不可用
    async fn insert_if_absent(
        &self,
        relationship: &LinkRelationship,
    ) -> Result<bool, RepositoryError>;
}
