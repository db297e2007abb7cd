// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use redis::{AsyncCommands, Direction};

/// Redis客户端
///
/// 提供对Redis列表的异步操作接口
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    ///
    /// # 返回值
    ///
    /// * `Ok(RedisClient)` - Redis客户端实例
    /// * `Err(anyhow::Error)` - 创建过程中出现的错误
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// 检查连接是否可用
    pub async fn ping(&self) -> Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<String>(&mut con).await?;
        Ok(())
    }

    /// 追加值到列表尾部
    ///
    /// # 参数
    ///
    /// * `key` - 列表键
    /// * `value` - 值
    ///
    /// # 返回值
    ///
    /// * `Ok(i64)` - 追加后的列表长度
    /// * `Err(anyhow::Error)` - 追加过程中出现的错误
    pub async fn rpush(&self, key: &str, value: &str) -> Result<i64> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let len: i64 = con.rpush(key, value).await?;
        Ok(len)
    }

    /// 将源列表头部的元素原子地移动到目标列表尾部
    ///
    /// # 参数
    ///
    /// * `source` - 源列表键
    /// * `destination` - 目标列表键
    ///
    /// # 返回值
    ///
    /// * `Ok(Option<String>)` - 被移动的元素，源列表为空时返回None
    /// * `Err(anyhow::Error)` - 移动过程中出现的错误
    pub async fn lmove(&self, source: &str, destination: &str) -> Result<Option<String>> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = con
            .lmove(source, destination, Direction::Left, Direction::Right)
            .await?;
        Ok(value)
    }

    /// 从列表中移除一个等于 `value` 的元素
    ///
    /// # 返回值
    ///
    /// * `Ok(i64)` - 被移除的元素数量
    /// * `Err(anyhow::Error)` - 移除过程中出现的错误
    pub async fn lrem(&self, key: &str, value: &str) -> Result<i64> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let removed: i64 = con.lrem(key, 1, value).await?;
        Ok(removed)
    }
}
