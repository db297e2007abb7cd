// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 链接关系仓库（link_relationship_repository）：爬取状态存储
/// - 订阅仓库（subscription_repository）：订阅注册表
/// - 变更事件流仓库（change_feed_repository）：链接关系的变更通知
pub mod change_feed_repository;
pub mod link_relationship_repository;
pub mod subscription_repository;
