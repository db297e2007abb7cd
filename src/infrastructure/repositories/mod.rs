// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的PostgreSQL实现
pub mod change_feed_repo_impl;
pub mod link_relationship_repo_impl;
pub mod subscription_repo_impl;
