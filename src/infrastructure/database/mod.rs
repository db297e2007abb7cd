// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库模块
///
/// 连接池以及链接关系、订阅、变更事件三张表的实体定义
pub mod connection;
pub mod entities;
