// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 爬取任务（crawl_task）：单个页面的抓取工作单元
/// - 链接关系（link_relationship）：一个页面的出站链接记录
/// - 订阅（subscription）：实时连接对爬取的订阅
/// - 变更事件（change_event）：链接关系写入后产生的变更通知
pub mod change_event;
pub mod crawl_task;
pub mod link_relationship;
pub mod subscription;
