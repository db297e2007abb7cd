// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务。
///
/// 包含的服务：
/// - URL规范化（url_canonicalizer）：规范化、分类与过滤链接
/// - 链接提取（link_extractor）：抓取页面并取出原始链接
/// - 爬取流水线（crawl_pipeline）：处理单个爬取任务
/// - 变更传播（change_propagator）：把链接图的变更推送给订阅者
/// - 推送通道（push_channel）：订阅者投递的抽象
pub mod change_propagator;
pub mod crawl_pipeline;
pub mod link_extractor;
pub mod push_channel;
pub mod url_canonicalizer;
