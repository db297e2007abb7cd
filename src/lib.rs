// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含爬取启动和订阅管理用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含爬取任务、链接关系、订阅等实体，爬取流水线与变更传播服务，以及仓库接口
pub mod domain;

/// 引擎模块
///
/// 页面抓取引擎
pub mod engines;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库、Redis、推送通道和指标
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 队列模块
///
/// 分发队列：批量提交与可靠消费
pub mod queue;

/// 工具模块
///
/// 提供遥测初始化和工作器错误类型
pub mod utils;

/// 工作器模块
///
/// 爬取工作器、变更事件流工作器和工作器管理
pub mod workers;
