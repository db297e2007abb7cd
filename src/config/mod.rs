// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 分层加载配置：内置默认值、`config/default.toml`、环境配置文件，最后是 `CRAWLGRAPH__` 前缀的环境变量
pub mod settings;
