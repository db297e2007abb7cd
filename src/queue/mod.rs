// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供爬取任务的分发与消费
/// 负责批量入队、投递确认和未确认消息的恢复
pub mod dispatch;
pub mod task_queue;
