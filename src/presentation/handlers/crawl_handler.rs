// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::{
    application::{dto::crawl_request::CrawlRequestDto, use_cases::crawl_use_case::CrawlUseCase},
    domain::models::crawl_task::CrawlTask,
    presentation::errors::AppError,
    queue::dispatch::DispatchQueue,
};

/// 启动一次爬取
///
/// 根页面以深度1进入分发队列，返回202和根任务
pub async fn create_crawl(
    Extension(queue): Extension<Arc<dyn DispatchQueue>>,
    Json(payload): Json<CrawlRequestDto>,
) -> Result<(StatusCode, Json<CrawlTask>), AppError> {
    let use_case = CrawlUseCase::new(queue);
    let task = use_case.start_crawl(payload).await?;
    Ok((StatusCode::ACCEPTED, Json(task)))
}
