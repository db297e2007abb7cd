// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Path, http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::{
    application::{
        dto::subscription_request::SubscriptionRequestDto,
        use_cases::subscription_use_case::SubscriptionUseCase,
    },
    domain::{
        models::subscription::Subscription,
        repositories::subscription_repository::SubscriptionRepository,
    },
    presentation::errors::AppError,
};

/// 订阅某次爬取的链接图变更
pub async fn subscribe(
    Extension(repo): Extension<Arc<dyn SubscriptionRepository>>,
    Json(payload): Json<SubscriptionRequestDto>,
) -> Result<(StatusCode, Json<Subscription>), AppError> {
    let use_case = SubscriptionUseCase::new(repo);
    let subscription = use_case.subscribe(payload).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

/// 连接断开，删除该连接的全部订阅
pub async fn disconnect(
    Extension(repo): Extension<Arc<dyn SubscriptionRepository>>,
    Path(connection_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let use_case = SubscriptionUseCase::new(repo);
    use_case.disconnect(&connection_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
