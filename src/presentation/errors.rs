// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::application::use_cases::{
    crawl_use_case::CrawlUseCaseError, subscription_use_case::SubscriptionUseCaseError,
};

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<CrawlUseCaseError>() {
            return match err {
                CrawlUseCaseError::ValidationError(_) => StatusCode::BAD_REQUEST,
                CrawlUseCaseError::Queue(_) | CrawlUseCaseError::Rejected(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                CrawlUseCaseError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }

        if let Some(err) = self.0.downcast_ref::<SubscriptionUseCaseError>() {
            return match err {
                SubscriptionUseCaseError::ValidationError(_) => StatusCode::BAD_REQUEST,
                SubscriptionUseCaseError::Repository(_) => StatusCode::SERVICE_UNAVAILABLE,
            };
        }

        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
