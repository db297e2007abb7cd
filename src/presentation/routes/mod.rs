// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::subscription_repository::SubscriptionRepository;
use crate::presentation::handlers::{crawl_handler, subscription_handler};
use crate::queue::dispatch::DispatchQueue;
use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由，处理器依赖通过 `Extension` 注入
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/v1/crawl", post(crawl_handler::create_crawl))
        .route("/v1/subscriptions", post(subscription_handler::subscribe))
        .route(
            "/v1/subscriptions/{connection_id}",
            delete(subscription_handler::disconnect),
        )
}

/// 创建注入了依赖的完整应用
///
/// # 参数
///
/// * `queue` - 分发队列
/// * `subscriptions` - 订阅注册表
pub fn app(
    queue: Arc<dyn DispatchQueue>,
    subscriptions: Arc<dyn SubscriptionRepository>,
) -> Router {
    routes()
        .layer(Extension(queue))
        .layer(Extension(subscriptions))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
