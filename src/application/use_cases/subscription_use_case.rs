// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::{
    application::dto::subscription_request::SubscriptionRequestDto,
    domain::{
        models::subscription::Subscription,
        repositories::{
            link_relationship_repository::RepositoryError,
            subscription_repository::SubscriptionRepository,
        },
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use validator::Validate;

#[derive(Error, Debug)]
pub enum SubscriptionUseCaseError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 订阅用例
///
/// 注册订阅以及连接断开时的清理
pub struct SubscriptionUseCase {
    repo: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionUseCase {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repo }
    }

    pub async fn subscribe(
        &self,
        dto: SubscriptionRequestDto,
    ) -> Result<Subscription, SubscriptionUseCaseError> {
        dto.validate()
            .map_err(|e| SubscriptionUseCaseError::ValidationError(e.to_string()))?;

        let subscription = Subscription::new(dto.crawl_id, dto.connection_id, dto.delivery_endpoint);
        self.repo.put(&subscription).await?;

        info!(
            crawl_id = %subscription.crawl_id,
            connection_id = %subscription.connection_id,
            "Registered subscription"
        );
        Ok(subscription)
    }

    pub async fn disconnect(&self, connection_id: &str) -> Result<(), SubscriptionUseCaseError> {
        if connection_id.trim().is_empty() {
            return Err(SubscriptionUseCaseError::ValidationError(
                "ConnectionID is required".to_string(),
            ));
        }

        self.repo.delete_by_connection(connection_id).await?;
        info!(connection_id = %connection_id, "Removed subscriptions for connection");
        Ok(())
    }
}
