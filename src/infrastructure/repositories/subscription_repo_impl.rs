// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::subscription::Subscription;
use crate::domain::repositories::link_relationship_repository::RepositoryError;
use crate::domain::repositories::subscription_repository::SubscriptionRepository;
use crate::infrastructure::database::entities::subscription;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::sync::Arc;

/// 订阅仓库实现
#[derive(Clone)]
pub struct SubscriptionRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl SubscriptionRepoImpl {
    /// 创建新的订阅仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<subscription::Model> for Subscription {
    fn from(model: subscription::Model) -> Self {
        Self {
            crawl_id: model.crawl_id,
            connection_id: model.connection_id,
            delivery_endpoint: model.delivery_endpoint,
        }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionRepoImpl {
    async fn put(&self, sub: &Subscription) -> Result<(), RepositoryError> {
        let active_model = subscription::ActiveModel {
            connection_id: Set(sub.connection_id.clone()),
            crawl_id: Set(sub.crawl_id.clone()),
            delivery_endpoint: Set(sub.delivery_endpoint.clone()),
            created_at: Set(Utc::now().into()),
        };

        subscription::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(subscription::Column::ConnectionId)
                    .update_columns([
                        subscription::Column::CrawlId,
                        subscription::Column::DeliveryEndpoint,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn delete_by_connection_and_crawl(
        &self,
        connection_id: &str,
        crawl_id: &str,
    ) -> Result<(), RepositoryError> {
        subscription::Entity::delete_many()
            .filter(subscription::Column::ConnectionId.eq(connection_id))
            .filter(subscription::Column::CrawlId.eq(crawl_id))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn delete_by_connection(&self, connection_id: &str) -> Result<(), RepositoryError> {
        subscription::Entity::delete_many()
            .filter(subscription::Column::ConnectionId.eq(connection_id))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn query_by_crawl_id_page(
        &self,
        crawl_id: &str,
        after: Option<String>,
        limit: u64,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        let mut query = subscription::Entity::find()
            .filter(subscription::Column::CrawlId.eq(crawl_id));

        if let Some(after) = after {
            query = query.filter(subscription::Column::ConnectionId.gt(after));
        }

        let models = query
            .order_by_asc(subscription::Column::ConnectionId)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
