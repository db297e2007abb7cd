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

use crate::domain::models::change_event::ChangeKind;
use crate::domain::models::link_relationship::LinkRelationship;
use crate::domain::repositories::link_relationship_repository::{
    LinkRelationshipRepository, RepositoryError,
};
use crate::infrastructure::database::entities::{link_change_event, link_relationship};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::sync::Arc;

/// 链接关系仓库实现
///
/// 每次写入都在同一事务中向 `link_change_events` 追加一条事件。
#[derive(Clone)]
pub struct LinkRelationshipRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl LinkRelationshipRepoImpl {
    /// 创建新的链接关系仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn active_model(relationship: &LinkRelationship) -> link_relationship::ActiveModel {
        let now = Utc::now();
        link_relationship::ActiveModel {
            crawl_id: Set(relationship.crawl_id.clone()),
            parent_url: Set(relationship.parent_url.clone()),
            child_urls: Set(serde_json::json!(relationship.child_urls)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }

    async fn append_event<C: ConnectionTrait>(
        conn: &C,
        kind: ChangeKind,
        relationship: &LinkRelationship,
    ) -> Result<(), DbErr> {
        let image = serde_json::to_value(relationship).map_err(|e| DbErr::Json(e.to_string()))?;

        let event = link_change_event::ActiveModel {
            kind: Set(kind.into()),
            crawl_id: Set(relationship.crawl_id.clone()),
            parent_url: Set(relationship.parent_url.clone()),
            new_image: Set(Some(image)),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        link_change_event::Entity::insert(event)
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }
}

impl From<ChangeKind> for link_change_event::SeaChangeKind {
    fn from(kind: ChangeKind) -> Self {
        match kind {
            ChangeKind::Insert => link_change_event::SeaChangeKind::Insert,
            ChangeKind::Modify => link_change_event::SeaChangeKind::Modify,
            ChangeKind::Remove => link_change_event::SeaChangeKind::Remove,
        }
    }
}

impl TryFrom<link_relationship::Model> for LinkRelationship {
    type Error = DbErr;

    fn try_from(model: link_relationship::Model) -> Result<Self, Self::Error> {
        let child_urls: Vec<String> =
            serde_json::from_value(model.child_urls).map_err(|e| DbErr::Json(e.to_string()))?;
        Ok(Self {
            crawl_id: model.crawl_id,
            parent_url: model.parent_url,
            child_urls,
        })
    }
}

#[async_trait]
impl LinkRelationshipRepository for LinkRelationshipRepoImpl {
    async fn find(
        &self,
        crawl_id: &str,
        parent_url: &str,
    ) -> Result<Option<LinkRelationship>, RepositoryError> {
        let model = link_relationship::Entity::find_by_id((
            crawl_id.to_string(),
            parent_url.to_string(),
        ))
        .one(self.db.as_ref())
        .await?;

        Ok(model.map(LinkRelationship::try_from).transpose()?)
    }

    async fn save(&self, relationship: &LinkRelationship) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let existing = link_relationship::Entity::find_by_id((
            relationship.crawl_id.clone(),
            relationship.parent_url.clone(),
        ))
        .one(&txn)
        .await?;
        let kind = if existing.is_some() {
            ChangeKind::Modify
        } else {
            ChangeKind::Insert
        };

        link_relationship::Entity::insert(Self::active_model(relationship))
            .on_conflict(
                OnConflict::columns([
                    link_relationship::Column::CrawlId,
                    link_relationship::Column::ParentUrl,
                ])
                .update_columns([
                    link_relationship::Column::ChildUrls,
                    link_relationship::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        Self::append_event(&txn, kind, relationship).await?;
        txn.commit().await?;

        Ok(())
    }

    async fn insert_if_absent(
        &self,
        relationship: &LinkRelationship,
    ) -> Result<bool, RepositoryError> {
        let txn = self.db.begin().await?;

        let inserted = link_relationship::Entity::insert(Self::active_model(relationship))
            .on_conflict(
                OnConflict::columns([
                    link_relationship::Column::CrawlId,
                    link_relationship::Column::ParentUrl,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        if inserted == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        Self::append_event(&txn, ChangeKind::Insert, relationship).await?;
        txn.commit().await?;

        Ok(true)
    }
}
