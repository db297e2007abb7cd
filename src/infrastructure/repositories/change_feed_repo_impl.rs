// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::change_event::{ChangeKind, LinkChangeEvent};
use crate::domain::repositories::change_feed_repository::ChangeFeedRepository;
use crate::domain::repositories::link_relationship_repository::RepositoryError;
use crate::infrastructure::database::entities::link_change_event::{self, SeaChangeKind};
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use tracing::warn;

/// 变更事件流仓库实现
///
/// 按序读取 `link_change_events` 中的事件，确认即删除。
#[derive(Clone)]
pub struct ChangeFeedRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl ChangeFeedRepoImpl {
    /// 创建新的变更事件流仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<SeaChangeKind> for ChangeKind {
    fn from(kind: SeaChangeKind) -> Self {
        match kind {
            SeaChangeKind::Insert => ChangeKind::Insert,
            SeaChangeKind::Modify => ChangeKind::Modify,
            SeaChangeKind::Remove => ChangeKind::Remove,
        }
    }
}

impl From<link_change_event::Model> for LinkChangeEvent {
    fn from(model: link_change_event::Model) -> Self {
        let new_image = model.new_image.and_then(|image| {
            serde_json::from_value(image)
                .map_err(|e| {
                    warn!(sequence = model.sequence, "Unreadable change event image: {}", e);
                })
                .ok()
        });

        Self {
            sequence: model.sequence,
            kind: model.kind.into(),
            new_image,
        }
    }
}

#[async_trait]
impl ChangeFeedRepository for ChangeFeedRepoImpl {
    async fn fetch_pending(&self, limit: u64) -> Result<Vec<LinkChangeEvent>, RepositoryError> {
        let models = link_change_event::Entity::find()
            .order_by_asc(link_change_event::Column::Sequence)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn acknowledge(&self, sequence: i64) -> Result<(), RepositoryError> {
        link_change_event::Entity::delete_many()
            .filter(link_change_event::Column::Sequence.eq(sequence))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }
}
