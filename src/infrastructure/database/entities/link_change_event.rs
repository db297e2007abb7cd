// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum SeaChangeKind {
    #[sea_orm(string_value = "insert")]
    Insert,
    #[sea_orm(string_value = "modify")]
    Modify,
    #[sea_orm(string_value = "remove")]
    Remove,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "link_change_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub sequence: i64,
    pub kind: SeaChangeKind,
    pub crawl_id: String,
    pub parent_url: String,
    pub new_image: Option<JsonValue>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
