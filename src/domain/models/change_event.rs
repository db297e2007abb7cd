// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::link_relationship::LinkRelationship;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 链接关系变更事件
///
/// 爬取状态存储每写入一次链接关系就追加一条事件。
/// 事件按 `sequence` 递增顺序消费，因此同一个键上的变更保持顺序；
/// 不同键之间不保证任何顺序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkChangeEvent {
    /// 单调递增的序号
    pub sequence: i64,
    /// 变更类型
    pub kind: ChangeKind,
    /// 变更后的记录镜像，删除事件没有镜像
    pub new_image: Option<LinkRelationship>,
}

/// 变更类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// 新建记录
    Insert,
    /// 覆盖已有记录
    Modify,
    /// 删除记录
    Remove,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChangeKind::Insert => write!(f, "insert"),
            ChangeKind::Modify => write!(f, "modify"),
            ChangeKind::Remove => write!(f, "remove"),
        }
    }
}

impl FromStr for ChangeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(ChangeKind::Insert),
            "modify" => Ok(ChangeKind::Modify),
            "remove" => Ok(ChangeKind::Remove),
            _ => Err(()),
        }
    }
}
