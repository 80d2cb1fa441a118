//! 原始路径计数实体
//!
//! 每个路径一行，主键为规范化路径的哈希值。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "gac_path_counter")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pagepath_hash: String,
    #[sea_orm(column_type = "String(StringLen::N(2048))")]
    pub pagepath: String,
    pub pageviews: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
