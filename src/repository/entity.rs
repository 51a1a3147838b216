//! `sea-orm` entity for the single `games` table. Grounded on the teacher's SQL-backed
//! sibling examples in the pack (PocketRelay-Server's entity/migration split) rather
//! than the teacher itself, which never touches a relational schema.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub game_id: String,
    pub game_type: String,
    #[sea_orm(column_type = "Text")]
    pub game_state: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
