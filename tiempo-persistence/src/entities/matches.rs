use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub phase: String,
    pub theme_index: i32,
    /// JSON-encoded ordered theme list.
    pub themes: String,
    pub words_per_player: i32,
    pub turn_seconds: i32,
    pub skip_reset: String,
    pub time_remaining: i32,
    pub rounds_played: i32,
    pub current_player: Option<Uuid>,
    pub version: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
