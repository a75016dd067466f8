use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "schedule_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub owner_id: i32,
    #[sea_orm(indexed)]
    pub due_at: DateTime,
    pub created_at: DateTime,
    pub title: String,
    pub content: String,
    pub priority_level: i32,
    pub category: String,
    #[sea_orm(default_value = false)]
    pub is_completed: bool,
}

impl ActiveModelBehavior for ActiveModel {}
