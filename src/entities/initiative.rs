use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::InitiativeStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "initiatives")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    /// Percent complete, 0..=100
    pub progress: i32,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub owner_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Model {
    pub fn status(&self) -> InitiativeStatus {
        self.status.parse().unwrap_or(InitiativeStatus::Planned)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

tenant_scoped!("Initiative");
