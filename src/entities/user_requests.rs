use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use super::approval_requests::RequestStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub requested_by: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    /// Plaintext until the request is resolved, cleared afterwards.
    pub password: String,
    pub status: RequestStatus,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
