//! Users table and domain type.
//!
//! The domain [`User`] deliberately has no password field: the stored
//! hash can only be obtained through `Engine::user_by_username`, which
//! the auth layer uses for verification. Nothing built from a `User` can
//! leak it.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub fullname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registration. `password_hash` is already hashed by the
/// caller; the engine never sees a clear-text password.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub fullname: String,
    pub password_hash: String,
}

/// Partial profile update: each field is present-or-absent, so "leave it
/// unchanged" (absent) is never confused with "set it to empty" (present
/// and rejected as invalid).
#[derive(Clone, Debug, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub username: Option<String>,
    pub fullname: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub email: String,
    pub username: String,
    pub fullname: String,
    pub password: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid user id".to_string()))?,
            email: model.email,
            username: model.username,
            fullname: model.fullname,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
