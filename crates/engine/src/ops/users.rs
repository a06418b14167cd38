//! User lifecycle: registration, profile, partial update, cascade delete.

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, Statement, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, NewUser, ResultEngine, User, UserPatch, reports, users};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    /// Registers a user. Email and username must both be free.
    pub async fn create_user(&self, new_user: NewUser) -> ResultEngine<User> {
        let email = normalize_required_text(&new_user.email, "email")?;
        let username = normalize_required_text(&new_user.username, "username")?;
        let fullname = normalize_required_text(&new_user.fullname, "fullname")?;

        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(
                    Condition::any()
                        .add(users::Column::Email.eq(email.clone()))
                        .add(users::Column::Username.eq(username.clone())),
                )
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(
                    "email or username".to_string(),
                ));
            }

            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                email,
                username,
                fullname,
                created_at: now,
                updated_at: now,
            };
            users::ActiveModel {
                id: ActiveValue::Set(user.id.to_string()),
                email: ActiveValue::Set(user.email.clone()),
                username: ActiveValue::Set(user.username.clone()),
                fullname: ActiveValue::Set(user.fullname.clone()),
                password: ActiveValue::Set(new_user.password_hash),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(user)
        })
    }

    /// Returns a user's profile. The password hash is not part of [`User`].
    pub async fn user_profile(&self, user_id: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            User::try_from(model)
        })
    }

    /// Resolves a username to its profile and stored password hash.
    ///
    /// For the authentication layer only; the hash never travels further
    /// than the verification step.
    pub async fn user_by_username(&self, username: &str) -> ResultEngine<(User, String)> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Username.eq(username))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            let password_hash = model.password.clone();
            Ok((User::try_from(model)?, password_hash))
        })
    }

    /// Applies a partial profile update.
    ///
    /// Absent fields stay untouched; present fields must be non-empty.
    /// Email and username stay unique across all other users.
    pub async fn update_user(&self, user_id: &str, patch: UserPatch) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let mut active = users::ActiveModel {
                id: ActiveValue::Set(user_id.to_string()),
                ..Default::default()
            };

            if let Some(email) = patch.email {
                let email = normalize_required_text(&email, "email")?;
                let taken = users::Entity::find()
                    .filter(users::Column::Email.eq(email.clone()))
                    .filter(users::Column::Id.ne(user_id))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::ExistingKey(email));
                }
                active.email = ActiveValue::Set(email);
            }

            if let Some(username) = patch.username {
                let username = normalize_required_text(&username, "username")?;
                let taken = users::Entity::find()
                    .filter(users::Column::Username.eq(username.clone()))
                    .filter(users::Column::Id.ne(user_id))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::ExistingKey(username));
                }
                active.username = ActiveValue::Set(username);
            }

            if let Some(fullname) = patch.fullname {
                active.fullname = ActiveValue::Set(normalize_required_text(&fullname, "fullname")?);
            }

            if let Some(password_hash) = patch.password_hash {
                active.password = ActiveValue::Set(password_hash);
            }

            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            User::try_from(model)
        })
    }

    /// Deletes a user together with every report they own, atomically.
    ///
    /// Children go first so foreign keys hold at every point inside the
    /// transaction; any failure rolls the whole unit back and both
    /// collections stay exactly as they were. A user with zero reports
    /// deletes cleanly — deleted counts are not validated.
    pub async fn delete_user_cascade(&self, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let backend = db_tx.get_database_backend();
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM line_items \
                     WHERE report_id IN (SELECT id FROM reports WHERE user_id = ?)",
                    vec![user_id.into()],
                ))
                .await?;
            reports::Entity::delete_many()
                .filter(reports::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
