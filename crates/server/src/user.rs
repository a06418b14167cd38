//! User API endpoints: registration, profile, cascade deletion.

use api_types::user::{ProfileUpdate, Register, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, auth, server::ServerState};

fn map_user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
        username: user.username,
        fullname: user.fullname,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

/// Registers a new account. This is the only route outside the auth
/// layer.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<Register>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    if payload.password.is_empty() {
        return Err(ServerError::Generic("password is required".to_string()));
    }
    if payload.password != payload.confirm_password {
        return Err(ServerError::Generic("passwords do not match".to_string()));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let user = state
        .engine
        .create_user(engine::NewUser {
            email: payload.email,
            username: payload.username,
            fullname: payload.fullname,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(map_user(user))))
}

/// Returns the caller's profile.
pub async fn profile(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user_profile(&user.id.to_string()).await?;
    Ok(Json(map_user(user)))
}

/// Applies a partial profile update. Only supplied fields change; a
/// password change must carry a matching confirmation.
pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let password_hash = match payload.password {
        Some(password) => {
            if password.is_empty() {
                return Err(ServerError::Generic("password is required".to_string()));
            }
            if payload.confirm_password.as_deref() != Some(password.as_str()) {
                return Err(ServerError::Generic("passwords do not match".to_string()));
            }
            Some(auth::hash_password(&password)?)
        }
        None => None,
    };

    let user = state
        .engine
        .update_user(
            &user.id.to_string(),
            engine::UserPatch {
                email: payload.email,
                username: payload.username,
                fullname: payload.fullname,
                password_hash,
            },
        )
        .await?;

    Ok(Json(map_user(user)))
}

/// Deletes the caller together with every report they own, atomically.
/// No request-supplied target: a user may delete only themselves.
pub async fn remove(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_user_cascade(&user.id.to_string())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
