//! User HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use super::model::{UpdatedUser, User};
use crate::app::AppState;
use crate::core::error::AppError;
use crate::core::response::{MessageResponse, USER_DELETED_MESSAGE};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = state.user_service.get_user(&uuid).await?;
    Ok(Json(user))
}

/// A missing or malformed JSON body reaches the service as `None` and is
/// rejected by validation like any other bad input.
pub async fn create_user(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let input = payload.map(|Json(value)| value);
    let user = state.user_service.create_user(input.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    payload: Option<Json<Value>>,
) -> Result<Json<UpdatedUser>, AppError> {
    let input = payload.map(|Json(value)| value);
    let user = state
        .user_service
        .update_user(&uuid, input.as_ref())
        .await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.user_service.delete_user(&uuid).await?;
    Ok(Json(MessageResponse::new(USER_DELETED_MESSAGE)))
}
