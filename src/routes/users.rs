use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::dto::user_dto::{
    LoginPayload, LoginUser, MessageResponse, RegisterUserPayload, UserEditSet, UserEnvelope,
    UserListResponse, UserResponse,
};
use crate::error::{Error, Result};
use crate::routes::{fields::RequestFields, parse_record_id};
use crate::services::registration::prepare_user;
use crate::services::update_builder::{build_user_update, has_edits, UpdatePlan};
use crate::AppState;

#[axum::debug_handler]
pub async fn register_user(
    State(state): State<AppState>,
    mut fields: RequestFields,
) -> Result<impl IntoResponse> {
    let upload = fields.take_file();
    let payload = RegisterUserPayload::from_fields(&fields)?;
    let mut prepared = prepare_user(&state.user_service, payload).await?;

    if let Some(file) = upload {
        prepared.profile_pic_url = Some(state.uploads.save(&file).await?);
    }

    let stored_upload = prepared.profile_pic_url.clone();
    let user = match state.user_service.create(prepared).await {
        Ok(user) => user,
        Err(e) => {
            if let Some(reference) = stored_upload {
                state.uploads.discard(&reference).await;
            }
            return Err(e);
        }
    };
    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            success: true,
            message: Some("User created successfully.".into()),
            user: UserResponse::from(user),
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    fields: RequestFields,
) -> Result<impl IntoResponse> {
    let payload = LoginPayload::from_fields(&fields);
    if payload.validate().is_err() {
        return Err(Error::BadRequest("Email and password required.".into()));
    }
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(Error::BadRequest("Email and password required.".into()));
    };

    let user = state.user_service.authenticate(&email, &password).await?;
    Ok(Json(UserEnvelope {
        success: true,
        message: Some("Login successful.".into()),
        user: LoginUser::from(user),
    }))
}

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users: Vec<UserResponse> = state
        .user_service
        .list()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(UserListResponse {
        success: true,
        count: users.len(),
        users,
    }))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_record_id(&id, "User")?;
    let user = state
        .user_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;

    Ok(Json(UserEnvelope {
        success: true,
        message: None,
        user: UserResponse::from(user),
    }))
}

/// Edits come from the body and the query string; the body wins on clashes.
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    fields: RequestFields,
) -> Result<impl IntoResponse> {
    let id = parse_record_id(&id, "User")?;
    let mut fields = fields.merge_query(query);

    let edits = UserEditSet::from_fields(&fields)?;
    if !has_edits(&edits) && !fields.has_file() {
        return Err(Error::BadRequest("No fields to update".into()));
    }

    let existing = state
        .user_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;

    let new_upload = match fields.take_file() {
        Some(file) => Some(state.uploads.save(&file).await?),
        None => None,
    };

    let update = match build_user_update(&existing, &edits, new_upload.as_deref()) {
        UpdatePlan::Apply(update) => update,
        UpdatePlan::NoOp => return Err(Error::BadRequest("No fields to update".into())),
    };

    let user = match state.user_service.apply_update(id, &update).await {
        Ok(user) => user,
        Err(e) => {
            if let Some(reference) = &new_upload {
                state.uploads.discard(reference).await;
            }
            return Err(e);
        }
    };
    if let Some(old) = &update.superseded_upload {
        state.uploads.discard(old).await;
    }

    Ok(Json(UserEnvelope {
        success: true,
        message: Some("User updated successfully".into()),
        user: UserResponse::from(user),
    }))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_record_id(&id, "User")?;
    state.user_service.delete(id).await?;
    Ok(Json(MessageResponse::ok("User deleted successfully")))
}
