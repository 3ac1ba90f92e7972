// src/handlers/contact.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminRole, RequireRole},
    },
    models::contact::{ContactFilter, ContactMessage, CreateContactPayload, UpdateContactStatusPayload},
};

// POST /api/contact
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    request_body = CreateContactPayload,
    responses(
        (status = 201, description = "Mensagem recebida", body = ContactMessage),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_contact_message(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let message = app_state
        .contact_repo
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    tracing::info!("📨 Nova mensagem de contato: {}", message.id);
    Ok((StatusCode::CREATED, Json(message)))
}

// GET /api/contact
#[utoipa::path(
    get,
    path = "/api/contact",
    tag = "Contact",
    params(ContactFilter),
    responses(
        (status = 200, description = "Mensagens recebidas", body = Vec<ContactMessage>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contact_messages(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Query(filter): Query<ContactFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .contact_repo
        .list(filter.status)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(messages)))
}

// PUT /api/contact/{id}/status
#[utoipa::path(
    put,
    path = "/api/contact/{id}/status",
    tag = "Contact",
    params(("id" = Uuid, Path, description = "ID da mensagem")),
    request_body = UpdateContactStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = ContactMessage),
        (status = 404, description = "Mensagem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contact_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let message = app_state
        .contact_repo
        .update_status(id, payload.status)
        .await
        .and_then(|found| found.ok_or(AppError::NotFound("contact message")))
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(message)))
}

// DELETE /api/contact/{id}
#[utoipa::path(
    delete,
    path = "/api/contact/{id}",
    tag = "Contact",
    params(("id" = Uuid, Path, description = "ID da mensagem")),
    responses(
        (status = 204, description = "Mensagem removida"),
        (status = 404, description = "Mensagem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contact_message(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = app_state
        .contact_repo
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    if !deleted {
        return Err(AppError::NotFound("contact message").to_api_error(&locale, app_state.i18n_store));
    }

    Ok(StatusCode::NO_CONTENT)
}
