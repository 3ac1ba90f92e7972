// src/handlers/settings.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{RequireRole, SuperAdminRole},
    },
    models::settings::{FeeConfig, UpdateFeeConfigPayload},
};

// GET /api/settings/fees
#[utoipa::path(
    get,
    path = "/api/settings/fees",
    tag = "Settings",
    responses((status = 200, description = "Taxas vigentes", body = FeeConfig))
)]
pub async fn get_fee_config(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let config = app_state
        .settings_service
        .get_fee_config()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(config)))
}

// PUT /api/settings/fees
#[utoipa::path(
    put,
    path = "/api/settings/fees",
    tag = "Settings",
    request_body = UpdateFeeConfigPayload,
    responses(
        (status = 200, description = "Taxas atualizadas", body = FeeConfig),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas super administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_fee_config(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<SuperAdminRole>,
    Json(payload): Json<UpdateFeeConfigPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let updated = app_state
        .settings_service
        .update_fee_config(payload, user.0.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}
