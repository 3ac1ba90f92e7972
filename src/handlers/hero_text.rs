// src/handlers/hero_text.rs

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
        rbac::{AdminRole, RequireRole},
    },
    models::hero_text::{HeroTextSettings, UpdateHeroTextPayload},
};

// GET /api/hero-text-settings/public
#[utoipa::path(
    get,
    path = "/api/hero-text-settings/public",
    tag = "Hero Text",
    responses((status = 200, description = "Banner exibido na página inicial", body = HeroTextSettings))
)]
pub async fn get_public_hero_text(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .settings_service
        .get_public_hero_text()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(settings)))
}

// GET /api/hero-text-settings
#[utoipa::path(
    get,
    path = "/api/hero-text-settings",
    tag = "Hero Text",
    responses(
        (status = 200, description = "Configuração salva (ou padrão)", body = HeroTextSettings),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_hero_text(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .settings_service
        .get_hero_text()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/hero-text-settings
#[utoipa::path(
    put,
    path = "/api/hero-text-settings",
    tag = "Hero Text",
    request_body = UpdateHeroTextPayload,
    responses(
        (status = 200, description = "Banner atualizado", body = HeroTextSettings),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_hero_text(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Json(payload): Json<UpdateHeroTextPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let settings = app_state
        .settings_service
        .update_hero_text(payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(settings)))
}
