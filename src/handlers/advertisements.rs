// src/handlers/advertisements.rs

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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{AdminRole, RequireRole},
    },
    models::{
        advertisement::{
            Advertisement, AdvertisementAnalytics, AdvertisementBulkPayload, AdvertisementFilter,
            CreateAdvertisementPayload, PublicAdvertisementFilter, UpdateAdvertisementPayload,
        },
        bulk::BulkResponse,
    },
};

// ---
// Rotas públicas
// ---

#[utoipa::path(
    get,
    path = "/api/advertisements/public",
    tag = "Advertisements",
    params(PublicAdvertisementFilter),
    responses((status = 200, description = "Anúncios ativos, na ordem de exibição", body = Vec<Advertisement>))
)]
pub async fn list_public(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<PublicAdvertisementFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let ads = app_state
        .advertisement_service
        .list_public(filter.position)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ads)))
}

#[utoipa::path(
    get,
    path = "/api/advertisements/featured",
    tag = "Advertisements",
    responses((status = 200, description = "Até 3 anúncios em destaque", body = Vec<Advertisement>))
)]
pub async fn list_featured(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let ads = app_state
        .advertisement_service
        .list_featured()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ads)))
}

#[utoipa::path(
    post,
    path = "/api/advertisements/{id}/click",
    tag = "Advertisements",
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 202, description = "Clique registrado"),
        (status = 404, description = "Anúncio não encontrado")
    )
)]
pub async fn record_click(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .advertisement_service
        .record_click(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(StatusCode::ACCEPTED)
}

// ---
// Administração
// ---

#[utoipa::path(
    get,
    path = "/api/advertisements",
    tag = "Advertisements",
    params(AdvertisementFilter),
    responses(
        (status = 200, description = "Todos os anúncios", body = Vec<Advertisement>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_advertisements(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Query(filter): Query<AdvertisementFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let ads = app_state
        .advertisement_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ads)))
}

#[utoipa::path(
    get,
    path = "/api/advertisements/{id}",
    tag = "Advertisements",
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 200, description = "Anúncio", body = Advertisement),
        (status = 404, description = "Anúncio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_advertisement(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ad = app_state
        .advertisement_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ad)))
}

#[utoipa::path(
    post,
    path = "/api/advertisements",
    tag = "Advertisements",
    request_body = CreateAdvertisementPayload,
    responses(
        (status = 201, description = "Anúncio criado", body = Advertisement),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_advertisement(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Json(payload): Json<CreateAdvertisementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let ad = app_state
        .advertisement_service
        .create(payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(ad)))
}

#[utoipa::path(
    put,
    path = "/api/advertisements/{id}",
    tag = "Advertisements",
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    request_body = UpdateAdvertisementPayload,
    responses(
        (status = 200, description = "Anúncio atualizado", body = Advertisement),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Anúncio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_advertisement(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAdvertisementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let ad = app_state
        .advertisement_service
        .update(id, payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ad)))
}

#[utoipa::path(
    delete,
    path = "/api/advertisements/{id}",
    tag = "Advertisements",
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 204, description = "Anúncio removido"),
        (status = 404, description = "Anúncio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_advertisement(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .advertisement_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/advertisements/bulk",
    tag = "Advertisements",
    request_body = AdvertisementBulkPayload,
    responses(
        (status = 200, description = "Resultado da operação em lote", body = BulkResponse),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_advertisements(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Json(payload): Json<AdvertisementBulkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let result = app_state
        .advertisement_service
        .bulk(payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/advertisements/analytics/summary",
    tag = "Advertisements",
    responses(
        (status = 200, description = "Indicadores de anúncios", body = AdvertisementAnalytics),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn advertisement_analytics(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .advertisement_service
        .analytics()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}
