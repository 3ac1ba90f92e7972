// src/handlers/marketplace.rs

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
        bulk::BulkResponse,
        marketplace::{
            CounterOfferPayload, CreateCategoryPayload, CreateItemPayload, CreateOfferPayload,
            ItemFilter, MarketplaceCategory, MarketplaceItem, MarketplaceOffer, OfferAnalytics,
            OfferBulkPayload, OfferFilter, RateOfferPayload, UpdateCategoryPayload,
            UpdateItemPayload,
        },
    },
};

// =============================================================================
//  CATEGORIAS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/marketplace/categories",
    tag = "Marketplace",
    responses((status = 200, description = "Categorias ativas", body = Vec<MarketplaceCategory>))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .marketplace_service
        .list_categories(true)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(categories)))
}

#[utoipa::path(
    get,
    path = "/api/marketplace/categories/all",
    tag = "Marketplace",
    responses(
        (status = 200, description = "Todas as categorias", body = Vec<MarketplaceCategory>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_all_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .marketplace_service
        .list_categories(false)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(categories)))
}

#[utoipa::path(
    post,
    path = "/api/marketplace/categories",
    tag = "Marketplace",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = MarketplaceCategory),
        (status = 409, description = "Nome já utilizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let category = app_state
        .marketplace_service
        .create_category(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/marketplace/categories/{id}",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    request_body = UpdateCategoryPayload,
    responses(
        (status = 200, description = "Categoria atualizada", body = MarketplaceCategory),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let category = app_state
        .marketplace_service
        .update_category(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(category)))
}

#[utoipa::path(
    delete,
    path = "/api/marketplace/categories/{id}",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria removida"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .marketplace_service
        .delete_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ITENS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/marketplace/items",
    tag = "Marketplace",
    params(ItemFilter),
    responses((status = 200, description = "Itens filtrados", body = Vec<MarketplaceItem>))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ItemFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .marketplace_service
        .list_items(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    get,
    path = "/api/marketplace/items/{id}",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item", body = MarketplaceItem),
        (status = 404, description = "Item não encontrado")
    )
)]
pub async fn get_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .marketplace_service
        .view_item(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(item)))
}

#[utoipa::path(
    get,
    path = "/api/marketplace/items/mine",
    tag = "Marketplace",
    responses((status = 200, description = "Itens anunciados pelo usuário", body = Vec<MarketplaceItem>)),
    security(("api_jwt" = []))
)]
pub async fn my_items(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .marketplace_service
        .my_items(&user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

#[utoipa::path(
    post,
    path = "/api/marketplace/items",
    tag = "Marketplace",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Item anunciado", body = MarketplaceItem),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Limite de anúncios atingido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let item = app_state
        .marketplace_service
        .create_item(payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/marketplace/items/{id}",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateItemPayload,
    responses(
        (status = 200, description = "Item atualizado", body = MarketplaceItem),
        (status = 403, description = "Nem vendedor nem administrador"),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Status só muda entre available e removed")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let item = app_state
        .marketplace_service
        .update_item(id, payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(item)))
}

#[utoipa::path(
    delete,
    path = "/api/marketplace/items/{id}",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 204, description = "Item removido"),
        (status = 403, description = "Nem vendedor nem administrador"),
        (status = 404, description = "Item não encontrado"),
        (status = 409, description = "Item reservado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .marketplace_service
        .delete_item(id, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  OFERTAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/marketplace/items/{id}/offers",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = CreateOfferPayload,
    responses(
        (status = 201, description = "Oferta enviada", body = MarketplaceOffer),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Item indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<CreateOfferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let offer = app_state
        .marketplace_service
        .create_offer(item_id, payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(offer)))
}

#[utoipa::path(
    get,
    path = "/api/marketplace/offers/sent",
    tag = "Marketplace",
    responses((status = 200, description = "Ofertas feitas pelo usuário", body = Vec<MarketplaceOffer>)),
    security(("api_jwt" = []))
)]
pub async fn sent_offers(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let offers = app_state
        .marketplace_service
        .sent_offers(&user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offers)))
}

#[utoipa::path(
    get,
    path = "/api/marketplace/offers/received",
    tag = "Marketplace",
    responses((status = 200, description = "Ofertas recebidas pelo vendedor", body = Vec<MarketplaceOffer>)),
    security(("api_jwt" = []))
)]
pub async fn received_offers(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let offers = app_state
        .marketplace_service
        .received_offers(&user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offers)))
}

#[utoipa::path(
    get,
    path = "/api/marketplace/offers/{id}",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID da oferta")),
    responses(
        (status = 200, description = "Oferta", body = MarketplaceOffer),
        (status = 403, description = "Nem comprador, vendedor ou administrador"),
        (status = 404, description = "Oferta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .marketplace_service
        .get_offer(id, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/marketplace/offers/{id}/accept",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID da oferta")),
    responses(
        (status = 200, description = "Oferta aceita; item reservado", body = MarketplaceOffer),
        (status = 409, description = "Transição inválida, oferta alterada ou item indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .marketplace_service
        .accept_offer(id, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/marketplace/offers/{id}/reject",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID da oferta")),
    responses(
        (status = 200, description = "Oferta recusada", body = MarketplaceOffer),
        (status = 409, description = "Transição inválida ou oferta alterada")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .marketplace_service
        .reject_offer(id, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/marketplace/offers/{id}/counter",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID da oferta")),
    request_body = CounterOfferPayload,
    responses(
        (status = 200, description = "Contraproposta registrada", body = MarketplaceOffer),
        (status = 409, description = "Transição inválida ou oferta alterada")
    ),
    security(("api_jwt" = []))
)]
pub async fn counter_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CounterOfferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let offer = app_state
        .marketplace_service
        .counter_offer(id, payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/marketplace/offers/{id}/accept-counter",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID da oferta")),
    responses(
        (status = 200, description = "Contraproposta aceita; item reservado", body = MarketplaceOffer),
        (status = 409, description = "Transição inválida, oferta alterada ou item indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_counter(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .marketplace_service
        .accept_counter(id, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/marketplace/offers/{id}/withdraw",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID da oferta")),
    responses(
        (status = 200, description = "Oferta retirada", body = MarketplaceOffer),
        (status = 409, description = "Transição inválida ou oferta alterada")
    ),
    security(("api_jwt" = []))
)]
pub async fn withdraw_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .marketplace_service
        .withdraw_offer(id, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/marketplace/offers/{id}/received",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID da oferta")),
    responses(
        (status = 200, description = "Recebimento confirmado; item vendido", body = MarketplaceOffer),
        (status = 409, description = "Transição inválida, oferta alterada ou item indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_received(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .marketplace_service
        .mark_received(id, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/marketplace/offers/{id}/rate",
    tag = "Marketplace",
    params(("id" = Uuid, Path, description = "ID da oferta")),
    request_body = RateOfferPayload,
    responses(
        (status = 200, description = "Avaliação registrada", body = MarketplaceOffer),
        (status = 409, description = "Já avaliada ou transação não concluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn rate_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateOfferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let offer = app_state
        .marketplace_service
        .rate_offer(id, payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

// --- Administração ---

#[utoipa::path(
    get,
    path = "/api/marketplace/offers",
    tag = "Marketplace",
    params(OfferFilter),
    responses(
        (status = 200, description = "Todas as ofertas filtradas", body = Vec<MarketplaceOffer>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_offers(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Query(filter): Query<OfferFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let offers = app_state
        .marketplace_service
        .list_offers(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offers)))
}

#[utoipa::path(
    post,
    path = "/api/marketplace/offers/bulk",
    tag = "Marketplace",
    request_body = OfferBulkPayload,
    responses(
        (status = 200, description = "Resultado da operação em lote", body = BulkResponse),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_offers(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Json(payload): Json<OfferBulkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let result = app_state
        .marketplace_service
        .bulk_offers(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/marketplace/offers/analytics/summary",
    tag = "Marketplace",
    responses(
        (status = 200, description = "Indicadores de ofertas", body = OfferAnalytics),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn offer_analytics(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .marketplace_service
        .offer_analytics()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}
