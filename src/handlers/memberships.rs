// src/handlers/memberships.rs

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
        membership::{
            ActivateMembershipPayload, CancelMembershipPayload, CreateMembershipPayload,
            CreateTierPayload, ExpiringQuery, Membership, MembershipAnalytics,
            MembershipBulkPayload, MembershipDetail, MembershipFilter, MembershipTier,
            RenewMembershipPayload, SuspendMembershipPayload, UpdateMembershipPayload,
            UpdateTierPayload,
        },
    },
};

// =============================================================================
//  PLANOS
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/membership-tiers/public",
    tag = "Membership Tiers",
    responses((status = 200, description = "Planos ativos, na ordem de exibição", body = Vec<MembershipTier>))
)]
pub async fn list_public_tiers(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let tiers = app_state
        .membership_service
        .list_tiers(true)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tiers)))
}

#[utoipa::path(
    get,
    path = "/api/membership-tiers",
    tag = "Membership Tiers",
    responses(
        (status = 200, description = "Todos os planos, inclusive inativos", body = Vec<MembershipTier>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tiers(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
) -> Result<impl IntoResponse, ApiError> {
    let tiers = app_state
        .membership_service
        .list_tiers(false)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tiers)))
}

#[utoipa::path(
    get,
    path = "/api/membership-tiers/{id}",
    tag = "Membership Tiers",
    params(("id" = Uuid, Path, description = "ID do plano")),
    responses(
        (status = 200, description = "Plano", body = MembershipTier),
        (status = 404, description = "Plano não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_tier(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tier = app_state
        .membership_service
        .get_tier(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tier)))
}

#[utoipa::path(
    post,
    path = "/api/membership-tiers",
    tag = "Membership Tiers",
    request_body = CreateTierPayload,
    responses(
        (status = 201, description = "Plano criado", body = MembershipTier),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Nome já utilizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tier(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Json(payload): Json<CreateTierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let tier = app_state
        .membership_service
        .create_tier(payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(tier)))
}

#[utoipa::path(
    put,
    path = "/api/membership-tiers/{id}",
    tag = "Membership Tiers",
    params(("id" = Uuid, Path, description = "ID do plano")),
    request_body = UpdateTierPayload,
    responses(
        (status = 200, description = "Plano atualizado", body = MembershipTier),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Plano não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_tier(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let tier = app_state
        .membership_service
        .update_tier(id, payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tier)))
}

#[utoipa::path(
    delete,
    path = "/api/membership-tiers/{id}",
    tag = "Membership Tiers",
    params(("id" = Uuid, Path, description = "ID do plano")),
    responses(
        (status = 204, description = "Plano removido"),
        (status = 404, description = "Plano não encontrado"),
        (status = 409, description = "Plano com associações vinculadas")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_tier(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .membership_service
        .delete_tier(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ASSOCIAÇÕES (sócio)
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/memberships",
    tag = "Memberships",
    request_body = CreateMembershipPayload,
    responses(
        (status = 201, description = "Associação criada com pagamento pendente", body = Membership),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Plano não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateMembershipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let membership = app_state
        .membership_service
        .create(payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(membership)))
}

#[utoipa::path(
    get,
    path = "/api/memberships/me",
    tag = "Memberships",
    responses(
        (status = 200, description = "Associação mais recente do usuário", body = MembershipDetail),
        (status = 404, description = "Usuário sem associação")
    ),
    security(("api_jwt" = []))
)]
pub async fn my_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .membership_service
        .my_membership(&user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/memberships/{id}",
    tag = "Memberships",
    params(("id" = Uuid, Path, description = "ID da associação")),
    responses(
        (status = 200, description = "Associação", body = Membership),
        (status = 403, description = "Nem dono nem administrador"),
        (status = 404, description = "Associação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .get(id, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(membership)))
}

#[utoipa::path(
    post,
    path = "/api/memberships/{id}/renew",
    tag = "Memberships",
    params(("id" = Uuid, Path, description = "ID da associação")),
    request_body = RenewMembershipPayload,
    responses(
        (status = 200, description = "Associação renovada", body = Membership),
        (status = 403, description = "Valor ou forma de pagamento informados por quem não é administrador"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn renew_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenewMembershipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let membership = app_state
        .membership_service
        .renew(id, payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(membership)))
}

#[utoipa::path(
    post,
    path = "/api/memberships/{id}/cancel",
    tag = "Memberships",
    params(("id" = Uuid, Path, description = "ID da associação")),
    request_body = CancelMembershipPayload,
    responses(
        (status = 200, description = "Associação cancelada", body = Membership),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelMembershipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let membership = app_state
        .membership_service
        .cancel(id, payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(membership)))
}

// =============================================================================
//  ASSOCIAÇÕES (administração)
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/memberships",
    tag = "Memberships",
    params(MembershipFilter),
    responses(
        (status = 200, description = "Associações filtradas", body = Vec<Membership>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_memberships(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Query(filter): Query<MembershipFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let memberships = app_state
        .membership_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(memberships)))
}

#[utoipa::path(
    put,
    path = "/api/memberships/{id}",
    tag = "Memberships",
    params(("id" = Uuid, Path, description = "ID da associação")),
    request_body = UpdateMembershipPayload,
    responses(
        (status = 200, description = "Associação atualizada", body = Membership),
        (status = 404, description = "Associação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMembershipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let membership = app_state
        .membership_service
        .update(id, payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(membership)))
}

#[utoipa::path(
    delete,
    path = "/api/memberships/{id}",
    tag = "Memberships",
    params(("id" = Uuid, Path, description = "ID da associação")),
    responses(
        (status = 204, description = "Associação removida"),
        (status = 404, description = "Associação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .membership_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/memberships/{id}/activate",
    tag = "Memberships",
    params(("id" = Uuid, Path, description = "ID da associação")),
    request_body = ActivateMembershipPayload,
    responses(
        (status = 200, description = "Associação ativada", body = Membership),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn activate_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActivateMembershipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let membership = app_state
        .membership_service
        .activate(id, payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(membership)))
}

#[utoipa::path(
    post,
    path = "/api/memberships/{id}/suspend",
    tag = "Memberships",
    params(("id" = Uuid, Path, description = "ID da associação")),
    request_body = SuspendMembershipPayload,
    responses(
        (status = 200, description = "Associação suspensa", body = Membership),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn suspend_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SuspendMembershipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let membership = app_state
        .membership_service
        .suspend(id, payload, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(membership)))
}

#[utoipa::path(
    post,
    path = "/api/memberships/{id}/reinstate",
    tag = "Memberships",
    params(("id" = Uuid, Path, description = "ID da associação")),
    responses(
        (status = 200, description = "Suspensão encerrada", body = Membership),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn reinstate_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .reinstate(id, &user.0)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(membership)))
}

#[utoipa::path(
    get,
    path = "/api/memberships/expiring",
    tag = "Memberships",
    params(ExpiringQuery),
    responses(
        (status = 200, description = "Ativas que vencem dentro da janela", body = Vec<Membership>),
        (status = 400, description = "Janela fora de 1..=3650 dias"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn expiring_memberships(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
    Query(query): Query<ExpiringQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let memberships = app_state
        .membership_service
        .expiring(query.days)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(memberships)))
}

#[utoipa::path(
    post,
    path = "/api/memberships/expire-overdue",
    tag = "Memberships",
    responses(
        (status = 200, description = "Ativas vencidas marcadas como expiradas", body = BulkResponse),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn expire_overdue(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .membership_service
        .expire_overdue()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    post,
    path = "/api/memberships/bulk",
    tag = "Memberships",
    request_body = MembershipBulkPayload,
    responses(
        (status = 200, description = "Resultado da operação em lote", body = BulkResponse),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_memberships(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AdminRole>,
    Json(payload): Json<MembershipBulkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, app_state.i18n_store))?;

    let result = app_state
        .membership_service
        .bulk(payload, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/memberships/analytics/summary",
    tag = "Memberships",
    responses(
        (status = 200, description = "Indicadores de associações", body = MembershipAnalytics),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn membership_analytics(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminRole>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .membership_service
        .analytics()
        .await
        .map_err(|e| e.to_api_error(&locale, app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}
