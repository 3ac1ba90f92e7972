// src/routes.rs

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::{AppConfig, AppState},
    docs::ApiDoc,
    handlers,
    middleware::auth::auth_guard,
};

/// Monta o roteador completo, com as camadas HTTP.
pub fn build_router(app_state: AppState, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .merge(public_routes())
        .merge(protected_routes(app_state.clone()))
        .with_state(app_state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.server_timeout_secs)))
        .layer(RequestBodyLimitLayer::new(config.server_body_limit_mb * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// Sem token
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        // Site
        .route("/api/hero-text-settings/public", get(handlers::hero_text::get_public_hero_text))
        .route("/api/advertisements/public", get(handlers::advertisements::list_public))
        .route("/api/advertisements/featured", get(handlers::advertisements::list_featured))
        .route("/api/advertisements/{id}/click", post(handlers::advertisements::record_click))
        .route("/api/membership-tiers/public", get(handlers::memberships::list_public_tiers))
        .route("/api/settings/fees", get(handlers::settings::get_fee_config))
        .route("/api/contact", post(handlers::contact::create_contact_message))
        // Vitrine do marketplace
        .route("/api/marketplace/categories", get(handlers::marketplace::list_categories))
        .route("/api/marketplace/items", get(handlers::marketplace::list_items))
        .route("/api/marketplace/items/{id}", get(handlers::marketplace::get_item))
}

// Exigem `Authorization: Bearer`; o papel é checado em cada handler
fn protected_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users", get(handlers::auth::list_users))
        .route("/api/users/me", get(handlers::auth::get_me))
        .route("/api/users/{id}/role", put(handlers::auth::update_user_role))
        .merge(advertisement_routes())
        .merge(hero_text_routes())
        .merge(membership_routes())
        .merge(marketplace_routes())
        .merge(notification_routes())
        .route("/api/settings/fees", put(handlers::settings::update_fee_config))
        .route("/api/contact", get(handlers::contact::list_contact_messages))
        .route("/api/contact/{id}", delete(handlers::contact::delete_contact_message))
        .route("/api/contact/{id}/status", put(handlers::contact::update_contact_status))
        .route_layer(axum_middleware::from_fn_with_state(app_state, auth_guard))
}

fn advertisement_routes() -> Router<AppState> {
    use handlers::advertisements as ads;

    Router::new()
        .route(
            "/api/advertisements",
            get(ads::list_advertisements).post(ads::create_advertisement),
        )
        .route("/api/advertisements/bulk", post(ads::bulk_advertisements))
        .route("/api/advertisements/analytics/summary", get(ads::advertisement_analytics))
        .route(
            "/api/advertisements/{id}",
            get(ads::get_advertisement)
                .put(ads::update_advertisement)
                .delete(ads::delete_advertisement),
        )
}

fn hero_text_routes() -> Router<AppState> {
    Router::new().route(
        "/api/hero-text-settings",
        get(handlers::hero_text::get_hero_text).put(handlers::hero_text::update_hero_text),
    )
}

fn membership_routes() -> Router<AppState> {
    use handlers::memberships as m;

    Router::new()
        // Planos
        .route("/api/membership-tiers", get(m::list_tiers).post(m::create_tier))
        .route(
            "/api/membership-tiers/{id}",
            get(m::get_tier).put(m::update_tier).delete(m::delete_tier),
        )
        // Associações
        .route("/api/memberships", get(m::list_memberships).post(m::create_membership))
        .route("/api/memberships/me", get(m::my_membership))
        .route("/api/memberships/expiring", get(m::expiring_memberships))
        .route("/api/memberships/expire-overdue", post(m::expire_overdue))
        .route("/api/memberships/bulk", post(m::bulk_memberships))
        .route("/api/memberships/analytics/summary", get(m::membership_analytics))
        .route(
            "/api/memberships/{id}",
            get(m::get_membership).put(m::update_membership).delete(m::delete_membership),
        )
        .route("/api/memberships/{id}/activate", post(m::activate_membership))
        .route("/api/memberships/{id}/renew", post(m::renew_membership))
        .route("/api/memberships/{id}/suspend", post(m::suspend_membership))
        .route("/api/memberships/{id}/reinstate", post(m::reinstate_membership))
        .route("/api/memberships/{id}/cancel", post(m::cancel_membership))
}

fn marketplace_routes() -> Router<AppState> {
    use handlers::marketplace as mk;

    Router::new()
        // Categorias
        .route("/api/marketplace/categories", post(mk::create_category))
        .route("/api/marketplace/categories/all", get(mk::list_all_categories))
        .route(
            "/api/marketplace/categories/{id}",
            put(mk::update_category).delete(mk::delete_category),
        )
        // Itens
        .route("/api/marketplace/items", post(mk::create_item))
        .route("/api/marketplace/items/mine", get(mk::my_items))
        .route(
            "/api/marketplace/items/{id}",
            put(mk::update_item).delete(mk::delete_item),
        )
        .route("/api/marketplace/items/{id}/offers", post(mk::create_offer))
        // Ofertas
        .route("/api/marketplace/offers", get(mk::list_offers))
        .route("/api/marketplace/offers/sent", get(mk::sent_offers))
        .route("/api/marketplace/offers/received", get(mk::received_offers))
        .route("/api/marketplace/offers/bulk", post(mk::bulk_offers))
        .route("/api/marketplace/offers/analytics/summary", get(mk::offer_analytics))
        .route("/api/marketplace/offers/{id}", get(mk::get_offer))
        .route("/api/marketplace/offers/{id}/accept", post(mk::accept_offer))
        .route("/api/marketplace/offers/{id}/reject", post(mk::reject_offer))
        .route("/api/marketplace/offers/{id}/counter", post(mk::counter_offer))
        .route("/api/marketplace/offers/{id}/accept-counter", post(mk::accept_counter))
        .route("/api/marketplace/offers/{id}/withdraw", post(mk::withdraw_offer))
        .route("/api/marketplace/offers/{id}/received", post(mk::mark_received))
        .route("/api/marketplace/offers/{id}/rate", post(mk::rate_offer))
}

fn notification_routes() -> Router<AppState> {
    use handlers::notifications as n;

    Router::new()
        .route("/api/notifications", get(n::list_notifications))
        .route("/api/notifications/unread-count", get(n::unread_count))
        .route("/api/notifications/read-all", post(n::mark_all_read))
        .route("/api/notifications/broadcast", post(n::broadcast))
        .route("/api/notifications/{id}", delete(n::delete_notification))
        .route("/api/notifications/{id}/read", post(n::mark_read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use crate::{
        models::auth::UserRole,
        test_support::{self, TestDb},
    };

    async fn serve(state: AppState, config: &AppConfig) -> SocketAddr {
        let app = build_router(state, config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
        addr
    }

    // Pool preguiçoso: nenhuma destas requisições chega ao banco
    async fn spawn_app() -> SocketAddr {
        let config = test_support::test_config("postgres://localhost/club_portal_test");
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        serve(AppState::build(&config, pool), &config).await
    }

    // Com token: o guard relê o usuário no banco
    async fn spawn_db_app(db: &TestDb) -> (SocketAddr, AppState) {
        let state = db.state();
        (serve(state.clone(), &db.config).await, state)
    }

    async fn token_for(db: &TestDb, state: &AppState, role: UserRole) -> String {
        let user = db.user(role).await;
        state.auth_service.create_token(&user).expect("token")
    }

    async fn send_raw(
        addr: SocketAddr,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> (u16, String) {
        let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
        for (name, value) in headers {
            req.push_str(&format!("{name}: {value}\r\n"));
        }
        let body = body.unwrap_or_default();
        if !body.is_empty() {
            req.push_str("Content-Type: application/json\r\n");
        }
        req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));

        let mut stream = tokio::net::TcpStream::connect(addr)
            .await
            .expect("connect server");
        stream.write_all(req.as_bytes()).await.expect("write request");
        let mut response = String::new();
        stream
            .read_to_string(&mut response)
            .await
            .expect("read response");

        let (head, body) = response
            .split_once("\r\n\r\n")
            .expect("http response separator");
        let status = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|s| s.parse::<u16>().ok())
            .expect("status");
        (status, body.to_string())
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn health_is_public() {
        let addr = spawn_app().await;
        let (status, body) = send_raw(addr, "GET", "/api/health", &[], None).await;
        assert_eq!(status, 200);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn protected_route_without_token_is_unauthorized() {
        let addr = spawn_app().await;
        let (status, body) = send_raw(
            addr,
            "GET",
            "/api/notifications",
            &[("Accept-Language", "pt-BR")],
            None,
        )
        .await;
        assert_eq!(status, 401);
        let json: Value = serde_json::from_str(&body).expect("error json");
        assert_eq!(json["message"], "Token de autenticação inválido ou ausente.");
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let addr = spawn_app().await;
        let (status, _) = send_raw(
            addr,
            "GET",
            "/api/users/me",
            &[("Authorization", "Bearer not-a-jwt")],
            None,
        )
        .await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn member_cannot_reach_admin_route() {
        let Some(db) = test_support::init_test_db().await else { return };
        let (addr, state) = spawn_db_app(&db).await;
        let auth = bearer(&token_for(&db, &state, UserRole::Member).await);
        let (status, _) = send_raw(
            addr,
            "GET",
            "/api/advertisements/analytics/summary",
            &[("Authorization", auth.as_str())],
            None,
        )
        .await;
        assert_eq!(status, 403);
    }

    #[tokio::test]
    async fn member_cannot_broadcast() {
        let Some(db) = test_support::init_test_db().await else { return };
        let (addr, state) = spawn_db_app(&db).await;
        let auth = bearer(&token_for(&db, &state, UserRole::Member).await);
        let (status, _) = send_raw(
            addr,
            "POST",
            "/api/notifications/broadcast",
            &[("Authorization", auth.as_str())],
            Some(r#"{"title": "Match day", "body": "Kick-off at 10am"}"#),
        )
        .await;
        assert_eq!(status, 403);
    }

    #[tokio::test]
    async fn admin_cannot_change_fees() {
        let Some(db) = test_support::init_test_db().await else { return };
        let (addr, state) = spawn_db_app(&db).await;
        let auth = bearer(&token_for(&db, &state, UserRole::Admin).await);
        let (status, _) = send_raw(
            addr,
            "PUT",
            "/api/settings/fees",
            &[("Authorization", auth.as_str())],
            Some(r#"{"freeListingLimit": 10}"#),
        )
        .await;
        assert_eq!(status, 403);
    }

    #[tokio::test]
    async fn invalid_advertisement_is_rejected_with_field_details() {
        let Some(db) = test_support::init_test_db().await else { return };
        let (addr, state) = spawn_db_app(&db).await;
        let auth = bearer(&token_for(&db, &state, UserRole::Admin).await);
        let (status, body) = send_raw(
            addr,
            "POST",
            "/api/advertisements",
            &[("Authorization", auth.as_str())],
            Some(r#"{"title": "", "imageUrl": "https://cdn.club.org/a.png"}"#),
        )
        .await;
        assert_eq!(status, 400);
        let json: Value = serde_json::from_str(&body).expect("error json");
        assert!(json["details"]["title"].is_array());
    }

    #[tokio::test]
    async fn demoted_admin_loses_admin_routes_with_the_old_token() {
        let Some(db) = test_support::init_test_db().await else { return };
        let (addr, state) = spawn_db_app(&db).await;
        let admin = db.user(UserRole::Admin).await;
        let auth = bearer(&state.auth_service.create_token(&admin).expect("token"));

        let (status, _) = send_raw(
            addr,
            "GET",
            "/api/advertisements/analytics/summary",
            &[("Authorization", auth.as_str())],
            None,
        )
        .await;
        assert_eq!(status, 200);

        state
            .auth_service
            .update_role(admin.id, UserRole::Member)
            .await
            .expect("demote");
        let (status, _) = send_raw(
            addr,
            "GET",
            "/api/advertisements/analytics/summary",
            &[("Authorization", auth.as_str())],
            None,
        )
        .await;
        assert_eq!(status, 403);
    }

    #[tokio::test]
    async fn invalid_contact_message_is_bad_request() {
        let addr = spawn_app().await;
        let (status, _) = send_raw(
            addr,
            "POST",
            "/api/contact",
            &[],
            Some(r#"{"name": "Ana", "email": "not-an-email", "subject": "Tryouts", "message": "When are the tryouts?"}"#),
        )
        .await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_even_without_token() {
        let addr = spawn_app().await;
        let (status, _) = send_raw(addr, "GET", "/api/nope", &[], None).await;
        assert_eq!(status, 404);
    }
}
