// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, str::FromStr, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{
        AdvertisementRepository, ContactRepository, HeroTextRepository, MarketplaceRepository,
        MembershipRepository, NotificationRepository, SettingsRepository, UserRepository,
    },
    services::{
        advertisement_service::AdvertisementService,
        auth::{AuthService, JwtConfig},
        marketplace_service::MarketplaceService,
        membership_service::MembershipService,
        notification_service::NotificationService,
        settings_service::SettingsService,
    },
};

/// Configuração lida do ambiente (`.env` opcional).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_days: i64,
    pub server_addr: String,
    pub server_timeout_secs: u64,
    pub server_body_limit_mb: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_ttl_days: parse_or("JWT_TTL_DAYS", 7)?,
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            server_timeout_secs: parse_or("SERVER_TIMEOUT_SECS", 30)?,
            server_body_limit_mb: parse_or("SERVER_BODY_LIMIT_MB", 2)?,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: &'static I18nStore,
    pub auth_service: AuthService,
    pub advertisement_service: AdvertisementService,
    pub settings_service: SettingsService,
    pub membership_service: MembershipService,
    pub marketplace_service: MarketplaceService,
    pub notification_service: NotificationService,
    pub contact_repo: ContactRepository,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::build(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn build(config: &AppConfig, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let membership_repo = MembershipRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let notification_service =
            NotificationService::new(NotificationRepository::new(db_pool.clone()), user_repo.clone());

        let jwt = JwtConfig {
            secret: config.jwt_secret.clone(),
            ttl_days: config.jwt_ttl_days,
        };

        Self {
            i18n_store: I18nStore::shared(),
            auth_service: AuthService::new(user_repo, jwt, db_pool.clone()),
            advertisement_service: AdvertisementService::new(AdvertisementRepository::new(db_pool.clone())),
            settings_service: SettingsService::new(
                HeroTextRepository::new(db_pool.clone()),
                settings_repo.clone(),
            ),
            membership_service: MembershipService::new(
                membership_repo.clone(),
                notification_service.clone(),
                db_pool.clone(),
            ),
            marketplace_service: MarketplaceService::new(
                MarketplaceRepository::new(db_pool.clone()),
                membership_repo,
                settings_repo,
                notification_service.clone(),
                db_pool.clone(),
            ),
            notification_service,
            contact_repo: ContactRepository::new(db_pool.clone()),
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_uses_default_when_unset() {
        let value: u32 = parse_or("CLUB_PORTAL_TEST_UNSET_VARIABLE", 5).unwrap();
        assert_eq!(value, 5);
    }
}
