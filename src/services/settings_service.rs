// src/services/settings_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{HeroTextRepository, SettingsRepository},
    models::{
        hero_text::{HeroTextSettings, UpdateHeroTextPayload},
        settings::{FeeConfig, UpdateFeeConfigPayload},
    },
};

/// Documentos únicos da aplicação: banner principal e taxas.
#[derive(Clone)]
pub struct SettingsService {
    hero_repo: HeroTextRepository,
    settings_repo: SettingsRepository,
}

impl SettingsService {
    pub fn new(hero_repo: HeroTextRepository, settings_repo: SettingsRepository) -> Self {
        Self { hero_repo, settings_repo }
    }

    pub async fn get_hero_text(&self) -> Result<HeroTextSettings, AppError> {
        Ok(self.hero_repo.get().await?.unwrap_or_default())
    }

    /// Banner desativado é servido com os textos padrão.
    pub async fn get_public_hero_text(&self) -> Result<HeroTextSettings, AppError> {
        let settings = self.get_hero_text().await?;
        if settings.is_active {
            Ok(settings)
        } else {
            Ok(HeroTextSettings::default())
        }
    }

    pub async fn update_hero_text(
        &self,
        payload: UpdateHeroTextPayload,
        actor: Uuid,
    ) -> Result<HeroTextSettings, AppError> {
        let mut settings = self.get_hero_text().await?;
        payload.apply(&mut settings);
        let saved = self.hero_repo.upsert(&settings, actor).await?;
        tracing::info!("🖼️ Banner principal atualizado por {}", actor);
        Ok(saved)
    }

    pub async fn get_fee_config(&self) -> Result<FeeConfig, AppError> {
        self.settings_repo.get_fee_config().await
    }

    pub async fn update_fee_config(&self, payload: UpdateFeeConfigPayload, actor: Uuid) -> Result<FeeConfig, AppError> {
        let mut config = self.settings_repo.get_fee_config().await?;
        payload.apply(&mut config);
        let saved = self.settings_repo.upsert_fee_config(&config, actor).await?;
        tracing::info!("💰 Configuração de taxas atualizada por {}", actor);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::{models::auth::UserRole, test_support};

    async fn row_count(pool: &sqlx::PgPool, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fee_and_hero_settings_stay_a_single_row() {
        let Some(db) = test_support::init_test_db().await else { return };
        let service = db.state().settings_service;
        let admin = db.principal(UserRole::Admin).await;

        let first = UpdateFeeConfigPayload { free_listing_limit: Some(5), ..Default::default() };
        service.update_fee_config(first, admin.id).await.unwrap();
        let second = UpdateFeeConfigPayload { listing_fee: Some(Decimal::new(150, 2)), ..Default::default() };
        let fees = service.update_fee_config(second, admin.id).await.unwrap();
        assert_eq!(fees.free_listing_limit, 5);
        assert_eq!(fees.listing_fee, Decimal::new(150, 2));
        assert_eq!(row_count(&db.pool, "fee_config").await, 1);

        for title in ["Welcome", "Season opener"] {
            let payload = UpdateHeroTextPayload { title: Some(title.into()), ..Default::default() };
            service.update_hero_text(payload, admin.id).await.unwrap();
        }
        assert_eq!(service.get_hero_text().await.unwrap().title, "Season opener");
        assert_eq!(row_count(&db.pool, "hero_text_settings").await, 1);
    }
}
