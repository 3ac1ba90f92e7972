// src/db/settings_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::settings::FeeConfig};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Se ainda não existe linha, devolve os valores padrão.
    pub async fn get_fee_config(&self) -> Result<FeeConfig, AppError> {
        let config = sqlx::query_as::<_, FeeConfig>(
            r#"
            SELECT marketplace_commission_percent, listing_fee, membership_processing_fee,
                   free_listing_limit, currency, updated_by, updated_at
            FROM fee_config WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(config.unwrap_or_default())
    }

    pub async fn upsert_fee_config(&self, config: &FeeConfig, updated_by: Uuid) -> Result<FeeConfig, AppError> {
        let saved = sqlx::query_as::<_, FeeConfig>(
            r#"
            INSERT INTO fee_config (
                id, marketplace_commission_percent, listing_fee, membership_processing_fee,
                free_listing_limit, currency, updated_by, updated_at
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (id) DO UPDATE SET
                marketplace_commission_percent = EXCLUDED.marketplace_commission_percent,
                listing_fee = EXCLUDED.listing_fee,
                membership_processing_fee = EXCLUDED.membership_processing_fee,
                free_listing_limit = EXCLUDED.free_listing_limit,
                currency = EXCLUDED.currency,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING marketplace_commission_percent, listing_fee, membership_processing_fee,
                      free_listing_limit, currency, updated_by, updated_at
            "#,
        )
        .bind(config.marketplace_commission_percent)
        .bind(config.listing_fee)
        .bind(config.membership_processing_fee)
        .bind(config.free_listing_limit)
        .bind(&config.currency)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }
}
