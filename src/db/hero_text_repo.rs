// src/db/hero_text_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::hero_text::HeroTextSettings};

const COLUMNS: &str = "title, subtitle, description, cta_text, cta_link, secondary_cta_text, \
    secondary_cta_link, background_image_url, text_alignment, overlay_opacity, is_active, \
    updated_by, updated_at";

#[derive(Clone)]
pub struct HeroTextRepository {
    pool: PgPool,
}

impl HeroTextRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `None` enquanto ninguém salvou o banner.
    pub async fn get(&self) -> Result<Option<HeroTextSettings>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM hero_text_settings WHERE id = 1");
        let settings = sqlx::query_as::<_, HeroTextSettings>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(settings)
    }

    // Linha única (id = 1): insere na primeira gravação, atualiza nas seguintes
    pub async fn upsert(
        &self,
        settings: &HeroTextSettings,
        updated_by: Uuid,
    ) -> Result<HeroTextSettings, AppError> {
        let sql = format!(
            r#"
            INSERT INTO hero_text_settings (
                id, title, subtitle, description, cta_text, cta_link, secondary_cta_text,
                secondary_cta_link, background_image_url, text_alignment, overlay_opacity,
                is_active, updated_by, updated_at
            )
            VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                subtitle = EXCLUDED.subtitle,
                description = EXCLUDED.description,
                cta_text = EXCLUDED.cta_text,
                cta_link = EXCLUDED.cta_link,
                secondary_cta_text = EXCLUDED.secondary_cta_text,
                secondary_cta_link = EXCLUDED.secondary_cta_link,
                background_image_url = EXCLUDED.background_image_url,
                text_alignment = EXCLUDED.text_alignment,
                overlay_opacity = EXCLUDED.overlay_opacity,
                is_active = EXCLUDED.is_active,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING {COLUMNS}
            "#
        );

        let saved = sqlx::query_as::<_, HeroTextSettings>(&sql)
            .bind(&settings.title)
            .bind(&settings.subtitle)
            .bind(&settings.description)
            .bind(&settings.cta_text)
            .bind(&settings.cta_link)
            .bind(&settings.secondary_cta_text)
            .bind(&settings.secondary_cta_link)
            .bind(&settings.background_image_url)
            .bind(settings.text_alignment)
            .bind(settings.overlay_opacity)
            .bind(settings.is_active)
            .bind(updated_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }
}
