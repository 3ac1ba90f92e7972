// src/db/advertisement_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::advertisement::{
        AdPosition, Advertisement, AdvertisementBulkData, AdvertisementFilter, AdvertisementStats,
        CreateAdvertisementPayload,
    },
};

#[derive(Clone)]
pub struct AdvertisementRepository {
    pool: PgPool,
}

/// Totais brutos usados pelo relatório.
#[derive(Debug, sqlx::FromRow)]
pub struct AdvertisementTotals {
    pub total: i64,
    pub visible: i64,
    pub featured: i64,
    pub active_now: i64,
    pub total_clicks: i64,
    pub total_views: i64,
}

const DISPLAY_ORDER: &str = "featured DESC, display_order ASC, priority DESC, created_at DESC";

impl AdvertisementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &AdvertisementFilter) -> Result<Vec<Advertisement>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM advertisements WHERE 1 = 1");

        if let Some(position) = filter.position {
            qb.push(" AND position = ").push_bind(position);
        }
        if let Some(visible) = filter.visible {
            qb.push(" AND visible = ").push_bind(visible);
        }
        if let Some(featured) = filter.featured {
            qb.push(" AND featured = ").push_bind(featured);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR advertiser_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY ").push(DISPLAY_ORDER);

        let ads = qb.build_query_as::<Advertisement>().fetch_all(&self.pool).await?;
        Ok(ads)
    }

    /// Anúncios visíveis; a janela de datas é aplicada em `select_active`.
    pub async fn list_visible(&self, position: Option<AdPosition>) -> Result<Vec<Advertisement>, AppError> {
        let ads = sqlx::query_as::<_, Advertisement>(
            r#"
            SELECT * FROM advertisements
            WHERE visible = TRUE
              AND ($1::ad_position IS NULL OR position = $1)
            "#,
        )
        .bind(position)
        .fetch_all(&self.pool)
        .await?;
        Ok(ads)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Advertisement>, AppError> {
        let ad = sqlx::query_as::<_, Advertisement>("SELECT * FROM advertisements WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ad)
    }

    pub async fn create(
        &self,
        payload: &CreateAdvertisementPayload,
        created_by: Uuid,
    ) -> Result<Advertisement, AppError> {
        let ad = sqlx::query_as::<_, Advertisement>(
            r#"
            INSERT INTO advertisements (
                title, description, image_url, link_url, advertiser_name, position,
                visible, featured, display_order, priority, start_date, end_date,
                created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING *
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.image_url)
        .bind(&payload.link_url)
        .bind(&payload.advertiser_name)
        .bind(payload.position)
        .bind(payload.visible)
        .bind(payload.featured)
        .bind(payload.display_order)
        .bind(payload.priority)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(ad)
    }

    /// Grava o documento já mesclado.
    pub async fn update(&self, ad: &Advertisement, updated_by: Uuid) -> Result<Advertisement, AppError> {
        sqlx::query_as::<_, Advertisement>(
            r#"
            UPDATE advertisements SET
                title = $2, description = $3, image_url = $4, link_url = $5,
                advertiser_name = $6, position = $7, visible = $8, featured = $9,
                display_order = $10, priority = $11, start_date = $12, end_date = $13,
                updated_by = $14, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(ad.id)
        .bind(&ad.title)
        .bind(&ad.description)
        .bind(&ad.image_url)
        .bind(&ad.link_url)
        .bind(&ad.advertiser_name)
        .bind(ad.position)
        .bind(ad.visible)
        .bind(ad.featured)
        .bind(ad.display_order)
        .bind(ad.priority)
        .bind(ad.start_date)
        .bind(ad.end_date)
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("advertisement"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM advertisements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn increment_clicks(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE advertisements SET clicks = clicks + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn increment_views(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE advertisements SET views = views + 1 WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // --- Lote ---

    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM advertisements WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Campos ausentes em `data` ficam como estão (COALESCE).
    pub async fn bulk_update(
        &self,
        ids: &[Uuid],
        data: &AdvertisementBulkData,
        updated_by: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE advertisements SET
                visible = COALESCE($2, visible),
                featured = COALESCE($3, featured),
                position = COALESCE($4, position),
                priority = COALESCE($5, priority),
                updated_by = $6,
                updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(data.visible)
        .bind(data.featured)
        .bind(data.position)
        .bind(data.priority)
        .bind(updated_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Sem valor explícito, inverte a visibilidade de cada anúncio.
    pub async fn bulk_toggle_visibility(
        &self,
        ids: &[Uuid],
        visible: Option<bool>,
        updated_by: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE advertisements SET
                visible = COALESCE($2, NOT visible),
                updated_by = $3,
                updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(visible)
        .bind(updated_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // --- Relatório ---

    pub async fn totals(&self) -> Result<AdvertisementTotals, AppError> {
        let totals = sqlx::query_as::<_, AdvertisementTotals>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE visible) AS visible,
                COUNT(*) FILTER (WHERE featured) AS featured,
                COUNT(*) FILTER (
                    WHERE visible
                      AND (start_date IS NULL OR start_date <= NOW())
                      AND (end_date IS NULL OR NOW() <= end_date)
                ) AS active_now,
                COALESCE(SUM(clicks), 0)::BIGINT AS total_clicks,
                COALESCE(SUM(views), 0)::BIGINT AS total_views
            FROM advertisements
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    pub async fn count_by_position(&self) -> Result<Vec<(AdPosition, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (AdPosition, i64)>(
            "SELECT position, COUNT(*) FROM advertisements GROUP BY position ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn top_by_clicks(&self, limit: i64) -> Result<Vec<AdvertisementStats>, AppError> {
        let rows = sqlx::query_as::<_, AdvertisementStats>(
            "SELECT id, title, clicks, views FROM advertisements ORDER BY clicks DESC, views DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
