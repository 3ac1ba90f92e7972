// src/db/marketplace_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::marketplace::{
        CreateCategoryPayload, CreateItemPayload, ItemFilter, ItemStatus, MarketplaceCategory,
        MarketplaceItem, MarketplaceOffer, OfferFilter, OfferStatusCount, OFFER_TTL_DAYS,
    },
};

#[derive(Clone)]
pub struct MarketplaceRepository {
    pool: PgPool,
}

/// Totais brutos do relatório de ofertas.
#[derive(Debug, sqlx::FromRow)]
pub struct OfferTotals {
    pub total: i64,
    pub accepted_volume: Decimal,
    pub total_platform_fees: Decimal,
    pub received_count: i64,
}

// Condição de toda transição a partir de `pending`
const PENDING_AND_OPEN: &str = "status = 'pending' AND expires_at > NOW()";

impl MarketplaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self, only_active: bool) -> Result<Vec<MarketplaceCategory>, AppError> {
        let categories = sqlx::query_as::<_, MarketplaceCategory>(
            r#"
            SELECT * FROM marketplace_categories
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY sort_order ASC, name ASC
            "#,
        )
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_category(&self, id: Uuid) -> Result<Option<MarketplaceCategory>, AppError> {
        let category =
            sqlx::query_as::<_, MarketplaceCategory>("SELECT * FROM marketplace_categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(category)
    }

    pub async fn create_category(
        &self,
        payload: &CreateCategoryPayload,
        slug: &str,
    ) -> Result<MarketplaceCategory, AppError> {
        sqlx::query_as::<_, MarketplaceCategory>(
            r#"
            INSERT INTO marketplace_categories (name, slug, description, icon, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(slug)
        .bind(&payload.description)
        .bind(&payload.icon)
        .bind(payload.is_active)
        .bind(payload.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &payload.name, slug))
    }

    pub async fn update_category(&self, category: &MarketplaceCategory) -> Result<MarketplaceCategory, AppError> {
        sqlx::query_as::<_, MarketplaceCategory>(
            r#"
            UPDATE marketplace_categories SET
                description = $2, icon = $3, is_active = $4, sort_order = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(category.id)
        .bind(&category.description)
        .bind(&category.icon)
        .bind(category.is_active)
        .bind(category.sort_order)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("category"))
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM marketplace_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    /// Sem `status` no filtro, lista só os disponíveis.
    pub async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<MarketplaceItem>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM marketplace_items WHERE status = ");
        qb.push_bind(filter.status.unwrap_or(ItemStatus::Available));

        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(condition) = filter.condition {
            qb.push(" AND condition = ").push_bind(condition);
        }
        if let Some(min_price) = filter.min_price {
            qb.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            qb.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", q.trim());
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY ").push(filter.sort.order_by());

        let items = qb.build_query_as::<MarketplaceItem>().fetch_all(&self.pool).await?;
        Ok(items)
    }

    pub async fn list_items_by_seller(&self, seller_id: Uuid) -> Result<Vec<MarketplaceItem>, AppError> {
        let items = sqlx::query_as::<_, MarketplaceItem>(
            "SELECT * FROM marketplace_items WHERE seller_id = $1 ORDER BY created_at DESC",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn find_item(&self, id: Uuid) -> Result<Option<MarketplaceItem>, AppError> {
        let item = sqlx::query_as::<_, MarketplaceItem>("SELECT * FROM marketplace_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Anúncios que ocupam a cota do vendedor.
    pub async fn count_open_listings(&self, seller_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM marketplace_items WHERE seller_id = $1 AND status IN ('available', 'reserved')",
        )
        .bind(seller_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn create_item(&self, seller_id: Uuid, payload: &CreateItemPayload) -> Result<MarketplaceItem, AppError> {
        let item = sqlx::query_as::<_, MarketplaceItem>(
            r#"
            INSERT INTO marketplace_items (
                seller_id, category_id, title, description, price, condition, images, location
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(seller_id)
        .bind(payload.category_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.condition)
        .bind(&payload.images)
        .bind(&payload.location)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    pub async fn update_item(&self, item: &MarketplaceItem) -> Result<MarketplaceItem, AppError> {
        sqlx::query_as::<_, MarketplaceItem>(
            r#"
            UPDATE marketplace_items SET
                category_id = $2, title = $3, description = $4, price = $5, condition = $6,
                images = $7, location = $8, status = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(item.category_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.condition)
        .bind(&item.images)
        .bind(&item.location)
        .bind(item.status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("item"))
    }

    /// available -> reserved; `false` quando o item já não estava disponível.
    pub async fn reserve_item<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE marketplace_items SET status = 'reserved', updated_at = NOW()
            WHERE id = $1 AND status = 'available'
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// reserved -> sold; `false` quando o item não estava reservado.
    pub async fn mark_item_sold<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE marketplace_items SET status = 'sold', updated_at = NOW()
            WHERE id = $1 AND status = 'reserved'
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM marketplace_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn increment_item_views(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE marketplace_items SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  OFERTAS
    // =========================================================================

    /// Sem `expires_at`, a validade é contada do mesmo `NOW()` que grava `created_at`.
    pub async fn create_offer(
        &self,
        item: &MarketplaceItem,
        buyer_id: Uuid,
        amount: Decimal,
        message: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<MarketplaceOffer, AppError> {
        let offer = sqlx::query_as::<_, MarketplaceOffer>(
            r#"
            INSERT INTO marketplace_offers (item_id, buyer_id, seller_id, amount, message, expires_at)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW() + make_interval(days => $7)))
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(buyer_id)
        .bind(item.seller_id)
        .bind(amount)
        .bind(message)
        .bind(expires_at)
        .bind(OFFER_TTL_DAYS)
        .fetch_one(&self.pool)
        .await?;
        Ok(offer)
    }

    pub async fn find_offer(&self, id: Uuid) -> Result<Option<MarketplaceOffer>, AppError> {
        let offer = sqlx::query_as::<_, MarketplaceOffer>("SELECT * FROM marketplace_offers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(offer)
    }

    pub async fn list_offers_by_buyer(&self, buyer_id: Uuid) -> Result<Vec<MarketplaceOffer>, AppError> {
        let offers = sqlx::query_as::<_, MarketplaceOffer>(
            "SELECT * FROM marketplace_offers WHERE buyer_id = $1 ORDER BY created_at DESC",
        )
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(offers)
    }

    pub async fn list_offers_by_seller(&self, seller_id: Uuid) -> Result<Vec<MarketplaceOffer>, AppError> {
        let offers = sqlx::query_as::<_, MarketplaceOffer>(
            "SELECT * FROM marketplace_offers WHERE seller_id = $1 ORDER BY created_at DESC",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(offers)
    }

    pub async fn list_offers(&self, filter: &OfferFilter) -> Result<Vec<MarketplaceOffer>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM marketplace_offers WHERE 1 = 1");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(item_id) = filter.item_id {
            qb.push(" AND item_id = ").push_bind(item_id);
        }
        qb.push(" ORDER BY created_at DESC");

        let offers = qb.build_query_as::<MarketplaceOffer>().fetch_all(&self.pool).await?;
        Ok(offers)
    }

    // --- Transições (compare-and-swap) ---
    // Cada método devolve `None` quando a condição não casou mais no banco.

    pub async fn accept_offer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        agreed_amount: Decimal,
        platform_fee: Decimal,
    ) -> Result<Option<MarketplaceOffer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE marketplace_offers SET
                status = 'accepted', amount = $2, platform_fee = $3,
                responded_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND {PENDING_AND_OPEN}
            RETURNING *
            "#
        );
        let offer = sqlx::query_as::<_, MarketplaceOffer>(&sql)
            .bind(id)
            .bind(agreed_amount)
            .bind(platform_fee)
            .fetch_optional(executor)
            .await?;
        Ok(offer)
    }

    /// Recusa as demais ofertas pendentes do item depois de um aceite.
    pub async fn reject_pending_siblings<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        accepted_id: Uuid,
    ) -> Result<Vec<MarketplaceOffer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offers = sqlx::query_as::<_, MarketplaceOffer>(
            r#"
            UPDATE marketplace_offers SET
                status = 'rejected', responded_at = NOW(), updated_at = NOW()
            WHERE item_id = $1 AND id <> $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(accepted_id)
        .fetch_all(executor)
        .await?;
        Ok(offers)
    }

    pub async fn reject_offer(&self, id: Uuid) -> Result<Option<MarketplaceOffer>, AppError> {
        let sql = format!(
            r#"
            UPDATE marketplace_offers SET
                status = 'rejected', responded_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND {PENDING_AND_OPEN}
            RETURNING *
            "#
        );
        let offer = sqlx::query_as::<_, MarketplaceOffer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(offer)
    }

    pub async fn counter_offer(
        &self,
        id: Uuid,
        amount: Decimal,
        message: Option<&str>,
    ) -> Result<Option<MarketplaceOffer>, AppError> {
        let sql = format!(
            r#"
            UPDATE marketplace_offers SET
                counter_amount = $2, counter_message = $3,
                responded_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND {PENDING_AND_OPEN}
            RETURNING *
            "#
        );
        let offer = sqlx::query_as::<_, MarketplaceOffer>(&sql)
            .bind(id)
            .bind(amount)
            .bind(message)
            .fetch_optional(&self.pool)
            .await?;
        Ok(offer)
    }

    pub async fn withdraw_offer(&self, id: Uuid) -> Result<Option<MarketplaceOffer>, AppError> {
        let offer = sqlx::query_as::<_, MarketplaceOffer>(
            r#"
            UPDATE marketplace_offers SET status = 'withdrawn', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(offer)
    }

    pub async fn mark_offer_received<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<MarketplaceOffer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let offer = sqlx::query_as::<_, MarketplaceOffer>(
            r#"
            UPDATE marketplace_offers SET
                is_received = TRUE, received_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'accepted' AND is_received = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(offer)
    }

    pub async fn rate_as_buyer(
        &self,
        id: Uuid,
        rating: i16,
        review: Option<&str>,
    ) -> Result<Option<MarketplaceOffer>, AppError> {
        let offer = sqlx::query_as::<_, MarketplaceOffer>(
            r#"
            UPDATE marketplace_offers SET buyer_rating = $2, buyer_review = $3, updated_at = NOW()
            WHERE id = $1 AND is_received = TRUE AND buyer_rating IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(rating)
        .bind(review)
        .fetch_optional(&self.pool)
        .await?;
        Ok(offer)
    }

    pub async fn rate_as_seller(
        &self,
        id: Uuid,
        rating: i16,
        review: Option<&str>,
    ) -> Result<Option<MarketplaceOffer>, AppError> {
        let offer = sqlx::query_as::<_, MarketplaceOffer>(
            r#"
            UPDATE marketplace_offers SET seller_rating = $2, seller_review = $3, updated_at = NOW()
            WHERE id = $1 AND is_received = TRUE AND seller_rating IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(rating)
        .bind(review)
        .fetch_optional(&self.pool)
        .await?;
        Ok(offer)
    }

    // --- Lote ---

    pub async fn bulk_delete_offers(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM marketplace_offers WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Grava `expired` nas pendentes vencidas dentre `ids`.
    pub async fn bulk_expire_offers(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE marketplace_offers SET status = 'expired', updated_at = NOW()
            WHERE id = ANY($1) AND status = 'pending' AND expires_at <= NOW()
            "#,
        )
        .bind(ids)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // --- Relatório ---

    pub async fn offer_totals(&self) -> Result<OfferTotals, AppError> {
        let totals = sqlx::query_as::<_, OfferTotals>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(amount) FILTER (WHERE status = 'accepted'), 0) AS accepted_volume,
                COALESCE(SUM(platform_fee) FILTER (WHERE status = 'accepted'), 0) AS total_platform_fees,
                COUNT(*) FILTER (WHERE is_received) AS received_count
            FROM marketplace_offers
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    /// Status efetivo: pendente vencida conta como `expired`.
    pub async fn count_offers_by_status(&self) -> Result<Vec<OfferStatusCount>, AppError> {
        let rows = sqlx::query_as::<_, OfferStatusCount>(
            r#"
            SELECT
                CASE WHEN status = 'pending' AND expires_at <= NOW()
                     THEN 'expired'::offer_status ELSE status END AS status,
                COUNT(*) AS count
            FROM marketplace_offers
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn average_rating(&self) -> Result<Option<f64>, AppError> {
        let avg = sqlx::query_scalar::<_, Option<f64>>(
            r#"
            SELECT AVG(r)::FLOAT8 FROM (
                SELECT buyer_rating AS r FROM marketplace_offers WHERE buyer_rating IS NOT NULL
                UNION ALL
                SELECT seller_rating AS r FROM marketplace_offers WHERE seller_rating IS NOT NULL
            ) ratings
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(avg)
    }
}
