// src/db/membership_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::{map_foreign_key_violation, map_unique_violation, AppError},
    models::membership::{
        CreateTierPayload, Membership, MembershipFilter, MembershipStatus, MembershipTier,
        StatusCount, TierBreakdown,
    },
};

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PLANOS
    // =========================================================================

    pub async fn list_tiers(&self, only_active: bool) -> Result<Vec<MembershipTier>, AppError> {
        let tiers = sqlx::query_as::<_, MembershipTier>(
            r#"
            SELECT * FROM membership_tiers
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY sort_order ASC, price ASC
            "#,
        )
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;
        Ok(tiers)
    }

    pub async fn find_tier(&self, id: Uuid) -> Result<Option<MembershipTier>, AppError> {
        let tier = sqlx::query_as::<_, MembershipTier>("SELECT * FROM membership_tiers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tier)
    }

    pub async fn create_tier(
        &self,
        payload: &CreateTierPayload,
        slug: &str,
        created_by: Uuid,
    ) -> Result<MembershipTier, AppError> {
        sqlx::query_as::<_, MembershipTier>(
            r#"
            INSERT INTO membership_tiers (
                name, slug, description, price, duration_months, features, benefits,
                listing_limit, discount_percentage, is_active, sort_order, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(slug)
        .bind(&payload.description)
        .bind(payload.price)
        .bind(payload.duration_months)
        .bind(&payload.features)
        .bind(&payload.benefits)
        .bind(payload.listing_limit)
        .bind(payload.discount_percentage)
        .bind(payload.is_active)
        .bind(payload.sort_order)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &payload.name, slug))
    }

    pub async fn update_tier(&self, tier: &MembershipTier, updated_by: Uuid) -> Result<MembershipTier, AppError> {
        sqlx::query_as::<_, MembershipTier>(
            r#"
            UPDATE membership_tiers SET
                description = $2, price = $3, duration_months = $4, features = $5,
                benefits = $6, listing_limit = $7, discount_percentage = $8,
                is_active = $9, sort_order = $10, updated_by = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tier.id)
        .bind(&tier.description)
        .bind(tier.price)
        .bind(tier.duration_months)
        .bind(&tier.features)
        .bind(&tier.benefits)
        .bind(tier.listing_limit)
        .bind(tier.discount_percentage)
        .bind(tier.is_active)
        .bind(tier.sort_order)
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("membership tier"))
    }

    /// Plano com associações não pode ser removido (FK RESTRICT).
    pub async fn delete_tier(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM membership_tiers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_foreign_key_violation(e, "membership tier"))?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  ASSOCIAÇÕES
    // =========================================================================

    pub async fn list(&self, filter: &MembershipFilter) -> Result<Vec<Membership>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM memberships WHERE 1 = 1");

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(tier_id) = filter.tier_id {
            qb.push(" AND tier_id = ").push_bind(tier_id);
        }
        if let Some(payment_status) = filter.payment_status {
            qb.push(" AND payment_status = ").push_bind(payment_status);
        }
        if let Some(user_id) = filter.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        qb.push(" ORDER BY created_at DESC");

        let rows = qb.build_query_as::<Membership>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Membership>, AppError> {
        let membership = sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(membership)
    }

    /// Trava a linha até o fim da transação do `executor`.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Membership>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let membership =
            sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(membership)
    }

    pub async fn latest_for_user(&self, user_id: Uuid) -> Result<Option<Membership>, AppError> {
        let membership = sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(membership)
    }

    /// Plano da associação ativa do usuário, se houver.
    pub async fn active_tier_for_user(&self, user_id: Uuid) -> Result<Option<MembershipTier>, AppError> {
        let tier = sqlx::query_as::<_, MembershipTier>(
            r#"
            SELECT t.* FROM memberships m
            JOIN membership_tiers t ON t.id = m.tier_id
            WHERE m.user_id = $1
              AND m.status = 'active'
              AND (m.end_date IS NULL OR m.end_date >= NOW())
            ORDER BY m.end_date DESC NULLS FIRST
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tier)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        tier: &MembershipTier,
        auto_renew: bool,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<Membership, AppError> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (user_id, tier_id, amount_paid, auto_renew, notes, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(tier.id)
        .bind(tier.price)
        .bind(auto_renew)
        .bind(notes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(membership)
    }

    /// Grava o estado completo da associação (após uma transição em memória).
    pub async fn save<'e, E>(
        &self,
        executor: E,
        membership: &Membership,
        updated_by: Uuid,
    ) -> Result<Membership, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Membership>(
            r#"
            UPDATE memberships SET
                tier_id = $2, status = $3, start_date = $4, end_date = $5,
                payment_status = $6, payment_method = $7, amount_paid = $8,
                auto_renew = $9, renewal_history = $10, suspension_reason = $11,
                suspended_at = $12, suspended_until = $13, cancellation_reason = $14,
                cancelled_at = $15, notes = $16, updated_by = $17, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(membership.id)
        .bind(membership.tier_id)
        .bind(membership.status)
        .bind(membership.start_date)
        .bind(membership.end_date)
        .bind(membership.payment_status)
        .bind(membership.payment_method)
        .bind(membership.amount_paid)
        .bind(membership.auto_renew)
        .bind(&membership.renewal_history)
        .bind(&membership.suspension_reason)
        .bind(membership.suspended_at)
        .bind(membership.suspended_until)
        .bind(&membership.cancellation_reason)
        .bind(membership.cancelled_at)
        .bind(&membership.notes)
        .bind(updated_by)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("membership"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM memberships WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn expiring_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Membership>, AppError> {
        let rows = sqlx::query_as::<_, Membership>(
            r#"
            SELECT * FROM memberships
            WHERE status = 'active'
              AND end_date >= NOW()
              AND end_date <= $1
            ORDER BY end_date ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn expire_overdue(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE memberships SET status = 'expired', updated_at = NOW()
            WHERE status = 'active' AND end_date < NOW()
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // --- Lote ---

    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM memberships WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn bulk_update_status(
        &self,
        ids: &[Uuid],
        status: MembershipStatus,
        updated_by: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE memberships SET status = $2, updated_by = $3, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .bind(status)
        .bind(updated_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // --- Relatório ---

    pub async fn count_all(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM memberships")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn count_by_status(&self) -> Result<Vec<StatusCount>, AppError> {
        let rows = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM memberships GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn breakdown_by_tier(&self) -> Result<Vec<TierBreakdown>, AppError> {
        let rows = sqlx::query_as::<_, TierBreakdown>(
            r#"
            SELECT
                t.id AS tier_id,
                t.name AS tier_name,
                COUNT(m.id) FILTER (WHERE m.status = 'active') AS active_count,
                COALESCE(SUM(m.amount_paid) FILTER (WHERE m.payment_status = 'paid'), 0) AS revenue
            FROM membership_tiers t
            LEFT JOIN memberships m ON m.tier_id = t.id
            GROUP BY t.id, t.name
            ORDER BY t.sort_order ASC, t.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn total_revenue(&self) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount_paid), 0) FROM memberships WHERE payment_status = 'paid'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn count_expiring_before(&self, cutoff: DateTime<Utc>) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM memberships
            WHERE status = 'active' AND end_date >= NOW() AND end_date <= $1
            "#,
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
