// src/models/membership.rs

use std::fmt;

use chrono::{DateTime, Months, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    error::AppError,
    validation::{field_error, validate_not_negative, validate_percentage},
};

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "membership_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Pending,
    Active,
    Expired,
    Cancelled,
    Suspended,
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MembershipStatus::Pending => "pending",
            MembershipStatus::Active => "active",
            MembershipStatus::Expired => "expired",
            MembershipStatus::Cancelled => "cancelled",
            MembershipStatus::Suspended => "suspended",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Cash,
    BankTransfer,
    Other,
}

// --- Planos ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipTier {
    pub id: Uuid,
    #[schema(example = "Gold")]
    pub name: String,
    #[schema(example = "gold")]
    pub slug: String,
    pub description: Option<String>,
    #[schema(example = "120.00")]
    pub price: Decimal,
    #[schema(example = 12)]
    pub duration_months: i32,
    pub features: Vec<String>,
    pub benefits: Vec<String>,
    /// Limite de anúncios no marketplace; `null` = ilimitado
    pub listing_limit: Option<i32>,
    pub discount_percentage: Decimal,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTierPayload {
    #[validate(length(min = 2, max = 60, message = "Name must have 2 to 60 characters."))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description must have at most 1000 characters."))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    #[validate(range(min = 1, max = 60, message = "Duration must be between 1 and 60 months."))]
    pub duration_months: i32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[validate(range(min = 0, message = "Listing limit must not be negative."))]
    pub listing_limit: Option<i32>,
    #[validate(custom(function = "validate_percentage"))]
    #[serde(default)]
    pub discount_percentage: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_true() -> bool {
    true
}

/// O nome (e o slug derivado dele) não muda depois de criado.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTierPayload {
    #[validate(length(max = 1000, message = "Description must have at most 1000 characters."))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 1, max = 60, message = "Duration must be between 1 and 60 months."))]
    pub duration_months: Option<i32>,
    pub features: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    #[validate(range(min = 0, message = "Listing limit must not be negative."))]
    pub listing_limit: Option<i32>,
    #[validate(custom(function = "validate_percentage"))]
    pub discount_percentage: Option<Decimal>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl UpdateTierPayload {
    pub fn apply(self, tier: &mut MembershipTier) {
        if let Some(v) = self.description {
            tier.description = Some(v);
        }
        if let Some(v) = self.price {
            tier.price = v;
        }
        if let Some(v) = self.duration_months {
            tier.duration_months = v;
        }
        if let Some(v) = self.features {
            tier.features = v;
        }
        if let Some(v) = self.benefits {
            tier.benefits = v;
        }
        if let Some(v) = self.listing_limit {
            tier.listing_limit = Some(v);
        }
        if let Some(v) = self.discount_percentage {
            tier.discount_percentage = v;
        }
        if let Some(v) = self.is_active {
            tier.is_active = v;
        }
        if let Some(v) = self.sort_order {
            tier.sort_order = v;
        }
    }
}

// --- Associações ---

/// Uma entrada do histórico de renovações (só cresce).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenewalEntry {
    pub renewed_at: DateTime<Utc>,
    pub months: u32,
    pub previous_end_date: Option<DateTime<Utc>>,
    pub new_end_date: DateTime<Utc>,
    pub amount: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub renewed_by: Option<Uuid>,
}

/// Cobrança de uma renovação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalCharge {
    pub amount: Decimal,
    pub method: Option<PaymentMethod>,
    pub status: PaymentStatus,
}

impl RenewalCharge {
    /// Só administradores informam valor e forma de pagamento e confirmam o pagamento.
    /// O sócio renova pelo preço proporcional do plano, com pagamento pendente.
    pub fn resolve(
        amount: Option<Decimal>,
        method: Option<PaymentMethod>,
        prorated: Decimal,
        by_admin: bool,
    ) -> Result<Self, AppError> {
        if by_admin {
            return Ok(Self {
                amount: amount.unwrap_or(prorated),
                method,
                status: PaymentStatus::Paid,
            });
        }
        if amount.is_some() || method.is_some() {
            return Err(AppError::Forbidden);
        }
        Ok(Self { amount: prorated, method: None, status: PaymentStatus::Pending })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier_id: Uuid,
    pub status: MembershipStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub amount_paid: Decimal,
    pub auto_renew: bool,
    #[schema(value_type = Vec<RenewalEntry>)]
    pub renewal_history: Json<Vec<RenewalEntry>>,
    pub suspension_reason: Option<String>,
    pub suspended_at: Option<DateTime<Utc>>,
    pub suspended_until: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn add_months(date: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>, AppError> {
    date.checked_add_months(Months::new(months))
        .ok_or(AppError::InvalidDateRange)
}

impl Membership {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == MembershipStatus::Active && self.end_date.is_none_or(|end| end >= now)
    }

    fn invalid(&self, action: &'static str) -> AppError {
        AppError::InvalidTransition {
            from: self.status.to_string(),
            action,
        }
    }

    /// pending -> active após o pagamento.
    pub fn activate(
        &mut self,
        duration_months: u32,
        amount: Decimal,
        method: Option<PaymentMethod>,
        start: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.status != MembershipStatus::Pending {
            return Err(self.invalid("activate"));
        }
        self.status = MembershipStatus::Active;
        self.start_date = Some(start);
        self.end_date = Some(add_months(start, duration_months)?);
        self.payment_status = PaymentStatus::Paid;
        self.payment_method = method;
        self.amount_paid = amount;
        Ok(())
    }

    /// Estende `end_date` a partir do valor anterior (não de "agora") e registra no histórico.
    pub fn renew(
        &mut self,
        months: u32,
        charge: RenewalCharge,
        renewed_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<RenewalEntry, AppError> {
        if !matches!(self.status, MembershipStatus::Active | MembershipStatus::Expired) {
            return Err(self.invalid("renew"));
        }

        let previous_end_date = self.end_date;
        let new_end_date = add_months(previous_end_date.unwrap_or(now), months)?;

        let entry = RenewalEntry {
            renewed_at: now,
            months,
            previous_end_date,
            new_end_date,
            amount: charge.amount,
            payment_method: charge.method,
            payment_status: charge.status,
            renewed_by,
        };

        self.status = MembershipStatus::Active;
        self.end_date = Some(new_end_date);
        self.start_date.get_or_insert(now);
        self.payment_status = charge.status;
        if charge.method.is_some() {
            self.payment_method = charge.method;
        }
        self.amount_paid += charge.amount;
        self.renewal_history.0.push(entry.clone());
        Ok(entry)
    }

    pub fn suspend(
        &mut self,
        reason: String,
        until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.status != MembershipStatus::Active {
            return Err(self.invalid("suspend"));
        }
        if until.is_some_and(|u| u <= now) {
            return Err(AppError::InvalidDateRange);
        }
        self.status = MembershipStatus::Suspended;
        self.suspension_reason = Some(reason);
        self.suspended_at = Some(now);
        self.suspended_until = until;
        Ok(())
    }

    pub fn reinstate(&mut self) -> Result<(), AppError> {
        if self.status != MembershipStatus::Suspended {
            return Err(self.invalid("reinstate"));
        }
        self.status = MembershipStatus::Active;
        self.suspension_reason = None;
        self.suspended_at = None;
        self.suspended_until = None;
        Ok(())
    }

    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.status == MembershipStatus::Cancelled {
            return Err(self.invalid("cancel"));
        }
        self.status = MembershipStatus::Cancelled;
        self.cancellation_reason = reason;
        self.cancelled_at = Some(now);
        Ok(())
    }
}

/// Associação com o plano embutido (resposta de /me).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipDetail {
    #[serde(flatten)]
    pub membership: Membership,
    pub tier: MembershipTier,
    pub is_currently_active: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMembershipPayload {
    pub tier_id: Uuid,
    /// Só administradores podem criar para outro usuário
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub auto_renew: bool,
    #[validate(length(max = 1000, message = "Notes must have at most 1000 characters."))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMembershipPayload {
    pub tier_id: Option<Uuid>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub auto_renew: Option<bool>,
    #[validate(length(max = 1000, message = "Notes must have at most 1000 characters."))]
    pub notes: Option<String>,
}

impl UpdateMembershipPayload {
    pub fn apply(self, membership: &mut Membership) {
        if let Some(v) = self.tier_id {
            membership.tier_id = v;
        }
        if let Some(v) = self.payment_status {
            membership.payment_status = v;
        }
        if let Some(v) = self.payment_method {
            membership.payment_method = Some(v);
        }
        if let Some(v) = self.auto_renew {
            membership.auto_renew = v;
        }
        if let Some(v) = self.notes {
            membership.notes = Some(v);
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateMembershipPayload {
    /// Quando ausente, usa o preço do plano
    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
    pub start_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenewMembershipPayload {
    #[validate(range(min = 1, max = 60, message = "Renewal must be between 1 and 60 months."))]
    pub months: u32,
    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuspendMembershipPayload {
    #[validate(length(min = 3, max = 500, message = "Reason must have 3 to 500 characters."))]
    pub reason: String,
    pub until: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CancelMembershipPayload {
    #[validate(length(max = 500, message = "Reason must have at most 500 characters."))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MembershipFilter {
    pub status: Option<MembershipStatus>,
    pub tier_id: Option<Uuid>,
    pub payment_status: Option<PaymentStatus>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExpiringQuery {
    /// Janela em dias (padrão 7)
    pub days: Option<i64>,
}

pub const DEFAULT_EXPIRING_DAYS: i64 = 7;
pub const MAX_EXPIRING_DAYS: i64 = 3650;

/// Limite da janela "vencendo em até N dias", com N em 1..=3650.
pub fn expiring_cutoff(now: DateTime<Utc>, days: Option<i64>) -> Result<DateTime<Utc>, AppError> {
    let days = days.unwrap_or(DEFAULT_EXPIRING_DAYS);
    if !(1..=MAX_EXPIRING_DAYS).contains(&days) {
        return Err(field_error("days", "range", "Days must be between 1 and 3650."));
    }
    TimeDelta::try_days(days)
        .and_then(|window| now.checked_add_signed(window))
        .ok_or_else(|| field_error("days", "range", "Days must be between 1 and 3650."))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum MembershipBulkAction {
    Delete,
    UpdateStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipBulkPayload {
    pub action: MembershipBulkAction,
    #[validate(length(min = 1, message = "At least one id is required."))]
    pub ids: Vec<Uuid>,
    pub status: Option<MembershipStatus>,
}

// --- Relatórios ---

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: MembershipStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierBreakdown {
    pub tier_id: Uuid,
    pub tier_name: String,
    pub active_count: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipAnalytics {
    pub total_memberships: i64,
    pub by_status: Vec<StatusCount>,
    pub by_tier: Vec<TierBreakdown>,
    pub total_revenue: Decimal,
    pub expiring_within_30_days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn membership(status: MembershipStatus) -> Membership {
        let now = Utc::now();
        Membership {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tier_id: Uuid::new_v4(),
            status,
            start_date: None,
            end_date: None,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            amount_paid: Decimal::ZERO,
            auto_renew: false,
            renewal_history: Json(Vec::new()),
            suspension_reason: None,
            suspended_at: None,
            suspended_until: None,
            cancellation_reason: None,
            cancelled_at: None,
            notes: None,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn paid(amount: Decimal, method: Option<PaymentMethod>) -> RenewalCharge {
        RenewalCharge { amount, method, status: PaymentStatus::Paid }
    }

    #[test]
    fn activation_sets_window_from_tier_duration() {
        let mut m = membership(MembershipStatus::Pending);
        m.activate(12, Decimal::new(12000, 2), Some(PaymentMethod::Card), at(2025, 1, 15))
            .unwrap();

        assert_eq!(m.status, MembershipStatus::Active);
        assert_eq!(m.start_date, Some(at(2025, 1, 15)));
        assert_eq!(m.end_date, Some(at(2026, 1, 15)));
        assert_eq!(m.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn only_pending_can_be_activated() {
        let mut m = membership(MembershipStatus::Active);
        let err = m.activate(1, Decimal::ZERO, None, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { action: "activate", .. }));
    }

    #[test]
    fn renewal_extends_from_prior_end_date_not_now() {
        let mut m = membership(MembershipStatus::Active);
        m.end_date = Some(at(2025, 6, 30));
        let now = at(2025, 3, 1);

        let entry = m
            .renew(3, paid(Decimal::new(3000, 2), Some(PaymentMethod::Cash)), None, now)
            .unwrap();

        assert_eq!(m.end_date, Some(at(2025, 9, 30)));
        assert_eq!(entry.previous_end_date, Some(at(2025, 6, 30)));
        assert_eq!(entry.new_end_date, at(2025, 9, 30));
        assert_eq!(m.renewal_history.0.len(), 1);
        assert_eq!(m.renewal_history.0[0], entry);
    }

    #[test]
    fn each_renewal_appends_exactly_one_entry() {
        let mut m = membership(MembershipStatus::Active);
        m.end_date = Some(at(2025, 1, 31));
        let now = at(2025, 1, 1);

        m.renew(1, paid(Decimal::ONE, None), None, now).unwrap();
        m.renew(1, paid(Decimal::ONE, None), None, now).unwrap();

        assert_eq!(m.renewal_history.0.len(), 2);
        // 31/jan + 1 mês = 28/fev; + 1 mês = 28/mar
        assert_eq!(m.end_date, Some(at(2025, 3, 28)));
        assert_eq!(m.amount_paid, Decimal::new(2, 0));
    }

    #[test]
    fn renewal_reactivates_expired_membership() {
        let mut m = membership(MembershipStatus::Expired);
        m.end_date = Some(at(2024, 12, 1));
        m.renew(12, paid(Decimal::ZERO, None), None, at(2025, 2, 1)).unwrap();
        assert_eq!(m.status, MembershipStatus::Active);
        assert_eq!(m.end_date, Some(at(2025, 12, 1)));
    }

    #[test]
    fn renewal_without_prior_end_date_starts_now() {
        let mut m = membership(MembershipStatus::Active);
        let now = at(2025, 5, 10);
        m.renew(2, paid(Decimal::ZERO, None), None, now).unwrap();
        assert_eq!(m.end_date, Some(at(2025, 7, 10)));
    }

    #[test]
    fn suspended_or_cancelled_cannot_renew() {
        for status in [MembershipStatus::Suspended, MembershipStatus::Cancelled, MembershipStatus::Pending] {
            let mut m = membership(status);
            assert!(m.renew(1, paid(Decimal::ZERO, None), None, Utc::now()).is_err());
            assert!(m.renewal_history.0.is_empty());
        }
    }

    #[test]
    fn suspend_and_reinstate_round_trip() {
        let now = Utc::now();
        let mut m = membership(MembershipStatus::Active);
        m.suspend("Unpaid fees".into(), Some(now + Duration::days(30)), now).unwrap();
        assert_eq!(m.status, MembershipStatus::Suspended);
        assert_eq!(m.suspended_at, Some(now));

        m.reinstate().unwrap();
        assert_eq!(m.status, MembershipStatus::Active);
        assert!(m.suspension_reason.is_none());
    }

    #[test]
    fn suspend_until_must_be_in_the_future() {
        let now = Utc::now();
        let mut m = membership(MembershipStatus::Active);
        assert!(matches!(
            m.suspend("x".into(), Some(now - Duration::days(1)), now),
            Err(AppError::InvalidDateRange)
        ));
    }

    #[test]
    fn active_status_with_past_end_date_is_not_active() {
        let now = Utc::now();
        let mut m = membership(MembershipStatus::Active);
        m.end_date = Some(now - Duration::days(1));
        assert!(!m.is_active_at(now));
        m.end_date = Some(now + Duration::days(1));
        assert!(m.is_active_at(now));
    }

    #[test]
    fn cancel_is_terminal() {
        let mut m = membership(MembershipStatus::Suspended);
        m.cancel(Some("Moved away".into()), Utc::now()).unwrap();
        assert!(m.cancel(None, Utc::now()).is_err());
    }

    #[test]
    fn member_renewal_is_charged_the_prorated_price_and_left_pending() {
        let prorated = Decimal::new(3000, 2);
        let charge = RenewalCharge::resolve(None, None, prorated, false).unwrap();
        assert_eq!(charge.amount, prorated);
        assert_eq!(charge.status, PaymentStatus::Pending);

        let mut m = membership(MembershipStatus::Active);
        m.payment_status = PaymentStatus::Paid;
        m.end_date = Some(at(2027, 10, 18));
        let entry = m.renew(60, charge, Some(m.user_id), at(2026, 10, 18)).unwrap();

        assert_eq!(entry.amount, prorated);
        assert_eq!(entry.payment_status, PaymentStatus::Pending);
        assert_eq!(m.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn member_cannot_choose_renewal_amount_or_method() {
        let prorated = Decimal::new(3000, 2);
        assert!(matches!(
            RenewalCharge::resolve(Some(Decimal::ZERO), None, prorated, false),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            RenewalCharge::resolve(None, Some(PaymentMethod::Cash), prorated, false),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn admin_renewal_confirms_payment_with_explicit_amount() {
        let prorated = Decimal::new(3000, 2);
        let charge = RenewalCharge::resolve(Some(Decimal::new(2500, 2)), Some(PaymentMethod::Cash), prorated, true)
            .unwrap();
        assert_eq!(charge.amount, Decimal::new(2500, 2));
        assert_eq!(charge.status, PaymentStatus::Paid);

        let default = RenewalCharge::resolve(None, None, prorated, true).unwrap();
        assert_eq!(default.amount, prorated);
    }

    #[test]
    fn expiring_window_is_bounded() {
        let now = at(2026, 1, 1);
        assert_eq!(expiring_cutoff(now, None).unwrap(), now + Duration::days(7));
        assert_eq!(expiring_cutoff(now, Some(3650)).unwrap(), now + Duration::days(3650));
        for days in [0, -5, 3651, 100_000_000, i64::MAX] {
            assert!(matches!(expiring_cutoff(now, Some(days)), Err(AppError::ValidationError(_))));
        }
    }
}
