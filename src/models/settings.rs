// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_not_negative, validate_percentage};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfig {
    #[schema(example = "5.00")]
    pub marketplace_commission_percent: Decimal,
    #[schema(example = "0.00")]
    pub listing_fee: Decimal,
    #[schema(example = "0.00")]
    pub membership_processing_fee: Decimal,
    /// Anúncios abertos permitidos para quem não tem associação ativa
    #[schema(example = 3)]
    pub free_listing_limit: i32,
    #[schema(example = "USD")]
    pub currency: String,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            marketplace_commission_percent: Decimal::new(5, 0),
            listing_fee: Decimal::ZERO,
            membership_processing_fee: Decimal::ZERO,
            free_listing_limit: 3,
            currency: "USD".to_string(),
            updated_by: None,
            updated_at: None,
        }
    }
}

impl FeeConfig {
    /// Comissão sobre `amount`, já com o desconto do plano (em %) aplicado.
    pub fn platform_fee(&self, amount: Decimal, discount_percent: Decimal) -> Decimal {
        let discount = discount_percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        let fee = amount * self.marketplace_commission_percent / Decimal::ONE_HUNDRED
            * (Decimal::ONE_HUNDRED - discount)
            / Decimal::ONE_HUNDRED;
        fee.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeeConfigPayload {
    #[validate(custom(function = "validate_percentage"))]
    pub marketplace_commission_percent: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub listing_fee: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub membership_processing_fee: Option<Decimal>,
    #[validate(range(min = 0, message = "Limit must not be negative."))]
    pub free_listing_limit: Option<i32>,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code."))]
    pub currency: Option<String>,
}

impl UpdateFeeConfigPayload {
    pub fn apply(self, config: &mut FeeConfig) {
        if let Some(v) = self.marketplace_commission_percent {
            config.marketplace_commission_percent = v;
        }
        if let Some(v) = self.listing_fee {
            config.listing_fee = v;
        }
        if let Some(v) = self.membership_processing_fee {
            config.membership_processing_fee = v;
        }
        if let Some(v) = self.free_listing_limit {
            config.free_listing_limit = v;
        }
        if let Some(v) = self.currency {
            config.currency = v.to_uppercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_without_discount() {
        let config = FeeConfig::default();
        assert_eq!(config.platform_fee(Decimal::new(2000, 2), Decimal::ZERO), Decimal::new(100, 2));
    }

    #[test]
    fn fee_with_tier_discount_is_rounded() {
        let config = FeeConfig::default();
        // 33.33 * 5% = 1.6665; 50% de desconto = 0.83325
        let fee = config.platform_fee(Decimal::new(3333, 2), Decimal::new(50, 0));
        assert_eq!(fee, Decimal::new(83, 2));
    }

    #[test]
    fn full_discount_means_no_fee() {
        let config = FeeConfig::default();
        let fee = config.platform_fee(Decimal::new(10000, 2), Decimal::new(150, 0));
        assert!(fee.is_zero());
    }

    #[test]
    fn currency_is_normalized_and_checked() {
        let mut config = FeeConfig::default();
        UpdateFeeConfigPayload {
            currency: Some("eur".into()),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.currency, "EUR");

        let bad = UpdateFeeConfigPayload {
            marketplace_commission_percent: Some(Decimal::new(101, 0)),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
