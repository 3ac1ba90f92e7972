// src/models/marketplace.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    error::AppError,
    validation::{validate_not_negative, validate_positive},
};

/// Validade padrão, em dias, de uma oferta sem `expiresAt` explícito.
pub const OFFER_TTL_DAYS: i32 = 7;

// =============================================================================
//  CATEGORIAS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceCategory {
    pub id: Uuid,
    #[schema(example = "Boots")]
    pub name: String,
    #[schema(example = "boots")]
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 2, max = 60, message = "Name must have 2 to 60 characters."))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must have at most 500 characters."))]
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    #[validate(length(max = 500, message = "Description must have at most 500 characters."))]
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl UpdateCategoryPayload {
    pub fn apply(self, category: &mut MarketplaceCategory) {
        if let Some(v) = self.description {
            category.description = Some(v);
        }
        if let Some(v) = self.icon {
            category.icon = Some(v);
        }
        if let Some(v) = self.is_active {
            category.is_active = v;
        }
        if let Some(v) = self.sort_order {
            category.sort_order = v;
        }
    }
}

// =============================================================================
//  ITENS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "item_condition", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    New,
    LikeNew,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "item_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Available,
    Reserved,
    Sold,
    Removed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceItem {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category_id: Option<Uuid>,
    #[schema(example = "Size 5 match ball")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "25.00")]
    pub price: Decimal,
    pub condition: ItemCondition,
    pub images: Vec<String>,
    pub location: Option<String>,
    pub status: ItemStatus,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 3, max = 120, message = "Title must have 3 to 120 characters."))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description must have at most 2000 characters."))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    #[serde(default = "default_condition")]
    pub condition: ItemCondition,
    #[validate(length(max = 10, message = "At most 10 images are allowed."))]
    #[serde(default)]
    pub images: Vec<String>,
    pub location: Option<String>,
}

fn default_condition() -> ItemCondition {
    ItemCondition::Good
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    #[validate(length(min = 3, max = 120, message = "Title must have 3 to 120 characters."))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description must have at most 2000 characters."))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub condition: Option<ItemCondition>,
    #[validate(length(max = 10, message = "At most 10 images are allowed."))]
    pub images: Option<Vec<String>>,
    pub location: Option<String>,
    /// Só `available` e `removed` são aceitos; `reserved`/`sold` vêm das ofertas
    pub status: Option<ItemStatus>,
}

impl UpdateItemPayload {
    pub fn apply(self, item: &mut MarketplaceItem) -> Result<(), AppError> {
        if let Some(status) = self.status {
            // Reservado ou vendido só muda pelas ofertas
            let editable = matches!(item.status, ItemStatus::Available | ItemStatus::Removed);
            if !editable || !matches!(status, ItemStatus::Available | ItemStatus::Removed) {
                return Err(AppError::InvalidTransition {
                    from: format!("{:?}", item.status).to_lowercase(),
                    action: "set status",
                });
            }
            item.status = status;
        }
        if let Some(v) = self.title {
            item.title = v;
        }
        if let Some(v) = self.description {
            item.description = Some(v);
        }
        if let Some(v) = self.price {
            item.price = v;
        }
        if let Some(v) = self.category_id {
            item.category_id = Some(v);
        }
        if let Some(v) = self.condition {
            item.condition = v;
        }
        if let Some(v) = self.images {
            item.images = v;
        }
        if let Some(v) = self.location {
            item.location = Some(v);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Popular,
}

impl ItemSort {
    pub fn order_by(self) -> &'static str {
        match self {
            ItemSort::Newest => "created_at DESC",
            ItemSort::PriceAsc => "price ASC, created_at DESC",
            ItemSort::PriceDesc => "price DESC, created_at DESC",
            ItemSort::Popular => "views DESC, created_at DESC",
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ItemFilter {
    pub category_id: Option<Uuid>,
    pub condition: Option<ItemCondition>,
    pub status: Option<ItemStatus>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Busca no título/descrição
    pub q: Option<String>,
    #[serde(default)]
    pub sort: ItemSort,
}

/// `None` = sem limite.
pub fn listing_limit_reached(limit: Option<i32>, open_listings: i64) -> bool {
    match limit {
        Some(limit) => open_listings >= i64::from(limit),
        None => false,
    }
}

// =============================================================================
//  OFERTAS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
    Withdrawn,
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::Expired => "expired",
            OfferStatus::Withdrawn => "withdrawn",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Buyer,
    Seller,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAction {
    Accept,
    Reject,
    Counter,
    AcceptCounter,
    Withdraw,
    MarkReceived,
    Rate,
}

impl OfferAction {
    pub fn label(self) -> &'static str {
        match self {
            OfferAction::Accept => "accept",
            OfferAction::Reject => "reject",
            OfferAction::Counter => "counter",
            OfferAction::AcceptCounter => "accept-counter",
            OfferAction::Withdraw => "withdraw",
            OfferAction::MarkReceived => "mark-received",
            OfferAction::Rate => "rate",
        }
    }

    /// Quem pode executar; `None` = qualquer uma das partes.
    fn actor(self) -> Option<Party> {
        match self {
            OfferAction::Accept | OfferAction::Reject | OfferAction::Counter => Some(Party::Seller),
            OfferAction::AcceptCounter | OfferAction::Withdraw | OfferAction::MarkReceived => {
                Some(Party::Buyer)
            }
            OfferAction::Rate => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceOffer {
    pub id: Uuid,
    pub item_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    #[schema(example = "20.00")]
    pub amount: Decimal,
    pub message: Option<String>,
    pub counter_amount: Option<Decimal>,
    pub counter_message: Option<String>,
    pub status: OfferStatus,
    pub expires_at: DateTime<Utc>,
    pub is_received: bool,
    pub received_at: Option<DateTime<Utc>>,
    /// Nota dada pelo comprador ao vendedor
    pub buyer_rating: Option<i16>,
    pub buyer_review: Option<String>,
    /// Nota dada pelo vendedor ao comprador
    pub seller_rating: Option<i16>,
    pub seller_review: Option<String>,
    pub platform_fee: Option<Decimal>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketplaceOffer {
    /// Oferta pendente com prazo vencido é lida como `expired` (nada é gravado).
    pub fn effective_status(&self, now: DateTime<Utc>) -> OfferStatus {
        if self.status == OfferStatus::Pending && self.expires_at <= now {
            OfferStatus::Expired
        } else {
            self.status
        }
    }

    pub fn party_of(&self, user_id: Uuid) -> Option<Party> {
        if user_id == self.seller_id {
            Some(Party::Seller)
        } else if user_id == self.buyer_id {
            Some(Party::Buyer)
        } else {
            None
        }
    }

    /// Confere papel e estado antes de qualquer escrita.
    pub fn authorize(
        &self,
        user_id: Uuid,
        action: OfferAction,
        now: DateTime<Utc>,
    ) -> Result<Party, AppError> {
        let party = self.party_of(user_id).ok_or(AppError::Forbidden)?;
        if action.actor().is_some_and(|required| required != party) {
            return Err(AppError::Forbidden);
        }

        let status = self.effective_status(now);
        let invalid = || AppError::InvalidTransition {
            from: status.to_string(),
            action: action.label(),
        };

        match action {
            OfferAction::Accept
            | OfferAction::Reject
            | OfferAction::Counter
            | OfferAction::Withdraw => {
                if status != OfferStatus::Pending {
                    return Err(invalid());
                }
            }
            OfferAction::AcceptCounter => {
                if status != OfferStatus::Pending || self.counter_amount.is_none() {
                    return Err(invalid());
                }
            }
            OfferAction::MarkReceived => {
                if status != OfferStatus::Accepted || self.is_received {
                    return Err(invalid());
                }
            }
            OfferAction::Rate => {
                if !self.is_received {
                    return Err(invalid());
                }
                let already = match party {
                    Party::Buyer => self.buyer_rating.is_some(),
                    Party::Seller => self.seller_rating.is_some(),
                };
                if already {
                    return Err(AppError::AlreadyRated);
                }
            }
        }

        Ok(party)
    }

    /// Valor final do negócio (contraproposta, se aceita pelo comprador).
    pub fn agreed_amount(&self, action: OfferAction) -> Decimal {
        match (action, self.counter_amount) {
            (OfferAction::AcceptCounter, Some(counter)) => counter,
            _ => self.amount,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferPayload {
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    #[validate(length(max = 500, message = "Message must have at most 500 characters."))]
    pub message: Option<String>,
    /// Opcional; padrão = agora + 7 dias
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CounterOfferPayload {
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    #[validate(length(max = 500, message = "Message must have at most 500 characters."))]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateOfferPayload {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i16,
    #[validate(length(max = 1000, message = "Review must have at most 1000 characters."))]
    pub review: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct OfferFilter {
    pub status: Option<OfferStatus>,
    pub item_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OfferBulkAction {
    Delete,
    /// Grava `expired` nas pendentes já vencidas
    Expire,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferBulkPayload {
    pub action: OfferBulkAction,
    #[validate(length(min = 1, message = "At least one id is required."))]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferStatusCount {
    pub status: OfferStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferAnalytics {
    pub total: i64,
    pub by_status: Vec<OfferStatusCount>,
    pub accepted_volume: Decimal,
    pub total_platform_fees: Decimal,
    pub received_count: i64,
    pub average_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn offer() -> MarketplaceOffer {
        let now = Utc::now();
        MarketplaceOffer {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            amount: Decimal::new(2000, 2),
            message: None,
            counter_amount: None,
            counter_message: None,
            status: OfferStatus::Pending,
            expires_at: now + Duration::days(i64::from(OFFER_TTL_DAYS)),
            is_received: false,
            received_at: None,
            buyer_rating: None,
            buyer_review: None,
            seller_rating: None,
            seller_review: None,
            platform_fee: None,
            responded_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_seller_can_accept() {
        let o = offer();
        let now = Utc::now();
        assert_eq!(o.authorize(o.seller_id, OfferAction::Accept, now).unwrap(), Party::Seller);
        assert!(matches!(
            o.authorize(o.buyer_id, OfferAction::Accept, now),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            o.authorize(Uuid::new_v4(), OfferAction::Accept, now),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn expired_pending_offer_cannot_be_accepted() {
        let mut o = offer();
        let now = Utc::now();
        o.expires_at = now - Duration::minutes(1);

        assert_eq!(o.effective_status(now), OfferStatus::Expired);
        assert!(matches!(
            o.authorize(o.seller_id, OfferAction::Accept, now),
            Err(AppError::InvalidTransition { action: "accept", .. })
        ));
    }

    #[test]
    fn terminal_states_reject_further_responses() {
        let now = Utc::now();
        for status in [OfferStatus::Accepted, OfferStatus::Rejected, OfferStatus::Withdrawn] {
            let mut o = offer();
            o.status = status;
            assert!(o.authorize(o.seller_id, OfferAction::Reject, now).is_err());
            assert!(o.authorize(o.buyer_id, OfferAction::Withdraw, now).is_err());
        }
    }

    #[test]
    fn accept_counter_requires_a_counter() {
        let now = Utc::now();
        let mut o = offer();
        assert!(o.authorize(o.buyer_id, OfferAction::AcceptCounter, now).is_err());

        o.counter_amount = Some(Decimal::new(2500, 2));
        assert!(o.authorize(o.buyer_id, OfferAction::AcceptCounter, now).is_ok());
        assert_eq!(o.agreed_amount(OfferAction::AcceptCounter), Decimal::new(2500, 2));
        assert_eq!(o.agreed_amount(OfferAction::Accept), Decimal::new(2000, 2));
    }

    #[test]
    fn received_only_after_acceptance_and_once() {
        let now = Utc::now();
        let mut o = offer();
        assert!(o.authorize(o.buyer_id, OfferAction::MarkReceived, now).is_err());

        o.status = OfferStatus::Accepted;
        assert!(o.authorize(o.buyer_id, OfferAction::MarkReceived, now).is_ok());
        assert!(o.authorize(o.seller_id, OfferAction::MarkReceived, now).is_err());

        o.is_received = true;
        assert!(o.authorize(o.buyer_id, OfferAction::MarkReceived, now).is_err());
    }

    #[test]
    fn accepted_offer_past_expiry_is_still_accepted() {
        let now = Utc::now();
        let mut o = offer();
        o.status = OfferStatus::Accepted;
        o.expires_at = now - Duration::days(1);
        assert_eq!(o.effective_status(now), OfferStatus::Accepted);
    }

    #[test]
    fn each_party_rates_once() {
        let now = Utc::now();
        let mut o = offer();
        o.status = OfferStatus::Accepted;
        assert!(o.authorize(o.buyer_id, OfferAction::Rate, now).is_err());

        o.is_received = true;
        assert_eq!(o.authorize(o.buyer_id, OfferAction::Rate, now).unwrap(), Party::Buyer);
        o.buyer_rating = Some(5);
        assert!(matches!(
            o.authorize(o.buyer_id, OfferAction::Rate, now),
            Err(AppError::AlreadyRated)
        ));
        assert_eq!(o.authorize(o.seller_id, OfferAction::Rate, now).unwrap(), Party::Seller);
    }

    #[test]
    fn listing_limits() {
        assert!(!listing_limit_reached(None, 1_000));
        assert!(!listing_limit_reached(Some(3), 2));
        assert!(listing_limit_reached(Some(3), 3));
        assert!(listing_limit_reached(Some(0), 0));
    }

    fn item(status: ItemStatus) -> MarketplaceItem {
        let now = Utc::now();
        MarketplaceItem {
            id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            category_id: None,
            title: "Shin guards".into(),
            description: None,
            price: Decimal::new(1000, 2),
            condition: ItemCondition::Good,
            images: vec![],
            location: None,
            status,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn set_status(status: ItemStatus) -> UpdateItemPayload {
        UpdateItemPayload {
            status: Some(status),
            ..Default::default()
        }
    }

    #[test]
    fn owner_cannot_force_sold_status() {
        let mut item = item(ItemStatus::Available);
        assert!(set_status(ItemStatus::Sold).apply(&mut item).is_err());
        assert_eq!(item.status, ItemStatus::Available);
    }

    #[test]
    fn reserved_item_cannot_be_relisted_or_removed_by_its_seller() {
        for target in [ItemStatus::Available, ItemStatus::Removed] {
            let mut reserved = item(ItemStatus::Reserved);
            assert!(matches!(
                set_status(target).apply(&mut reserved),
                Err(AppError::InvalidTransition { action: "set status", .. })
            ));
            assert_eq!(reserved.status, ItemStatus::Reserved);
        }

        let mut sold = item(ItemStatus::Sold);
        assert!(set_status(ItemStatus::Available).apply(&mut sold).is_err());
    }

    #[test]
    fn available_and_removed_toggle_freely() {
        let mut listing = item(ItemStatus::Available);
        set_status(ItemStatus::Removed).apply(&mut listing).unwrap();
        assert_eq!(listing.status, ItemStatus::Removed);
        set_status(ItemStatus::Available).apply(&mut listing).unwrap();
        assert_eq!(listing.status, ItemStatus::Available);
    }

    #[test]
    fn reserved_item_still_accepts_text_edits() {
        let mut reserved = item(ItemStatus::Reserved);
        let payload = UpdateItemPayload {
            title: Some("Shin guards (size M)".into()),
            ..Default::default()
        };
        payload.apply(&mut reserved).unwrap();
        assert_eq!(reserved.title, "Shin guards (size M)");
    }
}
