// src/services/marketplace_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, slug::slug_for_name},
    db::{MarketplaceRepository, MembershipRepository, SettingsRepository},
    models::{
        auth::Principal,
        bulk::BulkResponse,
        marketplace::{
            listing_limit_reached, CounterOfferPayload, CreateCategoryPayload,
            CreateItemPayload, CreateOfferPayload, ItemFilter, ItemStatus, MarketplaceCategory,
            MarketplaceItem, MarketplaceOffer, OfferAction, OfferAnalytics, OfferBulkAction,
            OfferBulkPayload, OfferFilter, Party, RateOfferPayload, UpdateCategoryPayload,
            UpdateItemPayload,
        },
        notification::{NewNotification, NotificationKind},
    },
    services::notification_service::NotificationService,
};

#[derive(Clone)]
pub struct MarketplaceService {
    repo: MarketplaceRepository,
    membership_repo: MembershipRepository,
    settings_repo: SettingsRepository,
    notifications: NotificationService,
    pool: PgPool,
}

impl MarketplaceService {
    pub fn new(
        repo: MarketplaceRepository,
        membership_repo: MembershipRepository,
        settings_repo: SettingsRepository,
        notifications: NotificationService,
        pool: PgPool,
    ) -> Self {
        Self { repo, membership_repo, settings_repo, notifications, pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self, only_active: bool) -> Result<Vec<MarketplaceCategory>, AppError> {
        self.repo.list_categories(only_active).await
    }

    pub async fn create_category(&self, payload: CreateCategoryPayload) -> Result<MarketplaceCategory, AppError> {
        let slug = slug_for_name(&payload.name)?;
        self.repo.create_category(&payload, &slug).await
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        payload: UpdateCategoryPayload,
    ) -> Result<MarketplaceCategory, AppError> {
        let mut category = self
            .repo
            .find_category(id)
            .await?
            .ok_or(AppError::NotFound("category"))?;
        payload.apply(&mut category);
        self.repo.update_category(&category).await
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_category(id).await? {
            return Err(AppError::NotFound("category"));
        }
        Ok(())
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<MarketplaceItem>, AppError> {
        self.repo.list_items(filter).await
    }

    pub async fn my_items(&self, actor: &Principal) -> Result<Vec<MarketplaceItem>, AppError> {
        self.repo.list_items_by_seller(actor.id).await
    }

    /// Leitura pública: conta uma visualização em segundo plano.
    pub async fn view_item(&self, id: Uuid) -> Result<MarketplaceItem, AppError> {
        let item = self.get_item(id).await?;
        let repo = self.repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.increment_item_views(id).await {
                tracing::warn!("⚠️ Falha ao contar visualização do item {}: {}", id, e);
            }
        });
        Ok(item)
    }

    async fn get_item(&self, id: Uuid) -> Result<MarketplaceItem, AppError> {
        self.repo.find_item(id).await?.ok_or(AppError::NotFound("item"))
    }

    /// Limite do plano ativo; sem associação ativa, vale o limite gratuito.
    async fn listing_limit_for(&self, user_id: Uuid) -> Result<Option<i32>, AppError> {
        match self.membership_repo.active_tier_for_user(user_id).await? {
            Some(tier) => Ok(tier.listing_limit),
            None => Ok(Some(self.settings_repo.get_fee_config().await?.free_listing_limit)),
        }
    }

    pub async fn create_item(&self, payload: CreateItemPayload, actor: &Principal) -> Result<MarketplaceItem, AppError> {
        if let Some(category_id) = payload.category_id {
            self.repo
                .find_category(category_id)
                .await?
                .ok_or(AppError::NotFound("category"))?;
        }

        let limit = self.listing_limit_for(actor.id).await?;
        let open_listings = self.repo.count_open_listings(actor.id).await?;
        if listing_limit_reached(limit, open_listings) {
            return Err(AppError::ListingLimitReached(limit.unwrap_or_default()));
        }

        let item = self.repo.create_item(actor.id, &payload).await?;
        tracing::info!("🛒 Item {} anunciado por {}", item.id, actor.id);
        Ok(item)
    }

    fn ensure_owner(item: &MarketplaceItem, actor: &Principal) -> Result<(), AppError> {
        if item.seller_id != actor.id && !actor.role.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    pub async fn update_item(
        &self,
        id: Uuid,
        payload: UpdateItemPayload,
        actor: &Principal,
    ) -> Result<MarketplaceItem, AppError> {
        let mut item = self.get_item(id).await?;
        Self::ensure_owner(&item, actor)?;
        payload.apply(&mut item)?;
        self.repo.update_item(&item).await
    }

    pub async fn delete_item(&self, id: Uuid, actor: &Principal) -> Result<(), AppError> {
        let item = self.get_item(id).await?;
        Self::ensure_owner(&item, actor)?;
        // Apagar levaria junto a oferta aceita que ainda aguarda a entrega
        if item.status == ItemStatus::Reserved {
            return Err(AppError::InvalidTransition {
                from: "reserved".to_string(),
                action: "delete",
            });
        }
        self.repo.delete_item(id).await?;
        Ok(())
    }

    // =========================================================================
    //  OFERTAS
    // =========================================================================

    pub async fn create_offer(
        &self,
        item_id: Uuid,
        payload: CreateOfferPayload,
        actor: &Principal,
    ) -> Result<MarketplaceOffer, AppError> {
        let item = self.get_item(item_id).await?;
        if item.seller_id == actor.id {
            return Err(AppError::OwnItemOffer);
        }
        if item.status != ItemStatus::Available {
            return Err(AppError::ItemUnavailable);
        }

        if payload.expires_at.is_some_and(|at| at <= Utc::now()) {
            return Err(AppError::InvalidDateRange);
        }

        let offer = self
            .repo
            .create_offer(&item, actor.id, payload.amount, payload.message.as_deref(), payload.expires_at)
            .await?;

        tracing::info!("🤝 Oferta {} de {} no item {}", offer.id, actor.id, item.id);
        self.notify(
            &offer,
            Party::Seller,
            NotificationKind::OfferReceived,
            "New offer",
            format!("You received an offer of {} for \"{}\".", offer.amount, item.title),
        )
        .await;
        Ok(offer)
    }

    pub async fn get_offer(&self, id: Uuid, actor: &Principal) -> Result<MarketplaceOffer, AppError> {
        let offer = self.find_offer(id).await?;
        if offer.party_of(actor.id).is_none() && !actor.role.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(offer)
    }

    async fn find_offer(&self, id: Uuid) -> Result<MarketplaceOffer, AppError> {
        self.repo.find_offer(id).await?.ok_or(AppError::NotFound("offer"))
    }

    pub async fn sent_offers(&self, actor: &Principal) -> Result<Vec<MarketplaceOffer>, AppError> {
        self.repo.list_offers_by_buyer(actor.id).await
    }

    pub async fn received_offers(&self, actor: &Principal) -> Result<Vec<MarketplaceOffer>, AppError> {
        self.repo.list_offers_by_seller(actor.id).await
    }

    pub async fn list_offers(&self, filter: &OfferFilter) -> Result<Vec<MarketplaceOffer>, AppError> {
        self.repo.list_offers(filter).await
    }

    /// Carrega a oferta e confere papel + estado antes de qualquer escrita.
    async fn authorized(
        &self,
        id: Uuid,
        actor: &Principal,
        action: OfferAction,
    ) -> Result<(MarketplaceOffer, Party), AppError> {
        let offer = self.find_offer(id).await?;
        let party = offer.authorize(actor.id, action, Utc::now())?;
        Ok((offer, party))
    }

    /// Aceite pelo vendedor (valor original) ou pelo comprador (contraproposta).
    /// Na mesma transação: reserva o item (só se ainda disponível) e recusa as demais pendentes.
    async fn close_deal(
        &self,
        id: Uuid,
        actor: &Principal,
        action: OfferAction,
    ) -> Result<(MarketplaceOffer, Vec<MarketplaceOffer>), AppError> {
        let (offer, _) = self.authorized(id, actor, action).await?;
        let agreed = offer.agreed_amount(action);

        let discount = self
            .membership_repo
            .active_tier_for_user(offer.seller_id)
            .await?
            .map(|tier| tier.discount_percentage)
            .unwrap_or(Decimal::ZERO);
        let fee = self.settings_repo.get_fee_config().await?.platform_fee(agreed, discount);

        let mut tx = self.pool.begin().await?;
        let accepted = self
            .repo
            .accept_offer(&mut *tx, id, agreed, fee)
            .await?
            .ok_or(AppError::ConcurrentModification)?;
        if !self.repo.reserve_item(&mut *tx, accepted.item_id).await? {
            // Sem commit: o aceite acima é desfeito
            return Err(AppError::ItemUnavailable);
        }
        let declined = self
            .repo
            .reject_pending_siblings(&mut *tx, accepted.item_id, accepted.id)
            .await?;
        tx.commit().await?;

        tracing::info!(
            "✅ Oferta {} aceita por {} (taxa {}); {} outras recusadas",
            id,
            agreed,
            fee,
            declined.len()
        );
        Ok((accepted, declined))
    }

    async fn notify_declined(&self, declined: &[MarketplaceOffer]) {
        for offer in declined {
            self.notify(
                offer,
                Party::Buyer,
                NotificationKind::OfferRejected,
                "Offer rejected",
                "The item was sold to another buyer.".to_string(),
            )
            .await;
        }
    }

    pub async fn accept_offer(&self, id: Uuid, actor: &Principal) -> Result<MarketplaceOffer, AppError> {
        let (offer, declined) = self.close_deal(id, actor, OfferAction::Accept).await?;
        self.notify_declined(&declined).await;
        self.notify(
            &offer,
            Party::Buyer,
            NotificationKind::OfferAccepted,
            "Offer accepted",
            format!("Your offer of {} was accepted.", offer.amount),
        )
        .await;
        Ok(offer)
    }

    pub async fn accept_counter(&self, id: Uuid, actor: &Principal) -> Result<MarketplaceOffer, AppError> {
        let (offer, declined) = self.close_deal(id, actor, OfferAction::AcceptCounter).await?;
        self.notify_declined(&declined).await;
        self.notify(
            &offer,
            Party::Seller,
            NotificationKind::OfferAccepted,
            "Counter-offer accepted",
            format!("The buyer accepted your counter-offer of {}.", offer.amount),
        )
        .await;
        Ok(offer)
    }

    pub async fn reject_offer(&self, id: Uuid, actor: &Principal) -> Result<MarketplaceOffer, AppError> {
        self.authorized(id, actor, OfferAction::Reject).await?;
        let offer = self
            .repo
            .reject_offer(id)
            .await?
            .ok_or(AppError::ConcurrentModification)?;

        self.notify(
            &offer,
            Party::Buyer,
            NotificationKind::OfferRejected,
            "Offer rejected",
            format!("Your offer of {} was rejected.", offer.amount),
        )
        .await;
        Ok(offer)
    }

    pub async fn counter_offer(
        &self,
        id: Uuid,
        payload: CounterOfferPayload,
        actor: &Principal,
    ) -> Result<MarketplaceOffer, AppError> {
        self.authorized(id, actor, OfferAction::Counter).await?;
        let offer = self
            .repo
            .counter_offer(id, payload.amount, payload.message.as_deref())
            .await?
            .ok_or(AppError::ConcurrentModification)?;

        self.notify(
            &offer,
            Party::Buyer,
            NotificationKind::OfferCountered,
            "Counter-offer received",
            format!("The seller countered with {}.", payload.amount),
        )
        .await;
        Ok(offer)
    }

    pub async fn withdraw_offer(&self, id: Uuid, actor: &Principal) -> Result<MarketplaceOffer, AppError> {
        self.authorized(id, actor, OfferAction::Withdraw).await?;
        let offer = self
            .repo
            .withdraw_offer(id)
            .await?
            .ok_or(AppError::ConcurrentModification)?;

        self.notify(
            &offer,
            Party::Seller,
            NotificationKind::OfferWithdrawn,
            "Offer withdrawn",
            "The buyer withdrew their offer.".to_string(),
        )
        .await;
        Ok(offer)
    }

    /// Comprador confirma o recebimento; o item passa a vendido.
    pub async fn mark_received(&self, id: Uuid, actor: &Principal) -> Result<MarketplaceOffer, AppError> {
        self.authorized(id, actor, OfferAction::MarkReceived).await?;

        let mut tx = self.pool.begin().await?;
        let offer = self
            .repo
            .mark_offer_received(&mut *tx, id)
            .await?
            .ok_or(AppError::ConcurrentModification)?;
        if !self.repo.mark_item_sold(&mut *tx, offer.item_id).await? {
            return Err(AppError::ItemUnavailable);
        }
        tx.commit().await?;

        self.notify(
            &offer,
            Party::Seller,
            NotificationKind::ItemReceived,
            "Item received",
            "The buyer confirmed they received the item.".to_string(),
        )
        .await;
        Ok(offer)
    }

    pub async fn rate_offer(
        &self,
        id: Uuid,
        payload: RateOfferPayload,
        actor: &Principal,
    ) -> Result<MarketplaceOffer, AppError> {
        let (_, party) = self.authorized(id, actor, OfferAction::Rate).await?;
        let review = payload.review.as_deref();

        let (updated, counterpart) = match party {
            Party::Buyer => (self.repo.rate_as_buyer(id, payload.rating, review).await?, Party::Seller),
            Party::Seller => (self.repo.rate_as_seller(id, payload.rating, review).await?, Party::Buyer),
        };
        let offer = updated.ok_or(AppError::AlreadyRated)?;

        self.notify(
            &offer,
            counterpart,
            NotificationKind::RatingReceived,
            "New rating",
            format!("You received a {}-star rating.", payload.rating),
        )
        .await;
        Ok(offer)
    }

    // Gravada depois da transição, fora da transação
    async fn notify(
        &self,
        offer: &MarketplaceOffer,
        recipient: Party,
        kind: NotificationKind,
        title: &str,
        body: String,
    ) {
        let user_id = match recipient {
            Party::Buyer => offer.buyer_id,
            Party::Seller => offer.seller_id,
        };
        let notification = NewNotification::new(user_id, kind, title, body)
            .with_link(format!("/marketplace/offers/{}", offer.id));
        self.notifications.notify(notification).await;
    }

    pub async fn bulk_offers(&self, payload: OfferBulkPayload) -> Result<BulkResponse, AppError> {
        let affected = match payload.action {
            OfferBulkAction::Delete => self.repo.bulk_delete_offers(&payload.ids).await?,
            OfferBulkAction::Expire => self.repo.bulk_expire_offers(&payload.ids).await?,
        };
        tracing::info!("📦 Operação em lote {:?} em ofertas: {} afetadas", payload.action, affected);
        Ok(BulkResponse::affected(affected))
    }

    pub async fn offer_analytics(&self) -> Result<OfferAnalytics, AppError> {
        let totals = self.repo.offer_totals().await?;
        Ok(OfferAnalytics {
            total: totals.total,
            by_status: self.repo.count_offers_by_status().await?,
            accepted_volume: totals.accepted_volume,
            total_platform_fees: totals.total_platform_fees,
            received_count: totals.received_count,
            average_rating: self.repo.average_rating().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            auth::UserRole,
            marketplace::{ItemCondition, OfferStatus, OFFER_TTL_DAYS},
        },
        test_support,
    };

    fn item_payload(title: &str) -> CreateItemPayload {
        CreateItemPayload {
            title: title.into(),
            description: None,
            price: Decimal::new(2500, 2),
            category_id: None,
            condition: ItemCondition::Good,
            images: vec![],
            location: None,
        }
    }

    fn offer_payload(cents: i64) -> CreateOfferPayload {
        CreateOfferPayload { amount: Decimal::new(cents, 2), message: None, expires_at: None }
    }

    fn set_status(status: ItemStatus) -> UpdateItemPayload {
        UpdateItemPayload { status: Some(status), ..Default::default() }
    }

    #[tokio::test]
    async fn accepting_one_offer_declines_the_others_on_the_same_item() {
        let Some(db) = test_support::init_test_db().await else { return };
        let service = db.state().marketplace_service;
        let seller = db.principal(UserRole::Member).await;
        let first_buyer = db.principal(UserRole::Member).await;
        let second_buyer = db.principal(UserRole::Member).await;

        let item = service.create_item(item_payload("Match ball"), &seller).await.unwrap();
        let first = service.create_offer(item.id, offer_payload(2000), &first_buyer).await.unwrap();
        let second = service.create_offer(item.id, offer_payload(2200), &second_buyer).await.unwrap();

        let accepted = service.accept_offer(first.id, &seller).await.unwrap();
        assert_eq!(accepted.status, OfferStatus::Accepted);

        let declined = service.repo.find_offer(second.id).await.unwrap().unwrap();
        assert_eq!(declined.status, OfferStatus::Rejected);
        assert!(service.accept_offer(second.id, &seller).await.is_err());

        let reserved = service.get_item(item.id).await.unwrap();
        assert_eq!(reserved.status, ItemStatus::Reserved);
    }

    #[tokio::test]
    async fn offer_on_a_removed_item_cannot_be_accepted() {
        let Some(db) = test_support::init_test_db().await else { return };
        let service = db.state().marketplace_service;
        let seller = db.principal(UserRole::Member).await;
        let buyer = db.principal(UserRole::Member).await;

        let item = service.create_item(item_payload("Shin guards"), &seller).await.unwrap();
        let offer = service.create_offer(item.id, offer_payload(1500), &buyer).await.unwrap();
        service.update_item(item.id, set_status(ItemStatus::Removed), &seller).await.unwrap();

        let err = service.accept_offer(offer.id, &seller).await.unwrap_err();
        assert!(matches!(err, AppError::ItemUnavailable));

        // O aceite foi desfeito junto com a reserva
        let untouched = service.repo.find_offer(offer.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, OfferStatus::Pending);
        assert_eq!(service.get_item(item.id).await.unwrap().status, ItemStatus::Removed);
    }

    #[tokio::test]
    async fn reserved_item_is_sold_exactly_once() {
        let Some(db) = test_support::init_test_db().await else { return };
        let service = db.state().marketplace_service;
        let seller = db.principal(UserRole::Member).await;
        let buyer = db.principal(UserRole::Member).await;

        let item = service.create_item(item_payload("Goal nets"), &seller).await.unwrap();
        let offer = service.create_offer(item.id, offer_payload(2500), &buyer).await.unwrap();
        service.accept_offer(offer.id, &seller).await.unwrap();

        let relist = service.update_item(item.id, set_status(ItemStatus::Available), &seller).await;
        assert!(matches!(relist, Err(AppError::InvalidTransition { .. })));
        let delete = service.delete_item(item.id, &seller).await;
        assert!(matches!(delete, Err(AppError::InvalidTransition { .. })));

        let received = service.mark_received(offer.id, &buyer).await.unwrap();
        assert!(received.is_received);
        assert!(service.mark_received(offer.id, &buyer).await.is_err());
        assert_eq!(service.get_item(item.id).await.unwrap().status, ItemStatus::Sold);
    }

    #[tokio::test]
    async fn free_listing_limit_counts_open_items_only() {
        let Some(db) = test_support::init_test_db().await else { return };
        let service = db.state().marketplace_service;
        let seller = db.principal(UserRole::Member).await;

        let mut items = Vec::new();
        for n in 0..3 {
            items.push(service.create_item(item_payload(&format!("Jersey {n}")), &seller).await.unwrap());
        }
        let err = service.create_item(item_payload("Jersey 3"), &seller).await.unwrap_err();
        assert!(matches!(err, AppError::ListingLimitReached(3)));

        service.update_item(items[0].id, set_status(ItemStatus::Removed), &seller).await.unwrap();
        service.create_item(item_payload("Jersey 3"), &seller).await.unwrap();
    }

    #[tokio::test]
    async fn default_offer_expiry_follows_the_database_clock() {
        let Some(db) = test_support::init_test_db().await else { return };
        let service = db.state().marketplace_service;
        let seller = db.principal(UserRole::Member).await;
        let buyer = db.principal(UserRole::Member).await;

        let item = service.create_item(item_payload("Cones"), &seller).await.unwrap();
        let offer = service.create_offer(item.id, offer_payload(500), &buyer).await.unwrap();
        assert_eq!(offer.expires_at - offer.created_at, chrono::Duration::days(i64::from(OFFER_TTL_DAYS)));

        let past = CreateOfferPayload {
            expires_at: Some(Utc::now() - chrono::Duration::hours(1)),
            ..offer_payload(600)
        };
        let err = service.create_offer(item.id, past, &buyer).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange));
    }
}
