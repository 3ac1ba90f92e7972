// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::list_users,
        handlers::auth::update_user_role,

        // --- ADVERTISEMENTS ---
        handlers::advertisements::list_public,
        handlers::advertisements::list_featured,
        handlers::advertisements::record_click,
        handlers::advertisements::list_advertisements,
        handlers::advertisements::get_advertisement,
        handlers::advertisements::create_advertisement,
        handlers::advertisements::update_advertisement,
        handlers::advertisements::delete_advertisement,
        handlers::advertisements::bulk_advertisements,
        handlers::advertisements::advertisement_analytics,

        // --- Hero Text ---
        handlers::hero_text::get_public_hero_text,
        handlers::hero_text::get_hero_text,
        handlers::hero_text::update_hero_text,

        // --- MEMBERSHIPS ---
        handlers::memberships::list_public_tiers,
        handlers::memberships::list_tiers,
        handlers::memberships::get_tier,
        handlers::memberships::create_tier,
        handlers::memberships::update_tier,
        handlers::memberships::delete_tier,
        handlers::memberships::create_membership,
        handlers::memberships::my_membership,
        handlers::memberships::get_membership,
        handlers::memberships::renew_membership,
        handlers::memberships::cancel_membership,
        handlers::memberships::list_memberships,
        handlers::memberships::update_membership,
        handlers::memberships::delete_membership,
        handlers::memberships::activate_membership,
        handlers::memberships::suspend_membership,
        handlers::memberships::reinstate_membership,
        handlers::memberships::expiring_memberships,
        handlers::memberships::expire_overdue,
        handlers::memberships::bulk_memberships,
        handlers::memberships::membership_analytics,

        // --- MARKETPLACE ---
        handlers::marketplace::list_categories,
        handlers::marketplace::list_all_categories,
        handlers::marketplace::create_category,
        handlers::marketplace::update_category,
        handlers::marketplace::delete_category,
        handlers::marketplace::list_items,
        handlers::marketplace::get_item,
        handlers::marketplace::my_items,
        handlers::marketplace::create_item,
        handlers::marketplace::update_item,
        handlers::marketplace::delete_item,
        handlers::marketplace::create_offer,
        handlers::marketplace::sent_offers,
        handlers::marketplace::received_offers,
        handlers::marketplace::get_offer,
        handlers::marketplace::accept_offer,
        handlers::marketplace::reject_offer,
        handlers::marketplace::counter_offer,
        handlers::marketplace::accept_counter,
        handlers::marketplace::withdraw_offer,
        handlers::marketplace::mark_received,
        handlers::marketplace::rate_offer,
        handlers::marketplace::list_offers,
        handlers::marketplace::bulk_offers,
        handlers::marketplace::offer_analytics,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,
        handlers::notifications::delete_notification,
        handlers::notifications::broadcast,

        // --- Settings ---
        handlers::settings::get_fee_config,
        handlers::settings::update_fee_config,

        // --- Contact ---
        handlers::contact::create_contact_message,
        handlers::contact::list_contact_messages,
        handlers::contact::update_contact_status,
        handlers::contact::delete_contact_message,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateRolePayload,
            models::auth::AuthResponse,

            models::bulk::BulkResponse,

            // --- Advertisements ---
            models::advertisement::AdPosition,
            models::advertisement::Advertisement,
            models::advertisement::CreateAdvertisementPayload,
            models::advertisement::UpdateAdvertisementPayload,
            models::advertisement::AdvertisementBulkAction,
            models::advertisement::AdvertisementBulkPayload,
            models::advertisement::AdvertisementBulkData,
            models::advertisement::PositionCount,
            models::advertisement::AdvertisementStats,
            models::advertisement::AdvertisementAnalytics,

            // --- Hero Text ---
            models::hero_text::TextAlignment,
            models::hero_text::HeroTextSettings,
            models::hero_text::UpdateHeroTextPayload,

            // --- Memberships ---
            models::membership::MembershipStatus,
            models::membership::PaymentStatus,
            models::membership::PaymentMethod,
            models::membership::MembershipTier,
            models::membership::CreateTierPayload,
            models::membership::UpdateTierPayload,
            models::membership::RenewalEntry,
            models::membership::Membership,
            models::membership::MembershipDetail,
            models::membership::CreateMembershipPayload,
            models::membership::UpdateMembershipPayload,
            models::membership::ActivateMembershipPayload,
            models::membership::RenewMembershipPayload,
            models::membership::SuspendMembershipPayload,
            models::membership::CancelMembershipPayload,
            models::membership::MembershipBulkAction,
            models::membership::MembershipBulkPayload,
            models::membership::StatusCount,
            models::membership::TierBreakdown,
            models::membership::MembershipAnalytics,

            // --- Marketplace ---
            models::marketplace::MarketplaceCategory,
            models::marketplace::CreateCategoryPayload,
            models::marketplace::UpdateCategoryPayload,
            models::marketplace::ItemCondition,
            models::marketplace::ItemStatus,
            models::marketplace::ItemSort,
            models::marketplace::MarketplaceItem,
            models::marketplace::CreateItemPayload,
            models::marketplace::UpdateItemPayload,
            models::marketplace::OfferStatus,
            models::marketplace::MarketplaceOffer,
            models::marketplace::CreateOfferPayload,
            models::marketplace::CounterOfferPayload,
            models::marketplace::RateOfferPayload,
            models::marketplace::OfferBulkAction,
            models::marketplace::OfferBulkPayload,
            models::marketplace::OfferStatusCount,
            models::marketplace::OfferAnalytics,

            // --- Notifications ---
            models::notification::NotificationKind,
            models::notification::Notification,
            models::notification::UnreadCount,
            models::notification::BroadcastPayload,

            // --- Settings ---
            models::settings::FeeConfig,
            models::settings::UpdateFeeConfigPayload,

            // --- Contact ---
            models::contact::ContactStatus,
            models::contact::ContactMessage,
            models::contact::CreateContactPayload,
            models::contact::UpdateContactStatusPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Usuários e Papéis"),
        (name = "Advertisements", description = "Anúncios do Site"),
        (name = "Hero Text", description = "Banner da Página Inicial"),
        (name = "Membership Tiers", description = "Planos de Associação"),
        (name = "Memberships", description = "Associações e Ciclo de Vida"),
        (name = "Marketplace", description = "Categorias, Itens e Ofertas"),
        (name = "Notifications", description = "Caixa de Notificações"),
        (name = "Settings", description = "Taxas da Plataforma"),
        (name = "Contact", description = "Mensagens de Contato")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_guarded_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/marketplace/offers/{id}/accept"));
        assert!(doc.paths.paths.contains_key("/api/memberships/{id}/renew"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
