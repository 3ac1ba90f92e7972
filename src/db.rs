// src/db.rs

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod advertisement_repo;
pub use advertisement_repo::AdvertisementRepository;
pub mod hero_text_repo;
pub use hero_text_repo::HeroTextRepository;
pub mod membership_repo;
pub use membership_repo::MembershipRepository;
pub mod marketplace_repo;
pub use marketplace_repo::MarketplaceRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod contact_repo;
pub use contact_repo::ContactRepository;
