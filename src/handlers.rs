// src/handlers.rs

pub mod auth;
pub mod advertisements;
pub mod hero_text;
pub mod memberships;
pub mod marketplace;
pub mod notifications;
pub mod settings;
pub mod contact;
