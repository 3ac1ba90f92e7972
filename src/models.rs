// src/models.rs

pub mod advertisement;
pub mod auth;
pub mod bulk;
pub mod contact;
pub mod hero_text;
pub mod marketplace;
pub mod membership;
pub mod notification;
pub mod settings;
