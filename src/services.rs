// src/services.rs

pub mod advertisement_service;
pub mod auth;
pub mod marketplace_service;
pub mod membership_service;
pub mod notification_service;
pub mod settings_service;
