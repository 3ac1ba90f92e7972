// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Todos os erros da aplicação passam por aqui.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Nome já existe: {0}")]
    DuplicateName(String),

    #[error("Slug já existe: {0}")]
    DuplicateSlug(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Transição inválida: {action} a partir de {from}")]
    InvalidTransition { from: String, action: &'static str },

    #[error("Registro alterado por outra requisição")]
    ConcurrentModification,

    #[error("Limite de anúncios atingido ({0})")]
    ListingLimitReached(i32),

    #[error("Oferta no próprio item")]
    OwnItemOffer,

    #[error("Item indisponível")]
    ItemUnavailable,

    #[error("Avaliação já registrada")]
    AlreadyRated,

    #[error("Intervalo de datas inválido")]
    InvalidDateRange,

    #[error("{0} em uso")]
    ResourceInUse(&'static str),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::OwnItemOffer
            | AppError::InvalidDateRange => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::ListingLimitReached(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateName(_)
            | AppError::DuplicateSlug(_)
            | AppError::EmailAlreadyExists
            | AppError::InvalidTransition { .. }
            | AppError::ConcurrentModification
            | AppError::ItemUnavailable
            | AppError::AlreadyRated
            | AppError::ResourceInUse(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Chave da mensagem + parâmetros para interpolação
    fn message_key(&self) -> (&'static str, Vec<(&'static str, String)>) {
        match self {
            AppError::ValidationError(_) => ("validation_failed", vec![]),
            AppError::NotFound(resource) => ("not_found", vec![("resource", resource.to_string())]),
            AppError::DuplicateName(name) => ("duplicate_name", vec![("name", name.clone())]),
            AppError::DuplicateSlug(slug) => ("duplicate_slug", vec![("slug", slug.clone())]),
            AppError::EmailAlreadyExists => ("email_exists", vec![]),
            AppError::InvalidCredentials => ("invalid_credentials", vec![]),
            AppError::InvalidToken => ("invalid_token", vec![]),
            AppError::Forbidden => ("forbidden", vec![]),
            AppError::InvalidTransition { from, action } => (
                "invalid_transition",
                vec![("action", action.to_string()), ("from", from.clone())],
            ),
            AppError::ConcurrentModification => ("concurrent_modification", vec![]),
            AppError::ListingLimitReached(limit) => {
                ("listing_limit", vec![("limit", limit.to_string())])
            }
            AppError::OwnItemOffer => ("own_item_offer", vec![]),
            AppError::ItemUnavailable => ("item_unavailable", vec![]),
            AppError::AlreadyRated => ("already_rated", vec![]),
            AppError::InvalidDateRange => ("invalid_date_range", vec![]),
            AppError::ResourceInUse(resource) => {
                ("resource_in_use", vec![("resource", resource.to_string())])
            }
            _ => ("internal_error", vec![]),
        }
    }

    /// Converte o erro interno na resposta traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let (key, params) = self.message_key();
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let message = store.translate(&locale.0, key, &params);

        let details = match self {
            AppError::ValidationError(errors) => Some(validation_details(errors)),
            _ => None,
        };

        ApiError { status, message, details }
    }
}

fn validation_details(errors: &validator::ValidationErrors) -> Value {
    let mut details: HashMap<String, Vec<String>> = HashMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        details.insert(field.to_string(), messages);
    }
    json!(details)
}

// O envelope de erro único devolvido ao cliente: { "message": ..., "details"?: ... }
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "message": self.message, "details": details }),
            None => json!({ "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Para quando não temos o Locale em mãos (ex.: rejeições de extratores).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::shared())
            .into_response()
    }
}

/// Mapeia violação de chave única: na coluna `slug` vira `DuplicateSlug`, nas demais `DuplicateName`.
pub(crate) fn map_unique_violation(e: sqlx::Error, name: &str, slug: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return unique_conflict(db_err.constraint(), name, slug);
        }
    }
    e.into()
}

fn unique_conflict(constraint: Option<&str>, name: &str, slug: &str) -> AppError {
    match constraint {
        Some(c) if c.ends_with("_slug_key") => AppError::DuplicateSlug(slug.to_string()),
        _ => AppError::DuplicateName(name.to_string()),
    }
}

/// Mapeia violação de chave estrangeira (ex.: DELETE de um plano com associações).
pub(crate) fn map_foreign_key_violation(e: sqlx::Error, resource: &'static str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return AppError::ResourceInUse(resource);
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn status_codes_follow_error_taxonomy() {
        assert_eq!(AppError::NotFound("membership").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::DuplicateName("Gold".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("Title is required.".into());
        errors.add("title", err);

        let api = AppError::ValidationError(errors)
            .to_api_error(&Locale("en".into()), I18nStore::shared());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["title"][0], "Title is required.");
    }

    #[test]
    fn slug_collision_names_the_slug() {
        let err = unique_conflict(Some("membership_tiers_slug_key"), "gold!", "gold");
        assert!(matches!(&err, AppError::DuplicateSlug(slug) if slug == "gold"));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let api = err.to_api_error(&Locale("en".into()), I18nStore::shared());
        assert!(api.message.contains("'gold'"));

        assert!(matches!(
            unique_conflict(Some("membership_tiers_name_key"), "Gold", "gold"),
            AppError::DuplicateName(name) if name == "Gold"
        ));
    }

    #[test]
    fn internal_errors_are_opaque() {
        let api = AppError::InternalServerError(anyhow::anyhow!("connection reset by peer"))
            .to_api_error(&Locale("en".into()), I18nStore::shared());

        assert!(!api.message.contains("connection reset"));
        assert!(api.details.is_none());
    }
}
