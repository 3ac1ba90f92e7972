// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::{
        error::{ApiError, AppError},
        i18n::I18nStore,
    },
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// O papel mínimo exigido por uma rota.
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
}

/// Guardião: rejeita antes do handler tocar em qualquer dado.
/// O papel conferido é o que o `auth_guard` releu do banco.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = Locale::from_headers(&parts.headers);
        let store = I18nStore::shared();

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, store))?;

        if !T::allows(user.0.role) {
            tracing::warn!("🚫 Usuário {} sem papel suficiente ({:?})", user.0.id, user.0.role);
            return Err(AppError::Forbidden.to_api_error(&locale, store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// PAPÉIS
// ---

pub struct AdminRole;
impl RoleDef for AdminRole {
    fn allows(role: UserRole) -> bool {
        role.is_admin()
    }
}

pub struct SuperAdminRole;
impl RoleDef for SuperAdminRole {
    fn allows(role: UserRole) -> bool {
        role.is_super_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_hierarchy() {
        assert!(!AdminRole::allows(UserRole::Member));
        assert!(AdminRole::allows(UserRole::Admin));
        assert!(AdminRole::allows(UserRole::SuperAdmin));
        assert!(!SuperAdminRole::allows(UserRole::Admin));
        assert!(SuperAdminRole::allows(UserRole::SuperAdmin));
    }
}
