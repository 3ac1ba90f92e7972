// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Principal, User, UserRole},
};

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt: JwtConfig,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt: JwtConfig, pool: PgPool) -> Self {
        Self { user_repo, jwt, pool }
    }

    pub async fn register_user(&self, email: &str, full_name: &str, password: &str) -> Result<String, AppError> {
        // Hashing fora do runtime assíncrono
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let email = email.trim().to_lowercase();
        let user = self
            .user_repo
            .create_user(&self.pool, &email, full_name.trim(), &hashed_password)
            .await?;

        tracing::info!("👤 Novo usuário registrado: {}", user.id);
        self.create_token(&user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    /// Decodifica o token sem ir ao banco; papel e e-mail vêm nas claims.
    pub fn validate_token(&self, token: &str) -> Result<Principal, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt.secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.into())
    }

    /// Token válido + papel atual lido do banco; usuário removido perde o acesso.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let claims = self.validate_token(token)?;
        let user = self
            .user_repo
            .find_by_id(claims.id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if user.role != claims.role {
            tracing::debug!(
                "🔁 Papel de {} mudou desde a emissão do token ({:?} -> {:?})",
                user.id,
                claims.role,
                user.role
            );
        }
        Ok(Principal::from(&user))
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo.find_by_id(id).await?.ok_or(AppError::NotFound("user"))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list().await
    }

    pub async fn update_role(&self, id: Uuid, role: UserRole) -> Result<User, AppError> {
        let user = self.user_repo.update_role(id, role).await?;
        tracing::info!("🔑 Papel do usuário {} alterado para {:?}", id, role);
        Ok(user)
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.jwt.ttl_days);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/club_portal_test")
            .expect("lazy pool");
        AuthService::new(
            UserRepository::new(pool.clone()),
            JwtConfig { secret: "test-secret".into(), ttl_days: 7 },
            pool,
        )
    }

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "keeper@club.org".into(),
            full_name: "Keeper".into(),
            password_hash: String::new(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn token_round_trips_principal() {
        let auth = service();
        let u = user(UserRole::Admin);
        let token = auth.create_token(&u).unwrap();

        let principal = auth.validate_token(&token).unwrap();
        assert_eq!(principal.id, u.id);
        assert_eq!(principal.role, UserRole::Admin);
        assert_eq!(principal.email, "keeper@club.org");
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let auth = service();
        let token = auth.create_token(&user(UserRole::Member)).unwrap();
        let tampered = format!("{token}x");
        assert!(matches!(auth.validate_token(&tampered), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn demoted_admin_is_authenticated_with_the_current_role() {
        let Some(db) = crate::test_support::init_test_db().await else { return };
        let auth = db.state().auth_service;
        let admin = db.user(UserRole::Admin).await;
        let token = auth.create_token(&admin).unwrap();
        assert_eq!(auth.authenticate(&token).await.unwrap().role, UserRole::Admin);

        auth.update_role(admin.id, UserRole::Member).await.unwrap();
        let principal = auth.authenticate(&token).await.unwrap();
        assert_eq!(principal.id, admin.id);
        assert_eq!(principal.role, UserRole::Member);
    }

    #[tokio::test]
    async fn token_of_a_deleted_user_is_rejected() {
        let Some(db) = crate::test_support::init_test_db().await else { return };
        let auth = db.state().auth_service;
        let user = db.user(UserRole::Member).await;
        let token = auth.create_token(&user).unwrap();

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&db.pool)
            .await
            .unwrap();
        assert!(matches!(auth.authenticate(&token).await, Err(AppError::InvalidToken)));
    }
}
