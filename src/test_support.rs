// src/test_support.rs

use sqlx::PgPool;
use std::env;
use std::sync::OnceLock;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::{
    config::{AppConfig, AppState},
    db::UserRepository,
    models::auth::{Principal, User, UserRole},
};

fn split_db_url(url: &str) -> Result<(String, String), String> {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base.to_string(), Some(query)),
        None => (url.to_string(), None),
    };

    let db_start = base
        .rfind('/')
        .ok_or_else(|| "invalid database url".to_string())?;
    if db_start + 1 >= base.len() {
        return Err("database name is empty".to_string());
    }

    let db_name = base[db_start + 1..].to_string();
    let mut admin_url = format!("{}postgres", &base[..db_start + 1]);
    if let Some(query) = query {
        admin_url = format!("{admin_url}?{query}");
    }

    Ok((admin_url, db_name))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// Um teste de banco por vez: cada um recria o banco do zero
static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestDb {
    pub pool: PgPool,
    pub config: AppConfig,
    _guard: MutexGuard<'static, ()>,
}

/// Banco limpo e migrado em `TEST_DATABASE_URL`; `None` quando a variável não existe.
pub async fn init_test_db() -> Option<TestDb> {
    dotenvy::dotenv().ok();
    let Ok(test_url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL não definida; teste de banco ignorado");
        return None;
    };
    let (admin_url, db_name) = split_db_url(&test_url).expect("invalid TEST_DATABASE_URL format");

    let lock = TEST_DB_LOCK.get_or_init(|| Mutex::new(()));
    let guard = lock.lock().await;

    let admin_pool = PgPool::connect(&admin_url).await.expect("connect admin db");
    let quoted_name = quote_identifier(&db_name);
    sqlx::query(&format!("DROP DATABASE IF EXISTS {quoted_name} WITH (FORCE)"))
        .execute(&admin_pool)
        .await
        .expect("drop test db");
    sqlx::query(&format!("CREATE DATABASE {quoted_name}"))
        .execute(&admin_pool)
        .await
        .expect("create test db");
    admin_pool.close().await;

    let pool = PgPool::connect(&test_url).await.expect("connect test db");
    sqlx::migrate!().run(&pool).await.expect("migrations");

    Some(TestDb {
        pool,
        config: test_config(&test_url),
        _guard: guard,
    })
}

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        database_max_connections: 2,
        jwt_secret: "club-portal-test-secret".into(),
        jwt_ttl_days: 1,
        server_addr: "127.0.0.1:0".into(),
        server_timeout_secs: 5,
        server_body_limit_mb: 1,
    }
}

impl TestDb {
    pub fn state(&self) -> AppState {
        AppState::build(&self.config, self.pool.clone())
    }

    pub async fn user(&self, role: UserRole) -> User {
        let repo = UserRepository::new(self.pool.clone());
        let email = format!("player_{}@club.test", Uuid::new_v4());
        let user = repo
            .create_user(&self.pool, &email, "Test Player", "not-a-bcrypt-hash")
            .await
            .expect("insert user");
        if role == UserRole::Member {
            return user;
        }
        repo.update_role(user.id, role).await.expect("set role")
    }

    pub async fn principal(&self, role: UserRole) -> Principal {
        Principal::from(&self.user(role).await)
    }
}
