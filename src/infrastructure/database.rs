//! MySQL persistence

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::{error, info};

use crate::app::users::model::{User, UserFields};
use crate::app::users::repository::UserRepository;
use crate::config::DatabaseConfig;
use crate::core::error::DbError;

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        uuid VARCHAR(36) PRIMARY KEY,
        fullname VARCHAR(255) NOT NULL,
        study_level VARCHAR(255) NOT NULL,
        age INT NOT NULL
    )
"#;

pub struct DatabaseManager {
    pool: MySqlPool,
}

impl DatabaseManager {
    /// Build the pool without connecting. Connections are opened on first
    /// use, so the service can start while the database is still down.
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(options);

        Self { pool }
    }

    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }
}

/// Create the `users` table if it does not exist yet
///
/// Idempotent. Used by the `migrate` binary, which exits non-zero on error.
pub async fn run_migrations(repository: &dyn UserRepository) -> Result<(), DbError> {
    info!("creating users table if not exists");
    match repository.ensure_schema().await {
        Ok(()) => {
            info!("migration completed");
            Ok(())
        }
        Err(e) => {
            error!("migration failed: {}", e);
            Err(e)
        }
    }
}

/// `UserRepository` over a shared MySQL pool
#[derive(Clone)]
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>("SELECT uuid, fullname, study_level, age FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT uuid, fullname, study_level, age FROM users WHERE uuid = ?",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<(), DbError> {
        sqlx::query("INSERT INTO users (uuid, fullname, study_level, age) VALUES (?, ?, ?, ?)")
            .bind(&user.uuid)
            .bind(&user.fullname)
            .bind(&user.study_level)
            .bind(user.age)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(&self, uuid: &str, fields: &UserFields) -> Result<u64, DbError> {
        let result =
            sqlx::query("UPDATE users SET fullname = ?, study_level = ?, age = ? WHERE uuid = ?")
                .bind(&fields.fullname)
                .bind(&fields.study_level)
                .bind(fields.age)
                .bind(uuid)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, uuid: &str) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
