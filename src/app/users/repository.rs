//! Persistence port for user records
//!
//! Every method is a single statement against the `users` table.

use async_trait::async_trait;

use super::model::{User, UserFields};
use crate::core::error::DbError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create the `users` table if it does not exist. Never alters it.
    async fn ensure_schema(&self) -> Result<(), DbError>;

    /// Trivial round trip used by the health check
    async fn ping(&self) -> Result<(), DbError>;

    /// All rows, in whatever order the store returns them
    async fn find_all(&self) -> Result<Vec<User>, DbError>;

    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<User>, DbError>;

    async fn insert(&self, user: &User) -> Result<(), DbError>;

    /// Replace the three mutable columns. Returns the number of matched rows.
    async fn update(&self, uuid: &str, fields: &UserFields) -> Result<u64, DbError>;

    /// Returns the number of deleted rows
    async fn delete(&self, uuid: &str) -> Result<u64, DbError>;
}
