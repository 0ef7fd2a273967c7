//! In-process user store for tests
//!
//! Behaves like the `users` table (primary key on uuid, insertion order on
//! listing) without a database. `set_unavailable` makes every call fail.
//! The binaries always run against MySQL.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::app::users::model::{User, UserFields};
use crate::app::users::repository::UserRepository;
use crate::core::error::DbError;

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
    unavailable: AtomicBool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going down (or coming back)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    fn check(&self) -> Result<(), DbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DbError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn ensure_schema(&self) -> Result<(), DbError> {
        self.check()
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.check()
    }

    async fn find_all(&self) -> Result<Vec<User>, DbError> {
        self.check()?;
        Ok(self.users.read().await.clone())
    }

    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<User>, DbError> {
        self.check()?;
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.uuid == uuid).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), DbError> {
        self.check()?;
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.uuid == user.uuid) {
            return Err(DbError::DuplicateKey(user.uuid.clone()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update(&self, uuid: &str, fields: &UserFields) -> Result<u64, DbError> {
        self.check()?;
        let mut users = self.users.write().await;
        match users.iter_mut().find(|user| user.uuid == uuid) {
            Some(user) => {
                user.fullname = fields.fullname.clone();
                user.study_level = fields.study_level.clone();
                user.age = fields.age;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, uuid: &str) -> Result<u64, DbError> {
        self.check()?;
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|user| user.uuid != uuid);
        Ok((before - users.len()) as u64)
    }
}
