//! User record service
//!
//! Validates input, runs one repository call per operation and records the
//! outcome in the event log. Storage failures are logged here with their
//! detail; the caller only sees an opaque `AppError::Persistence`.

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::model::{parse_user, UpdatedUser, User};
use super::repository::UserRepository;
use crate::core::error::{AppError, DbError};
use crate::infrastructure::event_log::{EventLog, LogEntry};

const USERS_ENDPOINT: &str = "/api/users";
const HEALTH_ENDPOINT: &str = "/health";

#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    events: Arc<dyn EventLog>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, events: Arc<dyn EventLog>) -> Self {
        Self { repository, events }
    }

    /// Create the `users` table if needed
    pub async fn bootstrap(&self) -> Result<(), DbError> {
        match self.repository.ensure_schema().await {
            Ok(()) => {
                self.events.record(LogEntry::info("Base de données initialisée"));
                Ok(())
            }
            Err(e) => {
                self.events.record(
                    LogEntry::error("Erreur initialisation DB").with("error", e.to_string()),
                );
                Err(e)
            }
        }
    }

    /// Whether the database answers a trivial query
    pub async fn health(&self) -> bool {
        match self.repository.ping().await {
            Ok(()) => {
                self.events
                    .record(LogEntry::info("Health check réussi").with("endpoint", HEALTH_ENDPOINT));
                true
            }
            Err(e) => {
                self.events.record(
                    LogEntry::error("Health check échoué")
                        .with("endpoint", HEALTH_ENDPOINT)
                        .with("error", e.to_string()),
                );
                false
            }
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let endpoint = format!("GET {USERS_ENDPOINT}");
        let users = self.repository.find_all().await.map_err(|e| {
            self.persistence_failure("Erreur lors de la récupération des utilisateurs", &endpoint, e)
        })?;

        self.events.record(
            LogEntry::info("Liste des utilisateurs récupérée")
                .with("endpoint", endpoint)
                .with("count", users.len()),
        );
        Ok(users)
    }

    pub async fn get_user(&self, uuid: &str) -> Result<User, AppError> {
        let endpoint = format!("GET {USERS_ENDPOINT}/{uuid}");
        let user = self.repository.find_by_uuid(uuid).await.map_err(|e| {
            self.persistence_failure("Erreur lors de la récupération de l'utilisateur", &endpoint, e)
        })?;

        let Some(user) = user else {
            return Err(AppError::NotFound {
                endpoint: Some(endpoint),
            });
        };

        self.events.record(
            LogEntry::info("Utilisateur récupéré")
                .with("endpoint", endpoint)
                .with("uuid", uuid),
        );
        Ok(user)
    }

    pub async fn create_user(&self, input: Option<&Value>) -> Result<User, AppError> {
        let endpoint = format!("POST {USERS_ENDPOINT}");
        let fields = parse_user(input).map_err(|e| {
            self.rejected("Validation échouée pour la création d'utilisateur", &endpoint, input);
            e
        })?;

        let user = User::new(Uuid::new_v4().to_string(), fields);
        self.repository.insert(&user).await.map_err(|e| {
            self.persistence_failure("Erreur lors de la création de l'utilisateur", &endpoint, e)
        })?;

        self.events.record(
            LogEntry::info("Utilisateur créé")
                .with("endpoint", endpoint)
                .with("uuid", user.uuid.as_str()),
        );
        Ok(user)
    }

    /// Replace all three mutable fields of an existing record
    pub async fn update_user(
        &self,
        uuid: &str,
        input: Option<&Value>,
    ) -> Result<UpdatedUser, AppError> {
        let endpoint = format!("PUT {USERS_ENDPOINT}/{uuid}");
        let fields = parse_user(input).map_err(|e| {
            self.rejected("Validation échouée pour la mise à jour d'utilisateur", &endpoint, input);
            e
        })?;

        let matched = self.repository.update(uuid, &fields).await.map_err(|e| {
            self.persistence_failure("Erreur lors de la mise à jour de l'utilisateur", &endpoint, e)
        })?;
        if matched == 0 {
            return Err(AppError::NotFound { endpoint: None });
        }

        self.events.record(
            LogEntry::info("Utilisateur mis à jour")
                .with("endpoint", endpoint)
                .with("uuid", uuid),
        );

        let age = input
            .and_then(|value| value.get("age"))
            .cloned()
            .unwrap_or_else(|| Value::from(fields.age));
        Ok(UpdatedUser {
            uuid: uuid.to_string(),
            fullname: fields.fullname,
            study_level: fields.study_level,
            age,
        })
    }

    pub async fn delete_user(&self, uuid: &str) -> Result<(), AppError> {
        let endpoint = format!("DELETE {USERS_ENDPOINT}/{uuid}");
        let deleted = self.repository.delete(uuid).await.map_err(|e| {
            self.persistence_failure("Erreur lors de la suppression de l'utilisateur", &endpoint, e)
        })?;
        if deleted == 0 {
            return Err(AppError::NotFound { endpoint: None });
        }

        self.events.record(
            LogEntry::info("Utilisateur supprimé")
                .with("endpoint", endpoint)
                .with("uuid", uuid),
        );
        Ok(())
    }

    fn rejected(&self, message: &str, endpoint: &str, input: Option<&Value>) {
        self.events.record(
            LogEntry::warn(message)
                .with("endpoint", endpoint)
                .with("data", input.cloned().unwrap_or(Value::Null)),
        );
    }

    fn persistence_failure(&self, message: &str, endpoint: &str, error: DbError) -> AppError {
        self.events.record(
            LogEntry::error(message)
                .with("endpoint", endpoint)
                .with("error", error.to_string()),
        );
        AppError::Persistence(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_log::{LogLevel, MemoryEventLog};
    use crate::infrastructure::memory_store::MemoryUserStore;
    use serde_json::json;

    struct Fixture {
        service: UserService,
        store: Arc<MemoryUserStore>,
        events: Arc<MemoryEventLog>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryUserStore::new());
        let events = Arc::new(MemoryEventLog::new());
        let service = UserService::new(store.clone(), events.clone());
        Fixture {
            service,
            store,
            events,
        }
    }

    fn ana() -> Value {
        json!({ "fullname": "Ana", "study_level": "MSc", "age": 24 })
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let f = fixture();

        let created = f.service.create_user(Some(&ana())).await.unwrap();
        assert_eq!(created.uuid.len(), 36);
        assert!(Uuid::parse_str(&created.uuid).is_ok());
        assert_eq!(created.fullname, "Ana");
        assert_eq!(created.age, 24);

        let fetched = f.service.get_user(&created.uuid).await.unwrap();
        assert_eq!(fetched, created);

        let entries = f.events.entries();
        assert_eq!(entries[0].message, "Utilisateur créé");
        assert_eq!(entries[0].field("endpoint"), Some(&json!("POST /api/users")));
        assert_eq!(entries[0].field("uuid"), Some(&json!(created.uuid)));
        assert_eq!(entries[1].message, "Utilisateur récupéré");
    }

    #[tokio::test]
    async fn test_create_coerces_string_age() {
        let f = fixture();
        let input = json!({ "fullname": "Ana", "study_level": "MSc", "age": "24" });

        let created = f.service.create_user(Some(&input)).await.unwrap();
        assert_eq!(created.age, 24);
    }

    #[tokio::test]
    async fn test_invalid_create_is_warned_and_not_persisted() {
        let f = fixture();
        let input = json!({ "study_level": "MSc", "age": 24 });

        let result = f.service.create_user(Some(&input)).await;
        assert!(matches!(result, Err(AppError::Validation)));
        assert!(f.store.is_empty().await);

        let entries = f.events.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(entries[0].field("endpoint"), Some(&json!("POST /api/users")));
        assert_eq!(entries[0].field("data"), Some(&input));
    }

    #[tokio::test]
    async fn test_missing_body_is_rejected() {
        let f = fixture();

        let result = f.service.create_user(None).await;
        assert!(matches!(result, Err(AppError::Validation)));
        assert_eq!(f.events.entries()[0].field("data"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_logged() {
        let f = fixture();

        let result = f.service.get_user("nope").await;
        match result {
            Err(AppError::NotFound { endpoint }) => {
                assert_eq!(endpoint.as_deref(), Some("GET /api/users/nope"));
            }
            other => panic!("expected not found, got {other:?}"),
        }
        assert!(f.events.entries().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let f = fixture();
        let created = f.service.create_user(Some(&ana())).await.unwrap();

        let input = json!({ "fullname": "Ana Maria", "study_level": "PhD", "age": "27" });
        let updated = f
            .service
            .update_user(&created.uuid, Some(&input))
            .await
            .unwrap();

        // age is echoed as submitted
        assert_eq!(updated.age, json!("27"));
        assert_eq!(updated.fullname, "Ana Maria");

        let fetched = f.service.get_user(&created.uuid).await.unwrap();
        assert_eq!(
            fetched,
            User {
                uuid: created.uuid.clone(),
                fullname: "Ana Maria".to_string(),
                study_level: "PhD".to_string(),
                age: 27,
            }
        );
    }

    #[tokio::test]
    async fn test_update_unknown_logs_nothing() {
        let f = fixture();

        let result = f.service.update_user("ghost", Some(&ana())).await;
        assert!(matches!(result, Err(AppError::NotFound { endpoint: None })));
        assert!(f.events.entries().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_update_is_warned() {
        let f = fixture();
        let created = f.service.create_user(Some(&ana())).await.unwrap();
        f.events.clear();

        let input = json!({ "fullname": "Ana", "study_level": "MSc", "age": "abc" });
        let result = f.service.update_user(&created.uuid, Some(&input)).await;
        assert!(matches!(result, Err(AppError::Validation)));

        let entries = f.events.entries();
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(
            entries[0].field("endpoint"),
            Some(&json!(format!("PUT /api/users/{}", created.uuid)))
        );
        assert_eq!(f.service.get_user(&created.uuid).await.unwrap().age, 24);
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let f = fixture();
        let created = f.service.create_user(Some(&ana())).await.unwrap();

        f.service.delete_user(&created.uuid).await.unwrap();
        assert!(matches!(
            f.service.get_user(&created.uuid).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            f.service.delete_user(&created.uuid).await,
            Err(AppError::NotFound { .. })
        ));

        let deletions: Vec<_> = f
            .events
            .entries()
            .into_iter()
            .filter(|entry| entry.message == "Utilisateur supprimé")
            .collect();
        assert_eq!(deletions.len(), 1);
    }

    #[tokio::test]
    async fn test_list_count_tracks_rows() {
        let f = fixture();
        let a = f.service.create_user(Some(&ana())).await.unwrap();
        f.service.create_user(Some(&ana())).await.unwrap();
        f.service.create_user(Some(&ana())).await.unwrap();
        f.service.delete_user(&a.uuid).await.unwrap();

        let users = f.service.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users.len(), f.store.len().await);

        let last = f.events.entries().pop().unwrap();
        assert_eq!(last.field("count"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_logged_with_detail() {
        let f = fixture();
        f.store.set_unavailable(true);

        let result = f.service.list_users().await;
        assert!(matches!(result, Err(AppError::Persistence(_))));

        let entries = f.events.entries();
        assert_eq!(entries[0].level, LogLevel::Error);
        assert_eq!(
            entries[0].field("error"),
            Some(&json!("database unavailable: connection refused"))
        );
    }

    #[tokio::test]
    async fn test_record_operations_fail_opaquely() {
        let f = fixture();
        let created = f.service.create_user(Some(&ana())).await.unwrap();
        f.events.clear();
        f.store.set_unavailable(true);

        let uuid = created.uuid.as_str();
        assert!(matches!(
            f.service.get_user(uuid).await,
            Err(AppError::Persistence(_))
        ));
        assert!(matches!(
            f.service.update_user(uuid, Some(&ana())).await,
            Err(AppError::Persistence(_))
        ));
        assert!(matches!(
            f.service.delete_user(uuid).await,
            Err(AppError::Persistence(_))
        ));

        let messages: Vec<String> = f.events.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(
            messages,
            [
                "Erreur lors de la récupération de l'utilisateur",
                "Erreur lors de la mise à jour de l'utilisateur",
                "Erreur lors de la suppression de l'utilisateur",
            ]
        );
    }

    #[tokio::test]
    async fn test_health_and_bootstrap() {
        let f = fixture();
        assert!(f.service.bootstrap().await.is_ok());
        assert!(f.service.health().await);

        f.store.set_unavailable(true);
        assert!(f.service.bootstrap().await.is_err());
        assert!(!f.service.health().await);

        let levels: Vec<LogLevel> = f.events.entries().iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            [LogLevel::Info, LogLevel::Info, LogLevel::Error, LogLevel::Error]
        );
    }
}
