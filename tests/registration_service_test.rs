//! Registration and session service tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mockall::predicate::eq;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
use uuid::Uuid;

use signup_service::domain::{CurrentUser, Password, RegisterForm, Session, SessionToken, User};
use signup_service::errors::{AppError, AppResult};
use signup_service::infra::repositories::entities::{session, user};
use signup_service::infra::repositories::{MockSessionRepository, MockUserRepository};
use signup_service::infra::{
    Persistence, SessionRepository, TransactionContext, TxFuture, UnitOfWork, UserRepository,
};
use signup_service::services::{AuthService, Authenticator};

fn create_test_user(id: Uuid, password_hash: &str) -> User {
    User {
        id,
        username: "jdoe".to_string(),
        email: "jdoe@example.com".to_string(),
        password_hash: password_hash.to_string(),
        created_at: Utc::now(),
    }
}

fn create_test_session(user_id: Uuid, expires_at: chrono::DateTime<Utc>) -> Session {
    Session {
        id: Uuid::new_v4(),
        user_id,
        token_hash: "digest".to_string(),
        expires_at,
        created_at: Utc::now(),
    }
}

fn valid_form() -> RegisterForm {
    RegisterForm {
        username: "jdoe".to_string(),
        email: "jdoe@example.com".to_string(),
        password: "Sup3rSecret".to_string(),
        confirm_password: "Sup3rSecret".to_string(),
    }
}

fn validation_messages(result: AppResult<impl std::fmt::Debug>) -> Vec<String> {
    match result {
        Err(AppError::Validation(messages)) => messages,
        other => panic!("expected validation error, got {:?}", other),
    }
}

/// Test double for UnitOfWork that wraps mock repositories
struct TestUnitOfWork {
    user_repo: Arc<MockUserRepository>,
    session_repo: Arc<MockSessionRepository>,
}

impl TestUnitOfWork {
    fn new(user_repo: MockUserRepository, session_repo: MockSessionRepository) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
            session_repo: Arc::new(session_repo),
        }
    }

    fn with_users(user_repo: MockUserRepository) -> Self {
        Self::new(user_repo, MockSessionRepository::new())
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn sessions(&self) -> Arc<dyn SessionRepository> {
        self.session_repo.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        // Transaction not supported in test mock
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

fn user_model(id: Uuid) -> user::Model {
    user::Model {
        id,
        username: "jdoe".to_string(),
        email: "jdoe@example.com".to_string(),
        password_hash: "$argon2id$stored".to_string(),
        created_at: Utc::now(),
    }
}

fn session_model(user_id: Uuid) -> session::Model {
    session::Model {
        id: Uuid::new_v4(),
        user_id,
        token_hash: "digest".to_string(),
        expires_at: Utc::now() + Duration::days(30),
        created_at: Utc::now(),
    }
}

/// Persistence over a mock connection that answers one full registration:
/// two empty uniqueness lookups, then the inserted user and session rows.
fn registering_persistence(user_id: Uuid) -> Persistence {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new(), Vec::<user::Model>::new()])
        .append_query_results([vec![user_model(user_id)]])
        .append_query_results([vec![session_model(user_id)]])
        .into_connection();

    Persistence::new(Arc::new(db))
}

/// Drain the statement log once every holder of the connection is gone.
fn transaction_log(db: Arc<DatabaseConnection>) -> String {
    let db = Arc::try_unwrap(db)
        .ok()
        .expect("connection still shared");
    format!("{:?}", db.into_transaction_log())
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_rejects_taken_username() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_username()
        .with(eq("jdoe"))
        .returning(|_| Ok(Some(create_test_user(Uuid::new_v4(), "hash"))));
    users.expect_find_by_email().returning(|_| Ok(None));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::with_users(users)));
    let messages = validation_messages(service.register(valid_form()).await);

    assert_eq!(messages, vec!["Username is already taken.".to_string()]);
}

#[tokio::test]
async fn test_register_rejects_taken_email() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_username().returning(|_| Ok(None));
    users
        .expect_find_by_email()
        .with(eq("jdoe@example.com"))
        .returning(|_| Ok(Some(create_test_user(Uuid::new_v4(), "hash"))));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::with_users(users)));
    let mut form = valid_form();
    form.email = "  JDoe@Example.com ".to_string();

    let messages = validation_messages(service.register(form).await);

    assert_eq!(
        messages,
        vec!["An account with that email already exists.".to_string()]
    );
}

#[tokio::test]
async fn test_register_short_password_example() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_username().returning(|_| Ok(None));
    users.expect_find_by_email().returning(|_| Ok(None));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::with_users(users)));
    let form = RegisterForm {
        username: "ab".to_string(),
        email: "a@b.com".to_string(),
        password: "short".to_string(),
        confirm_password: "short".to_string(),
    };

    let messages = validation_messages(service.register(form).await);

    assert!(messages.contains(&"Password must be at least 8 characters.".to_string()));
    assert!(!messages.contains(&"Passwords must match.".to_string()));
}

#[tokio::test]
async fn test_register_mismatched_confirmation() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_username().returning(|_| Ok(None));
    users.expect_find_by_email().returning(|_| Ok(None));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::with_users(users)));
    let mut form = valid_form();
    form.confirm_password = "Sup3rSecreT".to_string();

    let messages = validation_messages(service.register(form).await);

    assert_eq!(messages, vec!["Passwords must match.".to_string()]);
}

#[tokio::test]
async fn test_register_skips_lookup_for_malformed_fields() {
    // No expectations: any repository call would panic
    let users = MockUserRepository::new();

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::with_users(users)));
    let form = RegisterForm {
        username: "not valid!".to_string(),
        email: "nope".to_string(),
        password: "Sup3rSecret".to_string(),
        confirm_password: "Sup3rSecret".to_string(),
    };

    let messages = validation_messages(service.register(form).await);

    assert_eq!(
        messages,
        vec![
            "Username may only contain letters, numbers, '.', '_' and '-'.".to_string(),
            "Email address is invalid.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_register_persists_user_and_session() {
    let user_id = Uuid::new_v4();
    let service = Authenticator::with_default_ttl(Arc::new(registering_persistence(user_id)));

    let before = Utc::now();
    let issued = service.register(valid_form()).await.expect("registration succeeds");

    assert_eq!(issued.user.id, user_id);
    assert_eq!(issued.user.username, "jdoe");
    assert_eq!(issued.token.as_str().len(), 64);
    assert!(issued.expires_at >= before + Duration::days(30));
    assert!(issued.expires_at <= Utc::now() + Duration::days(30));
}

#[tokio::test]
async fn test_register_issues_distinct_tokens() {
    let first = Authenticator::with_default_ttl(Arc::new(registering_persistence(Uuid::new_v4())))
        .register(valid_form())
        .await
        .expect("first registration succeeds");
    let second = Authenticator::with_default_ttl(Arc::new(registering_persistence(Uuid::new_v4())))
        .register(valid_form())
        .await
        .expect("second registration succeeds");

    assert_ne!(first.token.as_str(), second.token.as_str());
}

#[tokio::test]
async fn test_register_surfaces_persistence_failure() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_username().returning(|_| Ok(None));
    users.expect_find_by_email().returning(|_| Ok(None));

    // The test unit of work fails every transaction
    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::with_users(users)));
    let result = service.register(valid_form()).await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn test_register_rolls_back_when_user_insert_fails() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new(), Vec::<user::Model>::new()])
            .append_query_errors([DbErr::Custom("insert failed".to_string())])
            .into_connection(),
    );
    let service = Authenticator::with_default_ttl(Arc::new(Persistence::new(db.clone())));

    let result = service.register(valid_form()).await;
    drop(service);

    assert!(matches!(result, Err(AppError::Database(_))));
    let log = transaction_log(db);
    assert!(log.contains("INSERT INTO"));
    assert!(log.contains("ROLLBACK"));
    assert!(!log.contains("sessions"));
    assert!(!log.contains("COMMIT"));
}

#[tokio::test]
async fn test_register_session_insert_failure_is_not_a_duplicate_account() {
    let user_id = Uuid::new_v4();
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new(), Vec::<user::Model>::new()])
            .append_query_results([vec![user_model(user_id)]])
            .append_query_errors([DbErr::Custom("session insert failed".to_string())])
            .into_connection(),
    );
    let service = Authenticator::with_default_ttl(Arc::new(Persistence::new(db.clone())));

    let result = service.register(valid_form()).await;
    drop(service);

    // A failed session write is a server error, never a validation message
    assert!(matches!(result, Err(AppError::Database(_))));
    let log = transaction_log(db);
    assert!(log.contains("sessions"));
    assert!(log.contains("ROLLBACK"));
    assert!(!log.contains("COMMIT"));
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_unknown_email() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::with_users(users)));
    let result = service
        .login("ghost@example.com".to_string(), "Sup3rSecret".to_string())
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let hash = Password::hash("Sup3rSecret").unwrap().into_string();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(move |_| Ok(Some(create_test_user(Uuid::new_v4(), &hash))));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::with_users(users)));
    let result = service
        .login("jdoe@example.com".to_string(), "WrongPass1".to_string())
        .await;

    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_opens_session() {
    let user_id = Uuid::new_v4();
    let hash = Password::hash("Sup3rSecret").unwrap().into_string();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .with(eq("jdoe@example.com"))
        .returning(move |_| Ok(Some(create_test_user(user_id, &hash))));

    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_create()
        .times(1)
        .returning(|user_id, _, expires_at| Ok(create_test_session(user_id, expires_at)));

    let service = Authenticator::new(Arc::new(TestUnitOfWork::new(users, sessions)), 7);
    let issued = service
        .login(" JDoe@example.com".to_string(), "Sup3rSecret".to_string())
        .await
        .expect("login succeeds");

    assert_eq!(issued.user.id, user_id);
    assert!(issued.expires_at <= Utc::now() + Duration::days(7));
    assert!(issued.expires_at > Utc::now() + Duration::days(6));
}

#[tokio::test]
async fn test_oversized_ttl_is_clamped() {
    let user_id = Uuid::new_v4();
    let hash = Password::hash("Sup3rSecret").unwrap().into_string();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(move |_| Ok(Some(create_test_user(user_id, &hash))));

    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_create()
        .returning(|user_id, _, expires_at| Ok(create_test_session(user_id, expires_at)));

    let service = Authenticator::new(Arc::new(TestUnitOfWork::new(users, sessions)), 1_000_000_000);
    let issued = service
        .login("jdoe@example.com".to_string(), "Sup3rSecret".to_string())
        .await
        .expect("login succeeds with a capped lifetime");

    assert!(issued.expires_at <= Utc::now() + Duration::days(3650));
    assert!(issued.expires_at > Utc::now() + Duration::days(3649));
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_authenticate_live_session() {
    let user_id = Uuid::new_v4();
    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_find_by_token()
        .returning(move |_| Ok(Some(create_test_session(user_id, Utc::now() + Duration::hours(1)))));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::new(
        MockUserRepository::new(),
        sessions,
    )));
    let current = service
        .authenticate(user_id, &SessionToken::generate())
        .await
        .unwrap();

    assert_eq!(current.map(|c| c.user_id), Some(user_id));
}

#[tokio::test]
async fn test_authenticate_rejects_expired_session() {
    let user_id = Uuid::new_v4();
    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_find_by_token()
        .returning(move |_| Ok(Some(create_test_session(user_id, Utc::now() - Duration::seconds(1)))));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::new(
        MockUserRepository::new(),
        sessions,
    )));

    assert!(service
        .authenticate(user_id, &SessionToken::generate())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_authenticate_rejects_other_users_session() {
    let mut sessions = MockSessionRepository::new();
    sessions.expect_find_by_token().returning(|_| {
        Ok(Some(create_test_session(
            Uuid::new_v4(),
            Utc::now() + Duration::hours(1),
        )))
    });

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::new(
        MockUserRepository::new(),
        sessions,
    )));

    assert!(service
        .authenticate(Uuid::new_v4(), &SessionToken::generate())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_current_user_missing_row_is_unauthorized() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::with_users(users)));
    let current = CurrentUser {
        user_id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
    };

    assert!(matches!(
        service.current_user(&current).await,
        Err(AppError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_logout_deletes_session() {
    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_delete_by_token()
        .times(1)
        .returning(|_| Ok(true));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::new(
        MockUserRepository::new(),
        sessions,
    )));

    assert!(service.logout(&SessionToken::generate()).await.is_ok());
}

#[tokio::test]
async fn test_prune_expired_sessions_reports_count() {
    let mut sessions = MockSessionRepository::new();
    sessions.expect_delete_expired().returning(|_| Ok(3));

    let service = Authenticator::with_default_ttl(Arc::new(TestUnitOfWork::new(
        MockUserRepository::new(),
        sessions,
    )));

    assert_eq!(service.prune_expired_sessions().await.unwrap(), 3);
}
