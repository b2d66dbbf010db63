//! Authentication service - registration, sign-in and session resolution.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{DEFAULT_SESSION_TTL_DAYS, MAX_SESSION_TTL_DAYS};
use crate::domain::{
    CurrentUser, Password, RegisterForm, SessionToken, User, ValidationReport,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// A session handed out by registration or login.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: User,
    pub token: SessionToken,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Run every registration check, including username/email uniqueness.
    async fn validate_registration(&self, form: &RegisterForm) -> AppResult<ValidationReport>;

    /// Register a new user and open their first session
    async fn register(&self, form: RegisterForm) -> AppResult<IssuedSession>;

    /// Verify credentials and open a session
    async fn login(&self, email: String, password: String) -> AppResult<IssuedSession>;

    /// Resolve a presented session to its user, if live.
    async fn authenticate(&self, user_id: Uuid, token: &SessionToken) -> AppResult<Option<CurrentUser>>;

    /// Load the user behind an authenticated session
    async fn current_user(&self, current: &CurrentUser) -> AppResult<User>;

    /// End a session
    async fn logout(&self, token: &SessionToken) -> AppResult<()>;

    /// Delete sessions past their expiry; returns how many were removed
    async fn prune_expired_sessions(&self) -> AppResult<u64>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    session_ttl: Duration,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    ///
    /// The lifetime is clamped to `1..=MAX_SESSION_TTL_DAYS` days.
    pub fn new(uow: Arc<U>, session_ttl_days: i64) -> Self {
        let days = session_ttl_days.clamp(1, MAX_SESSION_TTL_DAYS);
        let session_ttl = Duration::try_days(days)
            .unwrap_or_else(|| Duration::days(DEFAULT_SESSION_TTL_DAYS));

        Self { uow, session_ttl }
    }

    /// Auth service with the default 30 day session lifetime
    pub fn with_default_ttl(uow: Arc<U>) -> Self {
        Self::new(uow, DEFAULT_SESSION_TTL_DAYS)
    }

    fn session_expiry(&self) -> AppResult<DateTime<Utc>> {
        Utc::now()
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| AppError::internal("Session expiry is out of range"))
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn validate_registration(&self, form: &RegisterForm) -> AppResult<ValidationReport> {
        let mut report = form.check();

        if form.username_is_well_formed()
            && self
                .uow
                .users()
                .find_by_username(form.normalized_username())
                .await?
                .is_some()
        {
            report.push("Username is already taken.");
        }

        if form.email_is_well_formed()
            && self
                .uow
                .users()
                .find_by_email(&form.normalized_email())
                .await?
                .is_some()
        {
            report.push("An account with that email already exists.");
        }

        Ok(report)
    }

    async fn register(&self, form: RegisterForm) -> AppResult<IssuedSession> {
        let report = self.validate_registration(&form).await?;
        if !report.is_valid() {
            tracing::debug!(errors = report.errors().len(), "Registration rejected");
            return Err(AppError::Validation(report.into_errors()));
        }

        let username = form.normalized_username().to_string();
        let email = form.normalized_email();
        let password_hash = Password::hash(&form.password)?.into_string();
        let token = SessionToken::generate();
        let expires_at = self.session_expiry()?;

        let session_token = token.clone();
        let user = with_transaction!(self.uow, |ctx| {
            let user = ctx.users().create(username, email, password_hash).await?;
            ctx.sessions()
                .create(user.id, &session_token, expires_at)
                .await?;
            Ok::<User, AppError>(user)
        })?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(IssuedSession {
            user,
            token,
            expires_at,
        })
    }

    async fn login(&self, email: String, password: String) -> AppResult<IssuedSession> {
        let email = email.trim().to_lowercase();
        let user = self.uow.users().find_by_email(&email).await?;

        // Verify against a dummy hash when the user is unknown so that the
        // response time does not reveal which emails are registered.
        let stored = match &user {
            Some(user) => Password::from_hash(user.password_hash.clone()),
            None => Password::dummy(),
        };
        let password_valid = stored.verify(&password);

        let user = match user {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        let token = SessionToken::generate();
        let expires_at = self.session_expiry()?;
        self.uow
            .sessions()
            .create(user.id, &token, expires_at)
            .await?;

        tracing::info!(user_id = %user.id, "User signed in");

        Ok(IssuedSession {
            user,
            token,
            expires_at,
        })
    }

    async fn authenticate(&self, user_id: Uuid, token: &SessionToken) -> AppResult<Option<CurrentUser>> {
        let Some(session) = self.uow.sessions().find_by_token(token).await? else {
            return Ok(None);
        };

        if session.user_id != user_id {
            tracing::warn!(session_id = %session.id, "Session presented for a different user");
            return Ok(None);
        }

        if session.is_expired() {
            tracing::debug!(session_id = %session.id, "Session expired");
            return Ok(None);
        }

        Ok(Some(CurrentUser {
            user_id,
            session_id: session.id,
        }))
    }

    async fn current_user(&self, current: &CurrentUser) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(current.user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    async fn logout(&self, token: &SessionToken) -> AppResult<()> {
        if self.uow.sessions().delete_by_token(token).await? {
            tracing::info!("Session ended");
        }
        Ok(())
    }

    async fn prune_expired_sessions(&self) -> AppResult<u64> {
        let removed = self.uow.sessions().delete_expired(Utc::now()).await?;
        tracing::info!(removed, "Expired sessions pruned");
        Ok(removed)
    }
}
