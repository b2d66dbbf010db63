//! Session repository - persistence for session records keyed by token.
//!
//! Callers pass raw tokens; only their digests reach the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use uuid::Uuid;

use super::entities::session::{self, ActiveModel, Entity as SessionEntity};
use crate::domain::{Session, SessionToken};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Session repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a session for `user_id` that expires at `expires_at`
    async fn create(
        &self,
        user_id: Uuid,
        token: &SessionToken,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session>;

    /// Find the session for a presented token, expired or not
    async fn find_by_token(&self, token: &SessionToken) -> AppResult<Option<Session>>;

    /// Delete the session for a token; returns whether a row was removed
    async fn delete_by_token(&self, token: &SessionToken) -> AppResult<bool>;

    /// Delete every session that expired before `now`; returns the count
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Concrete implementation of SessionRepository
pub struct SessionStore {
    db: Arc<DatabaseConnection>,
}

impl SessionStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// Build the active model for a new session row.
pub(crate) fn new_session_model(
    user_id: Uuid,
    token: &SessionToken,
    expires_at: DateTime<Utc>,
) -> ActiveModel {
    ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        token_hash: Set(token.digest()),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now()),
    }
}

#[async_trait]
impl SessionRepository for SessionStore {
    async fn create(
        &self,
        user_id: Uuid,
        token: &SessionToken,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        let model = new_session_model(user_id, token, expires_at)
            .insert(&*self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Session::from(model))
    }

    async fn find_by_token(&self, token: &SessionToken) -> AppResult<Option<Session>> {
        let result = SessionEntity::find()
            .filter(session::Column::TokenHash.eq(token.digest()))
            .one(&*self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Session::from))
    }

    async fn delete_by_token(&self, token: &SessionToken) -> AppResult<bool> {
        let result = SessionEntity::delete_many()
            .filter(session::Column::TokenHash.eq(token.digest()))
            .exec(&*self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = SessionEntity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(&*self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }
}
