//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection and migrations
//! - Repositories for users and sessions
//! - Unit of Work for transaction management

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{SessionRepository, SessionStore, UserRepository, UserStore};
pub use unit_of_work::{
    Persistence, TransactionContext, TxFuture, TxSessionRepository, TxUserRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockSessionRepository, MockUserRepository};
