//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

pub mod entities;
mod session_repository;
mod user_repository;

pub use session_repository::{SessionRepository, SessionStore};
pub use user_repository::{UserRepository, UserStore};

pub(crate) use session_repository::new_session_model;
pub(crate) use user_repository::new_user_model;

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use session_repository::MockSessionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
