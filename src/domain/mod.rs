//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod password;
pub mod registration;
pub mod session;
pub mod token;
pub mod user;

pub use password::Password;
pub use registration::{form_hints, password_complexity_hints, RegisterForm, ValidationReport};
pub use session::{CurrentUser, Session};
pub use token::SessionToken;
pub use user::{User, UserResponse};
