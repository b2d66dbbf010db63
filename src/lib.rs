//! Signup Service - user registration with cookie-backed sessions
//!
//! A visitor submits a username, email and password. The input is
//! validated, the password is hashed with Argon2id, and the user row and
//! their first session are written in one transaction before the browser
//! is redirected with a session cookie.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Form validation, passwords, tokens, users and sessions
//! - **services**: Registration, sign-in and the session cookie codec
//! - **infra**: Database, migrations, repositories and the unit of work
//! - **api**: HTTP handlers, middleware, and routes
//! - **utils**: HTML page templates
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Delete expired sessions
//! cargo run -- sessions prune
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, RegisterForm, SessionToken, User};
pub use errors::{AppError, AppResult};
