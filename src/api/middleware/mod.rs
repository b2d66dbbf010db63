//! API middleware.

mod session;

pub use session::{resolve_session, session_middleware};
