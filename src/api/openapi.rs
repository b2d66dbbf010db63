//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{account_handler, auth_handler, register_handler};
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{RegisterForm, UserResponse};

/// OpenAPI documentation for the signup service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Signup Service",
        version = "0.1.0",
        description = "User registration with cookie-backed sessions",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        register_handler::register_page,
        register_handler::register,
        register_handler::password_hints,
        auth_handler::login_page,
        auth_handler::login,
        auth_handler::logout,
        account_handler::get_current_user,
    ),
    components(
        schemas(
            RegisterForm,
            UserResponse,
            register_handler::HintsForm,
            register_handler::HintsResponse,
            auth_handler::LoginForm,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Registration", description = "Account creation"),
        (name = "Authentication", description = "Sign in and sign out"),
        (name = "Account", description = "Signed-in user operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for the session cookie
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE_NAME,
                    "Session cookie set by /register or /login",
                ))),
            );
        }
    }
}
