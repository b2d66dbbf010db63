//! Registration form and its validation rules.
//!
//! The pure checks live here so they can run without a store. Uniqueness is
//! layered on top by the registration service.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::config::{MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH};

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("username pattern is valid"));

/// Raw registration form as submitted by the browser.
///
/// Every field defaults to empty so a missing field becomes a validation
/// message instead of a rejected request.
#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct RegisterForm {
    #[serde(default)]
    #[schema(example = "jdoe")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "jdoe@example.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "Sup3rSecret")]
    pub password: String,
    #[serde(default, rename = "confirm-password")]
    #[schema(example = "Sup3rSecret")]
    pub confirm_password: String,
}

impl std::fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

impl RegisterForm {
    /// Username as it will be stored.
    pub fn normalized_username(&self) -> &str {
        self.username.trim()
    }

    /// Email as it will be stored and looked up.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    /// Run every store-independent check and collect the failures.
    pub fn check(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        let username = self.normalized_username();
        if username.is_empty() {
            report.push("Username is required.");
        } else {
            if username.chars().count() > MAX_USERNAME_LENGTH {
                report.push(format!(
                    "Username must be at most {} characters.",
                    MAX_USERNAME_LENGTH
                ));
            }
            if !USERNAME_PATTERN.is_match(username) {
                report.push("Username may only contain letters, numbers, '.', '_' and '-'.");
            }
        }

        let email = self.normalized_email();
        if email.is_empty() {
            report.push("Email is required.");
        } else if !email.validate_email() {
            report.push("Email address is invalid.");
        }

        if self.password.is_empty() {
            report.push("Password is required.");
        } else {
            report.extend(password_complexity_hints(&self.password));
        }

        if self.password != self.confirm_password {
            report.push("Passwords must match.");
        }

        report
    }

    /// Whether the username passed its own checks, so a uniqueness lookup is meaningful.
    pub fn username_is_well_formed(&self) -> bool {
        let username = self.normalized_username();
        !username.is_empty()
            && username.chars().count() <= MAX_USERNAME_LENGTH
            && USERNAME_PATTERN.is_match(username)
    }

    /// Whether the email passed its own checks.
    pub fn email_is_well_formed(&self) -> bool {
        let email = self.normalized_email();
        !email.is_empty() && email.validate_email()
    }
}

/// Complexity rules a password currently fails, in display order.
///
/// Shared by the validator and the live form hints.
pub fn password_complexity_hints(password: &str) -> Vec<String> {
    let mut hints = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        hints.push(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        hints.push("Include at least one uppercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        hints.push("Include at least one lowercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        hints.push("Include at least one number.".to_string());
    }

    hints
}

/// Hints shown next to the password fields while the user types.
///
/// Nothing is shown for an empty password, and the mismatch hint only
/// appears once a confirmation has been entered.
pub fn form_hints(password: &str, confirm_password: &str) -> Vec<String> {
    if password.is_empty() {
        return Vec::new();
    }

    let mut hints = password_complexity_hints(password);
    if !confirm_password.is_empty() && password != confirm_password {
        hints.push("Passwords must match.".to_string());
    }
    hints
}

/// Outcome of validating a registration attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = String>) {
        self.errors.extend(messages);
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}
