//! HTML page templates.
//!
//! Deliberately plain markup: the pages only need to make the form flow
//! usable from a browser.

use crate::config::MIN_PASSWORD_LENGTH;

/// Wrap page content in the shared document shell.
fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<main>
{body}
</main>
</body>
</html>
"#
    )
}

/// Registration form with the password rules listed as hints.
pub fn register_page() -> String {
    let body = format!(
        r#"<h1>Create your account</h1>
<form method="post" action="/register">
  <p>
    <label for="username">Username</label>
    <input id="username" name="username" type="text" autocomplete="username" required>
  </p>
  <p>
    <label for="email-address">Email address</label>
    <input id="email-address" name="email" type="email" autocomplete="email" required>
  </p>
  <p>
    <label for="password">Password</label>
    <input id="password" name="password" type="password" autocomplete="new-password" required>
  </p>
  <p>
    <label for="confirm-password">Confirm Password</label>
    <input id="confirm-password" name="confirm-password" type="password" autocomplete="new-password" required>
  </p>
  <ul id="password-hints">
    <li>Password must be at least {MIN_PASSWORD_LENGTH} characters.</li>
    <li>Include at least one uppercase letter.</li>
    <li>Include at least one lowercase letter.</li>
    <li>Include at least one number.</li>
    <li>Passwords must match.</li>
  </ul>
  <button type="submit">Register</button>
</form>
<p><a href="/login">Already have an account? Sign in</a></p>"#
    );

    layout("Create your account", &body)
}

/// Sign-in form.
pub fn login_page() -> String {
    let body = r#"<h1>Sign in</h1>
<form method="post" action="/login">
  <p>
    <label for="email-address">Email address</label>
    <input id="email-address" name="email" type="email" autocomplete="email" required>
  </p>
  <p>
    <label for="password">Password</label>
    <input id="password" name="password" type="password" autocomplete="current-password" required>
  </p>
  <button type="submit">Sign in</button>
</form>
<p><a href="/register">Need an account? Register</a></p>"#;

    layout("Sign in", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_page_has_every_field() {
        let page = register_page();
        for name in ["username", "email", "password", "confirm-password"] {
            assert!(
                page.contains(&format!(r#"name="{}""#, name)),
                "missing field {}",
                name
            );
        }
        assert!(page.contains("Password must be at least 8 characters."));
        assert!(page.contains(r#"action="/register""#));
    }

    #[test]
    fn test_login_page_posts_to_login() {
        let page = login_page();
        assert!(page.contains(r#"action="/login""#));
        assert!(page.starts_with("<!DOCTYPE html>"));
    }
}
