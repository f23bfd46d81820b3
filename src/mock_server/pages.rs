//! Content served by the mock login server.

use percent_encoding::{utf8_percent_encode, CONTROLS};

use super::form::Credentials;

/// Lifetime advertised with every fabricated token
pub const TOKEN_EXPIRES_IN: u32 = 3600;

pub const LOGIN_ROUTE: &str = "/login.html";
pub const SUCCESS_ROUTE: &str = "/success.html";

/// The login form; it posts back to this server's `/login.html`.
pub fn login_page(port: u16) -> String {
    format!(
        r#"
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN"
  "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Login here</title></head>
<body>
<h3>Login form</h3>
<form method="POST" action="https://localhost:{port}{LOGIN_ROUTE}">
  Username: <input type="text" name="username" size="15" /><br />
  Password: <input type="password" name="password" size="15" /><br />
  <p><input type="submit" value="Login" /></p>
</form>
</body>
</html>
"#
    )
}

/// Where a successful login is sent.
///
/// The token is the plain concatenation of username and password. Printable
/// ASCII is inserted without escaping; anything else is percent-encoded so the
/// value stays a legal header.
pub fn success_location(port: u16, credentials: &Credentials) -> String {
    format!(
        "https://localhost:{port}{SUCCESS_ROUTE}#access_token={}{}&expires_in={TOKEN_EXPIRES_IN}",
        utf8_percent_encode(&credentials.username, CONTROLS),
        utf8_percent_encode(&credentials.password, CONTROLS),
    )
}
