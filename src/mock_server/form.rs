//! Decoding of the submitted login form.
//!
//! Browsers post the form either url-encoded or as multipart; both end up in
//! a `LoginForm` whose fields stay optional until `credentials()` checks them.

use url::form_urlencoded;

use crate::error::{FormError, FormResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// A validated username/password pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// Decode `body` according to the request's Content-Type.
    /// A missing Content-Type is treated as url-encoded.
    pub fn parse(content_type: Option<&str>, body: &[u8]) -> FormResult<Self> {
        let content_type = content_type.unwrap_or("application/x-www-form-urlencoded");
        let mut params = content_type.split(';').map(str::trim);
        let mime = params.next().unwrap_or_default().to_ascii_lowercase();

        match mime.as_str() {
            "application/x-www-form-urlencoded" => Ok(Self::from_urlencoded(body)),
            "multipart/form-data" => {
                let boundary = params
                    .filter_map(|p| p.split_once('='))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("boundary"))
                    .map(|(_, v)| v.trim().trim_matches('"').to_string())
                    .filter(|b| !b.is_empty())
                    .ok_or(FormError::MissingBoundary)?;
                Self::from_multipart(body, &boundary)
            }
            _ => Err(FormError::UnsupportedContentType { content_type: content_type.to_string() }),
        }
    }

    pub fn from_urlencoded(body: &[u8]) -> Self {
        let mut form = LoginForm::default();
        for (name, value) in form_urlencoded::parse(body) {
            form.assign(&name, value.into_owned());
        }
        form
    }

    pub fn from_multipart(body: &[u8], boundary: &str) -> FormResult<Self> {
        let body = std::str::from_utf8(body).map_err(|e| FormError::MalformedBody {
            reason: e.to_string(),
        })?;
        let delimiter = format!("--{boundary}");
        let mut form = LoginForm::default();

        // The preamble before the first delimiter is ignored.
        for part in body.split(delimiter.as_str()).skip(1) {
            if part.starts_with("--") {
                break;
            }
            let part = part.strip_prefix("\r\n").unwrap_or(part);
            let (headers, value) = part.split_once("\r\n\r\n").ok_or_else(|| FormError::MalformedBody {
                reason: "multipart part without header terminator".to_string(),
            })?;
            let value = value.strip_suffix("\r\n").unwrap_or(value);

            if let Some(name) = disposition_name(headers) {
                form.assign(&name, value.to_string());
            }
        }

        Ok(form)
    }

    /// Both fields, or the first one that is missing
    pub fn credentials(self) -> FormResult<Credentials> {
        let username = self.username.ok_or(FormError::MissingField { field: "username" })?;
        let password = self.password.ok_or(FormError::MissingField { field: "password" })?;
        reject_control_characters("username", &username)?;
        reject_control_characters("password", &password)?;
        Ok(Credentials { username, password })
    }

    // Repeated fields keep their first value.
    fn assign(&mut self, name: &str, value: String) {
        let slot = match name {
            "username" => &mut self.username,
            "password" => &mut self.password,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }
}

// Both values end up in a response header.
fn reject_control_characters(field: &'static str, value: &str) -> FormResult<()> {
    if value.chars().any(char::is_control) {
        return Err(FormError::InvalidCharacter { field });
    }
    Ok(())
}

fn disposition_name(headers: &str) -> Option<String> {
    let disposition = headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim().eq_ignore_ascii_case("content-disposition").then_some(value)
    })?;

    disposition
        .split(';')
        .map(str::trim)
        .filter_map(|p| p.split_once('='))
        .find(|(k, _)| k.trim() == "name")
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urlencoded() {
        let form = LoginForm::parse(
            Some("application/x-www-form-urlencoded"),
            b"username=john&password=loser",
        )
        .unwrap();
        assert_eq!(form.username.as_deref(), Some("john"));
        assert_eq!(form.password.as_deref(), Some("loser"));
    }

    #[test]
    fn test_urlencoded_decodes_escapes() {
        let form = LoginForm::from_urlencoded(b"username=j%40hn+doe&password=a%26b");
        assert_eq!(form.username.as_deref(), Some("j@hn doe"));
        assert_eq!(form.password.as_deref(), Some("a&b"));
    }

    #[test]
    fn test_missing_content_type_is_urlencoded() {
        let form = LoginForm::parse(None, b"username=a&password=b").unwrap();
        assert_eq!(form.credentials().unwrap().username, "a");
    }

    #[test]
    fn test_multipart() {
        let body = "--XyZ\r\n\
                    Content-Disposition: form-data; name=\"username\"\r\n\r\n\
                    john\r\n\
                    --XyZ\r\n\
                    Content-Disposition: form-data; name=\"password\"\r\n\r\n\
                    loser\r\n\
                    --XyZ--\r\n";
        let form = LoginForm::parse(Some("multipart/form-data; boundary=XyZ"), body.as_bytes()).unwrap();
        assert_eq!(
            form.credentials().unwrap(),
            Credentials { username: "john".to_string(), password: "loser".to_string() }
        );
    }

    #[test]
    fn test_multipart_without_boundary() {
        assert_eq!(
            LoginForm::parse(Some("multipart/form-data"), b""),
            Err(FormError::MissingBoundary)
        );
    }

    #[test]
    fn test_unsupported_content_type() {
        assert!(matches!(
            LoginForm::parse(Some("application/json"), b"{}"),
            Err(FormError::UnsupportedContentType { .. })
        ));
    }

    #[test]
    fn test_missing_password() {
        let form = LoginForm::from_urlencoded(b"username=john");
        assert_eq!(form.credentials(), Err(FormError::MissingField { field: "password" }));
    }

    #[test]
    fn test_control_characters_rejected() {
        let form = LoginForm::from_urlencoded(b"username=a%0D%0ASet-Cookie:%20x=1&password=pw");
        assert_eq!(form.credentials(), Err(FormError::InvalidCharacter { field: "username" }));

        let form = LoginForm::from_urlencoded(b"username=john&password=lo%00ser");
        assert_eq!(form.credentials(), Err(FormError::InvalidCharacter { field: "password" }));
    }

    #[test]
    fn test_empty_values_are_present() {
        let creds = LoginForm::from_urlencoded(b"username=&password=").credentials().unwrap();
        assert_eq!(creds.username, "");
        assert_eq!(creds.password, "");
    }

    #[test]
    fn test_first_value_wins() {
        let form = LoginForm::from_urlencoded(b"username=first&username=second&password=p");
        assert_eq!(form.username.as_deref(), Some("first"));
    }
}
