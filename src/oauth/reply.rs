//! Tokens extracted from the provider's final redirect.

use std::collections::BTreeMap;

use url::{form_urlencoded, Url};

use crate::error::{SignonError, SignonResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthReply {
    pub access_token: String,
    /// Seconds until the token expires, when the provider said so
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
    /// Any other parameter the provider added
    pub extra: BTreeMap<String, String>,
}

impl OAuthReply {
    /// Parse the `Location` of the redirect that ends a login.
    ///
    /// The location must point at `redirect_uri`. Parameters are read from the
    /// fragment, falling back to the query string. An `error` parameter is
    /// reported as [`SignonError::Provider`].
    pub fn from_redirect(location: &str, redirect_uri: &str) -> SignonResult<Self> {
        let unexpected = || SignonError::UnexpectedRedirect {
            location: location.to_string(),
            expected: redirect_uri.to_string(),
        };

        let target = Url::parse(location).map_err(|_| unexpected())?;
        let expected = Url::parse(redirect_uri).map_err(|_| unexpected())?;
        if !same_endpoint(&target, &expected) {
            return Err(unexpected());
        }

        let raw = match target.fragment().filter(|f| !f.is_empty()) {
            Some(fragment) => fragment,
            None => target.query().unwrap_or_default(),
        };
        let mut params: BTreeMap<String, String> =
            form_urlencoded::parse(raw.as_bytes()).into_owned().collect();

        if let Some(error) = params.remove("error") {
            return Err(SignonError::Provider {
                error,
                description: params.remove("error_description"),
            });
        }

        let access_token = params
            .remove("access_token")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SignonError::MissingAccessToken { location: location.to_string() })?;
        let expires_in = params.remove("expires_in").and_then(|v| v.parse().ok());
        let token_type = params.remove("token_type");

        Ok(Self { access_token, expires_in, token_type, extra: params })
    }
}

fn same_endpoint(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
        && a.path() == b.path()
}
