//! Account providers known to the panel.

use serde::{Deserialize, Serialize};

use crate::oauth::{OAuthMechanism, OAuthParams};

/// Tag carried by providers that only exist for integration testing
pub const INTEGRATION_TESTS_TAG: &str = "IntegrationTests";

/// A service an account can be created on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Identifier stored on accounts
    pub name: String,
    /// Name shown to the user
    pub display_name: String,
    /// Tags used by the provider filter
    #[serde(default)]
    pub tags: Vec<String>,
    /// Applications that can use accounts of this provider
    #[serde(default)]
    pub applications: Vec<String>,
    /// Services enabled on new accounts
    #[serde(default)]
    pub services: Vec<String>,
    pub oauth: OAuthParams,
}

impl Provider {
    /// The test provider backed by the mock login server on `port`
    pub fn fake_oauth(port: u16) -> Self {
        Self {
            name: "fakeoauth".to_string(),
            display_name: "FakeOAuth".to_string(),
            tags: vec![INTEGRATION_TESTS_TAG.to_string()],
            applications: vec!["integration-tests".to_string()],
            services: vec!["fakeoauth-microblog".to_string()],
            oauth: OAuthParams {
                mechanism: OAuthMechanism::UserAgent,
                authorization_url: format!("https://localhost:{port}/"),
                redirect_uri: format!("https://localhost:{port}/success.html"),
                client_id: "credentials-panel".to_string(),
                scopes: vec!["read".to_string()],
            },
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn supports_application(&self, application: &str) -> bool {
        self.applications.iter().any(|a| a == application)
    }
}

/// Which providers the "add account" view lists
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderFilter {
    #[default]
    All,
    Tag(String),
}

impl ProviderFilter {
    pub fn label(&self) -> &str {
        match self {
            ProviderFilter::All => "all",
            ProviderFilter::Tag(tag) => tag,
        }
    }

    pub fn matches(&self, provider: &Provider) -> bool {
        match self {
            ProviderFilter::All => true,
            ProviderFilter::Tag(tag) => provider.has_tag(tag),
        }
    }
}

/// Every tag used by `providers`, sorted, without duplicates
pub fn all_tags(providers: &[Provider]) -> Vec<String> {
    let mut tags: Vec<String> = providers.iter().flat_map(|p| p.tags.iter().cloned()).collect();
    tags.sort();
    tags.dedup();
    tags
}
