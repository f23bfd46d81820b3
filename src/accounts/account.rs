//! A configured online account.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::oauth::OAuthMechanism;

use super::provider::Provider;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: u32,
    /// Name of the provider the account belongs to
    pub provider: String,
    /// Provider name as shown to the user, kept for providers that go away
    pub provider_display_name: String,
    /// Usually the login name typed during sign-on
    pub display_name: String,
    pub enabled: bool,
    /// Set when the stored credentials stopped working
    #[serde(default)]
    pub need_authentication: bool,
    /// Service name to enabled flag
    #[serde(default)]
    pub services: BTreeMap<String, bool>,
    /// Free-form settings, authentication parameters under `auth/...`
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(id: u32, provider: &Provider, display_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            provider: provider.name.clone(),
            provider_display_name: provider.display_name.clone(),
            display_name: display_name.to_string(),
            enabled: true,
            need_authentication: false,
            services: provider.services.iter().map(|s| (s.clone(), true)).collect(),
            settings: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Text of the account's entry in the account list
    pub fn list_label(&self) -> String {
        format!("{}\n{}", self.provider_display_name, self.display_name)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Replace every setting of `mechanism` with `params`.
    pub fn store_auth_parameters(&mut self, mechanism: OAuthMechanism, params: &BTreeMap<String, String>) {
        let prefix = format!("{}/", mechanism.settings_prefix());
        self.settings.retain(|key, _| !key.starts_with(&prefix));
        for (key, value) in params {
            self.settings.insert(format!("{prefix}{key}"), value.clone());
        }
    }

    pub fn auth_setting(&self, mechanism: OAuthMechanism, key: &str) -> Option<&str> {
        self.settings
            .get(&format!("{}/{key}", mechanism.settings_prefix()))
            .map(String::as_str)
    }

    /// Name of the file the account is persisted to
    pub fn filename(&self) -> String {
        format!("account-{}.json", self.id)
    }
}
