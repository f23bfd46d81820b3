//! Application state for the Online Accounts panel
//!
//! Everything the panel shows lives here; the `ui` modules only draw it and
//! call back into the methods below.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::accounts::{all_tags, AccountManager, Provider, ProviderFilter};
use crate::config::PanelConfig;
use crate::error::{AccountError, PanelError, PanelResult};
use crate::oauth::{LoginPage, OAuthReply, SignonEvent, SignonSession};

/// Window title of the panel
pub const PANEL_TITLE: &str = "Online Accounts";

/// Name the panel is registered under in the control center
pub const PANEL_NAME: &str = "credentials";

/// What the panel opens on, from the control center's startup argument
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StartupAction {
    #[default]
    Default,
    /// `account-details=<id>`
    AccountDetails(u32),
    /// `application=<name>`: only offer providers usable by this application
    Application(String),
}

impl StartupAction {
    /// Parse the argument following the panel name. Unknown arguments are
    /// ignored with a warning.
    pub fn parse(argument: Option<&str>) -> Self {
        let Some(argument) = argument else {
            return StartupAction::Default;
        };
        match argument.split_once('=') {
            Some(("account-details", id)) => match id.parse() {
                Ok(id) => StartupAction::AccountDetails(id),
                Err(_) => {
                    warn!("Ignoring account-details with bad id '{id}'");
                    StartupAction::Default
                }
            },
            Some(("application", name)) if !name.is_empty() => StartupAction::Application(name.to_string()),
            _ => {
                warn!("Ignoring unknown startup argument '{argument}'");
                StartupAction::Default
            }
        }
    }
}

/// Which page the main area shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    AccountList,
    AddAccount,
    Authorizing,
    AccountDetails(u32),
}

/// A login started from the "add account" view
pub struct ActiveSignon {
    pub provider: Provider,
    pub session: SignonSession,
    /// Set once the worker delivered the page
    pub page: Option<LoginPage>,
    /// Field name to what the user typed
    pub values: BTreeMap<String, String>,
    pub submitted: bool,
}

pub struct CredentialsPanel {
    pub config: PanelConfig,
    pub accounts: AccountManager,
    pub view: View,
    pub provider_filter: ProviderFilter,
    /// Application the panel was opened for, if any
    pub application: Option<String>,
    pub signon: Option<ActiveSignon>,
    /// Account waiting for removal confirmation
    pub confirm_remove: Option<u32>,
    pub error_message: Option<String>,
}

impl CredentialsPanel {
    pub fn new(config: PanelConfig, accounts: AccountManager, startup: StartupAction) -> Self {
        let mut panel = Self {
            config,
            accounts,
            view: View::AccountList,
            provider_filter: ProviderFilter::All,
            application: None,
            signon: None,
            confirm_remove: None,
            error_message: None,
        };

        match startup {
            StartupAction::Default => {}
            StartupAction::AccountDetails(id) => {
                if panel.accounts.get(id).is_some() {
                    panel.view = View::AccountDetails(id);
                } else {
                    warn!("Account {id} requested at startup does not exist");
                }
            }
            StartupAction::Application(name) => {
                panel.view = View::AddAccount;
                panel.application = Some(name);
            }
        }
        panel
    }

    /// Open the panel from configuration, with persistent accounts when a
    /// directory is configured.
    pub fn from_config(config: PanelConfig, startup: StartupAction) -> PanelResult<Self> {
        let mut accounts = match &config.accounts_dir {
            Some(dir) => AccountManager::with_storage(dir)?,
            None => AccountManager::in_memory(),
        };
        let enabled = accounts.enable_new_services(&config.providers)?;
        if enabled > 0 {
            info!("Enabled new services on {enabled} account(s)");
        }
        Ok(Self::new(config, accounts, startup))
    }

    pub fn title(&self) -> &'static str {
        PANEL_TITLE
    }

    /// Providers offered in the "add account" view
    pub fn visible_providers(&self) -> Vec<&Provider> {
        self.config
            .providers
            .iter()
            .filter(|p| self.provider_filter.matches(p))
            .filter(|p| match &self.application {
                Some(application) => p.supports_application(application),
                None => true,
            })
            .collect()
    }

    /// Entries of the provider filter menu
    pub fn filter_options(&self) -> Vec<ProviderFilter> {
        std::iter::once(ProviderFilter::All)
            .chain(all_tags(&self.config.providers).into_iter().map(ProviderFilter::Tag))
            .collect()
    }

    pub fn open_add_account(&mut self) {
        self.view = View::AddAccount;
        self.error_message = None;
    }

    pub fn open_account(&mut self, id: u32) {
        self.view = View::AccountDetails(id);
    }

    /// Start signing in to the named provider.
    pub fn select_provider(&mut self, name: &str) {
        let Some(provider) = self.config.provider(name).cloned() else {
            self.report(AccountError::UnknownProvider { provider: name.to_string() }.into());
            return;
        };
        self.cancel_signon();

        match SignonSession::start(&provider, &self.config.signon) {
            Ok(session) => {
                info!("Authorizing with {}", provider.display_name);
                self.signon = Some(ActiveSignon {
                    provider,
                    session,
                    page: None,
                    values: BTreeMap::new(),
                    submitted: false,
                });
                self.view = View::Authorizing;
                self.error_message = None;
            }
            Err(e) => self.report(e.into()),
        }
    }

    /// Send the login form filled in so far.
    pub fn submit_login(&mut self) {
        let Some(signon) = self.signon.as_mut() else {
            return;
        };
        if signon.submitted || signon.page.is_none() {
            return;
        }
        signon.submitted = true;
        if let Err(e) = signon.session.submit(signon.values.clone()) {
            self.signon = None;
            self.view = View::AddAccount;
            self.report(e.into());
        }
    }

    /// Abandon the login in progress, if any.
    pub fn cancel_signon(&mut self) {
        if let Some(signon) = self.signon.take() {
            signon.session.cancel();
            if self.view == View::Authorizing {
                self.view = View::AddAccount;
            }
        }
    }

    /// Apply whatever the sign-on worker reported since the last frame.
    pub fn poll_signon(&mut self) {
        let Some(signon) = self.signon.as_mut() else {
            return;
        };
        let Some(event) = signon.session.poll() else {
            return;
        };

        match event {
            SignonEvent::PageLoaded(page) => signon.page = Some(page),
            SignonEvent::Finished { reply, username } => {
                if let Some(signon) = self.signon.take() {
                    self.finish_signon(&signon.provider, &reply, username);
                }
            }
            SignonEvent::Failed(e) => {
                self.signon = None;
                self.view = View::AddAccount;
                self.report(e.into());
            }
        }
    }

    fn finish_signon(&mut self, provider: &Provider, reply: &OAuthReply, username: Option<String>) {
        let display_name = username.unwrap_or_else(|| provider.display_name.clone());
        debug!("Received token for {display_name} expiring in {:?}s", reply.expires_in);
        match self.accounts.create(provider, &display_name) {
            Ok(id) => self.view = View::AccountDetails(id),
            Err(e) => {
                self.view = View::AccountList;
                self.report(e.into());
            }
        }
    }

    pub fn request_remove(&mut self, id: u32) {
        self.confirm_remove = Some(id);
    }

    /// Remove the account waiting for confirmation.
    pub fn confirm_removal(&mut self) {
        let Some(id) = self.confirm_remove.take() else {
            return;
        };
        match self.accounts.delete(id) {
            Ok(_) => {
                if self.view == View::AccountDetails(id) {
                    self.view = View::AccountList;
                }
            }
            Err(e) => self.report(e.into()),
        }
    }

    pub fn set_service_enabled(&mut self, id: u32, service: &str, enabled: bool) {
        let Some(mut account) = self.accounts.get(id).cloned() else {
            return;
        };
        account.services.insert(service.to_string(), enabled);
        if let Err(e) = self.accounts.update(account) {
            self.report(e.into());
        }
    }

    pub fn set_account_enabled(&mut self, id: u32, enabled: bool) {
        let Some(mut account) = self.accounts.get(id).cloned() else {
            return;
        };
        account.enabled = enabled;
        if let Err(e) = self.accounts.update(account) {
            self.report(e.into());
        }
    }

    fn report(&mut self, error: PanelError) {
        warn!("{error}");
        self.error_message = Some(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(startup: StartupAction) -> CredentialsPanel {
        CredentialsPanel::new(PanelConfig::default(), AccountManager::in_memory(), startup)
    }

    #[test]
    fn test_parse_startup_action() {
        assert_eq!(StartupAction::parse(None), StartupAction::Default);
        assert_eq!(StartupAction::parse(Some("account-details=3")), StartupAction::AccountDetails(3));
        assert_eq!(
            StartupAction::parse(Some("application=integration-tests")),
            StartupAction::Application("integration-tests".to_string())
        );
        assert_eq!(StartupAction::parse(Some("account-details=x")), StartupAction::Default);
        assert_eq!(StartupAction::parse(Some("bogus")), StartupAction::Default);
    }

    #[test]
    fn test_startup_account_details() {
        let mut accounts = AccountManager::in_memory();
        let id = accounts.create(&Provider::fake_oauth(5120), "john").unwrap();
        let panel = CredentialsPanel::new(PanelConfig::default(), accounts, StartupAction::AccountDetails(id));
        assert_eq!(panel.view, View::AccountDetails(id));

        let panel = CredentialsPanel::new(
            PanelConfig::default(),
            AccountManager::in_memory(),
            StartupAction::AccountDetails(42),
        );
        assert_eq!(panel.view, View::AccountList);
    }

    #[test]
    fn test_application_filter() {
        let panel = panel(StartupAction::Application("integration-tests".to_string()));
        assert_eq!(panel.view, View::AddAccount);
        assert_eq!(panel.visible_providers().len(), 1);

        let panel = panel_for("mail");
        assert!(panel.visible_providers().is_empty());
    }

    fn panel_for(application: &str) -> CredentialsPanel {
        panel(StartupAction::Application(application.to_string()))
    }

    #[test]
    fn test_filter_options() {
        let panel = panel(StartupAction::Default);
        assert_eq!(
            panel.filter_options(),
            vec![ProviderFilter::All, ProviderFilter::Tag("IntegrationTests".to_string())]
        );
    }

    #[test]
    fn test_confirm_removal() {
        let mut panel = panel(StartupAction::Default);
        let id = panel.accounts.create(&Provider::fake_oauth(5120), "john").unwrap();
        panel.open_account(id);
        panel.request_remove(id);
        panel.confirm_removal();
        assert!(panel.accounts.is_empty());
        assert_eq!(panel.view, View::AccountList);
        assert_eq!(panel.confirm_remove, None);
    }

    #[test]
    fn test_unknown_provider_reports_error() {
        let mut panel = panel(StartupAction::Default);
        panel.select_provider("nope");
        assert!(panel.error_message.is_some());
        assert!(panel.signon.is_none());
    }
}
