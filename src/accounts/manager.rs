//! Account store with optional JSON persistence, one file per account.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{AccountError, AccountResult};

use super::account::Account;
use super::provider::Provider;

#[derive(Debug)]
pub struct AccountManager {
    accounts: BTreeMap<u32, Account>,
    next_id: u32,
    storage_dir: Option<PathBuf>,
}

impl Default for AccountManager {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl AccountManager {
    /// A store that forgets everything on exit
    pub fn in_memory() -> Self {
        Self { accounts: BTreeMap::new(), next_id: 1, storage_dir: None }
    }

    /// Open the store in `dir`, creating it when needed, and load its accounts.
    pub fn with_storage(dir: &Path) -> AccountResult<Self> {
        fs::create_dir_all(dir).map_err(|e| storage_error(dir, e))?;
        let mut manager = Self { accounts: BTreeMap::new(), next_id: 1, storage_dir: Some(dir.to_path_buf()) };
        manager.reload()?;
        Ok(manager)
    }

    /// Re-read all accounts from disk. Unreadable files are skipped.
    pub fn reload(&mut self) -> AccountResult<()> {
        let Some(dir) = self.storage_dir.clone() else {
            return Ok(());
        };
        self.accounts.clear();

        let entries = fs::read_dir(&dir).map_err(|e| storage_error(&dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| storage_error(&dir, e))?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match load_account(&path) {
                Ok(account) => {
                    self.accounts.insert(account.id, account);
                }
                Err(e) => warn!("Skipping account file {}: {e}", path.display()),
            }
        }

        self.next_id = self.accounts.keys().next_back().map_or(1, |id| id + 1);
        debug!("Loaded {} account(s) from {}", self.accounts.len(), dir.display());
        Ok(())
    }

    /// Create an account on `provider` and return its id.
    pub fn create(&mut self, provider: &Provider, display_name: &str) -> AccountResult<u32> {
        let id = self.next_id;
        let mut account = Account::new(id, provider, display_name);
        account.store_auth_parameters(provider.oauth.mechanism, &provider.oauth.account_settings());

        self.save(&account)?;
        self.accounts.insert(id, account);
        self.next_id += 1;
        info!("Created account {id} on {}", provider.name);
        Ok(id)
    }

    pub fn get(&self, id: u32) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// All accounts in creation order
    pub fn list(&self) -> Vec<&Account> {
        self.accounts.values().collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn find_by_label(&self, label: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.list_label() == label)
    }

    pub fn update(&mut self, mut account: Account) -> AccountResult<()> {
        if !self.accounts.contains_key(&account.id) {
            return Err(AccountError::NotFound { id: account.id });
        }
        account.touch();
        self.save(&account)?;
        self.accounts.insert(account.id, account);
        Ok(())
    }

    pub fn delete(&mut self, id: u32) -> AccountResult<Account> {
        let account = self.accounts.remove(&id).ok_or(AccountError::NotFound { id })?;
        if let Some(dir) = &self.storage_dir {
            let path = dir.join(account.filename());
            if path.exists() {
                fs::remove_file(&path).map_err(|e| storage_error(&path, e))?;
            }
        }
        info!("Deleted account {id}");
        Ok(account)
    }

    /// Enable, on every account, provider services the account has never
    /// recorded. Services the user switched off stay off. Returns the number
    /// of accounts changed.
    pub fn enable_new_services(&mut self, providers: &[Provider]) -> AccountResult<usize> {
        let mut changed = Vec::new();
        for account in self.accounts.values() {
            let Some(provider) = providers.iter().find(|p| p.name == account.provider) else {
                continue;
            };
            let missing: Vec<&String> =
                provider.services.iter().filter(|s| !account.services.contains_key(*s)).collect();
            if missing.is_empty() {
                continue;
            }
            let mut updated = account.clone();
            for service in missing {
                debug!("Enabling new service {service} on account {}", account.id);
                updated.services.insert(service.clone(), true);
            }
            changed.push(updated);
        }

        let count = changed.len();
        for account in changed {
            self.update(account)?;
        }
        Ok(count)
    }

    fn save(&self, account: &Account) -> AccountResult<()> {
        let Some(dir) = &self.storage_dir else {
            return Ok(());
        };
        let path = dir.join(account.filename());
        let content = serde_json::to_string_pretty(account).map_err(|e| AccountError::Storage {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&path, content).map_err(|e| storage_error(&path, e))
    }
}

fn load_account(path: &Path) -> AccountResult<Account> {
    let content = fs::read_to_string(path).map_err(|e| storage_error(path, e))?;
    serde_json::from_str(&content).map_err(|e| AccountError::Storage {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn storage_error(path: &Path, err: std::io::Error) -> AccountError {
    AccountError::Storage { path: path.display().to_string(), reason: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::OAuthMechanism;
    use tempfile::tempdir;

    #[test]
    fn test_create_list_delete_in_memory() {
        let mut manager = AccountManager::in_memory();
        let provider = Provider::fake_oauth(5120);

        let first = manager.create(&provider, "john").unwrap();
        let second = manager.create(&provider, "jane").unwrap();
        assert_eq!((first, second), (1, 2));
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.find_by_label("FakeOAuth\njohn").map(|a| a.id), Some(1));

        let removed = manager.delete(first).unwrap();
        assert_eq!(removed.display_name, "john");
        assert!(manager.find_by_label("FakeOAuth\njohn").is_none());
        assert!(matches!(manager.delete(first), Err(AccountError::NotFound { id: 1 })));
    }

    #[test]
    fn test_created_account_has_auth_settings() {
        let mut manager = AccountManager::in_memory();
        let id = manager.create(&Provider::fake_oauth(5120), "john").unwrap();
        let account = manager.get(id).unwrap();
        assert_eq!(
            account.auth_setting(OAuthMechanism::UserAgent, "RedirectUri"),
            Some("https://localhost:5120/success.html")
        );
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let provider = Provider::fake_oauth(5120);
        {
            let mut manager = AccountManager::with_storage(dir.path()).unwrap();
            manager.create(&provider, "john").unwrap();
            manager.create(&provider, "jane").unwrap();
            manager.delete(1).unwrap();
        }
        fs::write(dir.path().join("garbage.json"), "not json").unwrap();

        let mut manager = AccountManager::with_storage(dir.path()).unwrap();
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.get(2).unwrap().display_name, "jane");
        assert_eq!(manager.create(&provider, "joe").unwrap(), 3);
    }

    #[test]
    fn test_enable_new_services() {
        let mut manager = AccountManager::in_memory();
        let mut provider = Provider::fake_oauth(5120);
        let id = manager.create(&provider, "john").unwrap();

        let mut account = manager.get(id).unwrap().clone();
        account.services.insert("fakeoauth-microblog".to_string(), false);
        manager.update(account).unwrap();

        provider.services.push("fakeoauth-photos".to_string());
        assert_eq!(manager.enable_new_services(&[provider.clone()]).unwrap(), 1);
        let services = &manager.get(id).unwrap().services;
        assert_eq!(services.get("fakeoauth-photos"), Some(&true));
        assert_eq!(services.get("fakeoauth-microblog"), Some(&false));

        assert_eq!(manager.enable_new_services(&[provider]).unwrap(), 0);
    }
}
