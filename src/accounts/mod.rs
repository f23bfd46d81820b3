//! Online accounts and the providers they are created on.

pub mod account;
pub mod manager;
pub mod provider;

pub use account::Account;
pub use manager::AccountManager;
pub use provider::{all_tags, Provider, ProviderFilter, INTEGRATION_TESTS_TAG};
