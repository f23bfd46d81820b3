//! Online Accounts control panel with a mock OAuth login server.

/// Error types shared by every module
pub mod error;

/// JSON configuration with environment overrides
pub mod config;

/// One-shot signal events used to observe the login server
pub mod event;

/// MOCK LOGIN SERVER: HTTPS stand-in for a provider's browser login
pub mod mock_server;

/// OAuth parameters, login page scraping and the sign-on helper
pub mod oauth;

/// Accounts, providers and the account store
pub mod accounts;

/// Application state management
pub mod app_state;

/// eframe integration and frame layout
pub mod app;

/// UI components
pub mod ui;

pub use app_state::{CredentialsPanel, StartupAction, View, PANEL_NAME, PANEL_TITLE};
pub use config::PanelConfig;
pub use error::{PanelError, PanelResult};
pub use event::SignalEvent;
pub use mock_server::{LoginServer, ServerHandle};
