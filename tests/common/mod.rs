//! Shared fixtures: a mock login server on a free port and TLS trust for it.
#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use credentials_panel::accounts::Provider;
use credentials_panel::config::{MockServerConfig, PanelConfig, SignonConfig};
use credentials_panel::oauth::{SignonEvent, SignonSession};
use credentials_panel::{LoginServer, ServerHandle};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

pub fn server_config() -> MockServerConfig {
    MockServerConfig {
        port: 0,
        certificate_path: fixture("uoa-test-server.pem"),
        ..MockServerConfig::default()
    }
}

/// Start a login server on a port of its own
pub fn start_server() -> ServerHandle {
    init_logging();
    LoginServer::bind(&server_config())
        .expect("bind mock login server")
        .run()
        .expect("start mock login server")
}

/// Sign-on settings trusting the fixture CA
pub fn signon_config() -> SignonConfig {
    SignonConfig { ca_certificate_path: Some(fixture("uoa-test-ca.pem")), ..SignonConfig::default() }
}

/// Panel configuration pointing the test provider at `server`
pub fn panel_config(server: &ServerHandle) -> PanelConfig {
    PanelConfig {
        server: server_config(),
        signon: signon_config(),
        providers: vec![Provider::fake_oauth(server.port())],
        accounts_dir: None,
    }
}

pub fn client() -> reqwest::blocking::Client {
    credentials_panel::oauth::signon::build_client(&signon_config()).expect("build client")
}

/// Wait for the sign-on worker's next event
pub fn next_event(session: &SignonSession, timeout: Duration) -> Option<SignonEvent> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(event) = session.poll() {
            return Some(event);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    None
}
