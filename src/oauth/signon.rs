//! Sign-on helper
//!
//! Drives a provider's browser login on a worker thread: fetch the
//! authorization page, hand the parsed form to the UI, post what the user
//! typed and read the token out of the final redirect. The UI talks to the
//! worker over two channels and never blocks on the network.

use std::collections::BTreeMap;
use std::fs;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use reqwest::header::LOCATION;

use crate::accounts::Provider;
use crate::config::SignonConfig;
use crate::error::{SignonError, SignonResult};

use super::login_page::LoginPage;
use super::reply::OAuthReply;

/// Progress reported by the worker
#[derive(Debug, Clone, PartialEq)]
pub enum SignonEvent {
    /// The login page is ready to be filled in
    PageLoaded(LoginPage),
    /// The provider redirected back with a token
    Finished { reply: OAuthReply, username: Option<String> },
    Failed(SignonError),
}

/// A login in progress. Dropping it abandons the login.
pub struct SignonSession {
    provider: String,
    events: Receiver<SignonEvent>,
    submit: Sender<BTreeMap<String, String>>,
}

impl SignonSession {
    /// Start logging in to `provider` on a background thread.
    pub fn start(provider: &Provider, config: &SignonConfig) -> SignonResult<Self> {
        let client = build_client(config)?;
        let (event_tx, event_rx) = mpsc::channel();
        let (submit_tx, submit_rx) = mpsc::channel();
        let worker_provider = provider.clone();

        thread::Builder::new()
            .name(format!("signon-{}", provider.name))
            .spawn(move || {
                let outcome = run_login(&client, &worker_provider, &event_tx, &submit_rx);
                match outcome {
                    Ok(Some(event)) => {
                        let _ = event_tx.send(event);
                    }
                    Ok(None) => debug!("Login to {} abandoned", worker_provider.name),
                    Err(e) => {
                        warn!("Login to {} failed: {e}", worker_provider.name);
                        let _ = event_tx.send(SignonEvent::Failed(e));
                    }
                }
            })
            .map_err(|e| SignonError::Http { url: provider.oauth.authorization_url.clone(), message: e.to_string() })?;

        Ok(Self { provider: provider.name.clone(), events: event_rx, submit: submit_tx })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Next event, if one is waiting. A worker that went away without a
    /// final event is reported as [`SignonError::Disconnected`].
    pub fn poll(&self) -> Option<SignonEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(SignonEvent::Failed(SignonError::Disconnected)),
        }
    }

    /// Send the filled-in form values to the worker.
    pub fn submit(&self, values: BTreeMap<String, String>) -> SignonResult<()> {
        self.submit.send(values).map_err(|_| SignonError::Disconnected)
    }

    /// Abandon the login. Cancelling is not an error.
    pub fn cancel(self) {
        info!("Login to {} cancelled", self.provider);
    }
}

/// Blocking HTTPS client that never follows redirects
pub fn build_client(config: &SignonConfig) -> SignonResult<Client> {
    let mut builder = Client::builder()
        .redirect(Policy::none())
        .timeout(config.request_timeout());

    if let Some(path) = &config.ca_certificate_path {
        let certificate_error = |reason: String| SignonError::Certificate {
            path: path.display().to_string(),
            reason,
        };
        let pem = fs::read(path).map_err(|e| certificate_error(e.to_string()))?;
        let certificate =
            reqwest::Certificate::from_pem(&pem).map_err(|e| certificate_error(e.to_string()))?;
        builder = builder.add_root_certificate(certificate);
    }

    Ok(builder.build()?)
}

/// Fetch and parse the provider's login page.
pub fn fetch_login_page(client: &Client, provider: &Provider) -> SignonResult<LoginPage> {
    let url = provider
        .oauth
        .authorization_request()
        .map_err(|e| SignonError::Http { url: provider.oauth.authorization_url.clone(), message: e.to_string() })?;
    debug!("Fetching login page {url}");

    let response = client.get(url.as_str()).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(SignonError::UnexpectedResponse { status: status.as_u16() });
    }
    let html = response.text()?;
    LoginPage::parse(&html, url.as_str())
}

/// Post the form and turn the provider's redirect into a reply.
pub fn submit_login(
    client: &Client,
    provider: &Provider,
    page: &LoginPage,
    values: &BTreeMap<String, String>,
) -> SignonResult<OAuthReply> {
    let pairs = page.submission(values);
    debug!("Submitting login form to {}", page.action);

    let request = if page.method == "GET" {
        client.get(page.action.as_str()).query(&pairs)
    } else {
        client.post(page.action.as_str()).form(&pairs)
    };
    let response = request.send()?;

    let status = response.status();
    if !status.is_redirection() {
        return Err(SignonError::UnexpectedResponse { status: status.as_u16() });
    }
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(SignonError::UnexpectedResponse { status: status.as_u16() })?;

    OAuthReply::from_redirect(location, &provider.oauth.redirect_uri)
}

// Ok(None) means the UI dropped its side of the session.
fn run_login(
    client: &Client,
    provider: &Provider,
    events: &Sender<SignonEvent>,
    submissions: &Receiver<BTreeMap<String, String>>,
) -> SignonResult<Option<SignonEvent>> {
    let page = fetch_login_page(client, provider)?;
    if events.send(SignonEvent::PageLoaded(page.clone())).is_err() {
        return Ok(None);
    }

    let Ok(values) = submissions.recv() else {
        return Ok(None);
    };
    let reply = submit_login(client, provider, &page, &values)?;
    let username = page.username(&values).map(str::to_string);
    info!("Login to {} finished", provider.name);

    Ok(Some(SignonEvent::Finished { reply, username }))
}
