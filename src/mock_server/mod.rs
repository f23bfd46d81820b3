//! Mock OAuth login server
//!
//! Stands in for a remote identity provider's browser login: `GET` serves a
//! login form, `POST` takes the credentials and redirects to the success page
//! with a fabricated access token in the fragment. Two [`SignalEvent`]s tell
//! the test thread when the page has been served and when the credentials
//! arrived.
//!
//! HTTP and TLS are handled by `tiny_http`. Requests are served one at a time
//! on a detached background thread; the thread lives until the process exits.

pub mod form;
pub mod pages;
pub mod tls;

use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};
use tiny_http::{Header, Method, Server};

use crate::config::MockServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::event::SignalEvent;

pub use form::{Credentials, LoginForm};

/// Request bodies are read up to this size; a login form is far smaller.
pub const MAX_BODY_SIZE: u64 = 64 * 1024;

/// The two lifecycle events of a login
#[derive(Debug, Default)]
pub struct LoginEvents {
    /// The login page has been sent
    pub show_login: SignalEvent,
    /// Credentials have been submitted and the redirect sent
    pub login_done: SignalEvent,
}

/// Which event a handled request fires once its response is on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    PageShown,
    LoginDone,
}

impl LoginEvents {
    fn fire(&self, signal: Signal) {
        match signal {
            Signal::PageShown => self.show_login.set(),
            Signal::LoginDone => self.login_done.set(),
        }
    }
}

/// A routed response, before it is put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl LoginReply {
    fn new(status: u16) -> Self {
        Self { status, headers: Vec::new(), body: Vec::new() }
    }

    fn html(page: String) -> Self {
        Self::new(200)
            .with_header("Content-Type", "text/html")
            .with_header("Content-Encoding", "utf-8")
            .with_body(page.into_bytes())
    }

    fn redirect(location: String) -> Self {
        Self::new(301).with_header("Location", location)
    }

    fn text(status: u16, message: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain")
            .with_body(message.as_bytes().to_vec())
    }

    fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Convert into a `tiny_http` response. Fails if a header value is not ASCII.
    pub fn into_response(self) -> ServerResult<tiny_http::Response<Cursor<Vec<u8>>>> {
        let mut response = tiny_http::Response::from_data(self.body).with_status_code(self.status);
        for (name, value) in &self.headers {
            let header = Header::from_bytes(name.as_bytes(), value.as_bytes())
                .map_err(|()| ServerError::InvalidHeader { name: name.to_string() })?;
            response = response.with_header(header);
        }
        Ok(response)
    }
}

/// Route a request. The returned signal must be fired after the response is sent.
pub fn handle_request(
    method: &Method,
    content_type: Option<&str>,
    body: &[u8],
    port: u16,
) -> (LoginReply, Option<Signal>) {
    match method {
        Method::Get => (LoginReply::html(pages::login_page(port)), Some(Signal::PageShown)),
        Method::Head => (LoginReply::new(200).with_header("Content-Type", "text/html"), None),
        Method::Post => {
            let form = LoginForm::parse(content_type, body).and_then(LoginForm::credentials);
            match form {
                Ok(credentials) => {
                    debug!("Login submitted for user '{}'", credentials.username);
                    let location = pages::success_location(port, &credentials);
                    (LoginReply::redirect(location), Some(Signal::LoginDone))
                }
                Err(e) => {
                    warn!("Rejecting login submission: {e}");
                    (LoginReply::text(400, &e.to_string()), None)
                }
            }
        }
        other => (LoginReply::text(501, &format!("Unsupported method ({other})")), None),
    }
}

/// A bound, not yet running login server
pub struct LoginServer {
    server: Server,
    port: u16,
    events: Arc<LoginEvents>,
}

impl LoginServer {
    /// Load the certificate and bind the listening socket. Bind failures are
    /// returned as-is; there is no retry.
    pub fn bind(config: &MockServerConfig) -> ServerResult<Self> {
        let ssl = tls::load_ssl_config(&config.certificate_path)?;

        let address = config.address();
        let server = Server::https(address.as_str(), ssl)
            .map_err(|source| ServerError::Bind { address: address.clone(), source })?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "login server has no TCP address"))?;

        Ok(Self { server, port, events: Arc::new(LoginEvents::default()) })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn events(&self) -> Arc<LoginEvents> {
        Arc::clone(&self.events)
    }

    /// Start serving on a detached background thread.
    pub fn run(self) -> ServerResult<ServerHandle> {
        let port = self.port;
        let events = Arc::clone(&self.events);

        thread::Builder::new()
            .name("mock-login-server".to_string())
            .spawn(move || self.serve_forever())
            .map_err(|source| ServerError::Spawn { source })?;

        info!("Mock login server listening on https://localhost:{port}/");
        Ok(ServerHandle { port, events })
    }

    fn serve_forever(self) {
        for request in self.server.incoming_requests() {
            if let Err(e) = self.serve_request(request) {
                warn!("Login server request failed: {e}");
            }
        }
    }

    fn serve_request(&self, mut request: tiny_http::Request) -> ServerResult<()> {
        debug!("{} {}", request.method(), request.url());

        let content_type = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("Content-Type"))
            .map(|header| header.value.as_str().to_string());

        let mut body = Vec::new();
        request
            .as_reader()
            .take(MAX_BODY_SIZE)
            .read_to_end(&mut body)
            .map_err(|e| ServerError::MalformedRequest { reason: e.to_string() })?;

        let (reply, signal) = handle_request(request.method(), content_type.as_deref(), &body, self.port);
        request.respond(reply.into_response()?)?;

        if let Some(signal) = signal {
            self.events.fire(signal);
        }
        Ok(())
    }
}

/// Handle to a running login server. Dropping it does not stop the server.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    port: u16,
    events: Arc<LoginEvents>,
}

impl ServerHandle {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_url(&self) -> String {
        format!("https://localhost:{}/", self.port)
    }

    pub fn show_login_event(&self) -> &SignalEvent {
        &self.events.show_login
    }

    pub fn login_done_event(&self) -> &SignalEvent {
        &self.events.login_done
    }
}
