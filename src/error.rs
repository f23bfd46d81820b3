//! Error handling for the credentials panel
//!
//! Structured error types for the mock login server, the sign-on helper,
//! the account store and configuration loading.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Top-level error type for credentials panel operations
#[derive(Debug)]
pub enum PanelError {
    /// Mock login server errors
    Server(ServerError),
    /// Login form decoding errors
    Form(FormError),
    /// Sign-on helper errors
    Signon(SignonError),
    /// Account store errors
    Account(AccountError),
    /// Configuration errors
    Config(ConfigError),
}

/// Mock login server errors
#[derive(Debug)]
pub enum ServerError {
    /// The listening socket could not be bound
    Bind { address: String, source: Box<dyn StdError + Send + Sync> },
    /// Certificate or key could not be read from disk
    Certificate { path: String, reason: String },
    /// rustls rejected the certificate/key pair
    Tls { message: String },
    /// The background thread could not be spawned
    Spawn { source: io::Error },
    /// A request body could not be read
    MalformedRequest { reason: String },
    /// A response header value was not valid ASCII
    InvalidHeader { name: String },
    /// Connection level I/O failure
    Io(io::Error),
}

/// Login form decoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Content-Type is neither urlencoded nor multipart
    UnsupportedContentType { content_type: String },
    /// Multipart body without a boundary parameter
    MissingBoundary,
    /// Body is not valid UTF-8 or a multipart part is malformed
    MalformedBody { reason: String },
    /// A required field was not submitted
    MissingField { field: &'static str },
    /// A field contains a control character
    InvalidCharacter { field: &'static str },
}

/// Sign-on helper errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignonError {
    /// The HTTPS client could not be built or the request failed
    Http { url: String, message: String },
    /// The CA certificate could not be read
    Certificate { path: String, reason: String },
    /// The login page had no usable form
    NoLoginForm { url: String },
    /// The provider answered with something other than a redirect
    UnexpectedResponse { status: u16 },
    /// The redirect target is not the provider's callback
    UnexpectedRedirect { location: String, expected: String },
    /// The callback fragment has no access token
    MissingAccessToken { location: String },
    /// The provider reported an OAuth error in the callback
    Provider { error: String, description: Option<String> },
    /// The UI side went away before the flow completed
    Disconnected,
}

/// Account store errors
#[derive(Debug)]
pub enum AccountError {
    /// No account with the given id
    NotFound { id: u32 },
    /// No provider with the given name
    UnknownProvider { provider: String },
    /// Persisting or loading an account failed
    Storage { path: String, reason: String },
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Invalid configuration parameter
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file error
    FileError { path: String, error: String },
    /// Environment variable error
    EnvironmentError { variable: String, error: String },
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::Server(err) => write!(f, "Login server error: {err}"),
            PanelError::Form(err) => write!(f, "Login form error: {err}"),
            PanelError::Signon(err) => write!(f, "Sign-on error: {err}"),
            PanelError::Account(err) => write!(f, "Account error: {err}"),
            PanelError::Config(err) => write!(f, "Configuration error: {err}"),
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Bind { address, source } =>
                write!(f, "Cannot bind {address}: {source}"),
            ServerError::Certificate { path, reason } =>
                write!(f, "Cannot load certificate '{path}': {reason}"),
            ServerError::Tls { message } =>
                write!(f, "TLS configuration rejected: {message}"),
            ServerError::Spawn { source } =>
                write!(f, "Cannot spawn server thread: {source}"),
            ServerError::MalformedRequest { reason } =>
                write!(f, "Malformed request: {reason}"),
            ServerError::InvalidHeader { name } =>
                write!(f, "Invalid value for response header '{name}'"),
            ServerError::Io(err) =>
                write!(f, "I/O error: {err}"),
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::UnsupportedContentType { content_type } =>
                write!(f, "Unsupported form content type '{content_type}'"),
            FormError::MissingBoundary =>
                write!(f, "Multipart form without boundary"),
            FormError::MalformedBody { reason } =>
                write!(f, "Malformed form body: {reason}"),
            FormError::MissingField { field } =>
                write!(f, "Form field '{field}' is missing"),
            FormError::InvalidCharacter { field } =>
                write!(f, "Form field '{field}' contains a control character"),
        }
    }
}

impl fmt::Display for SignonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignonError::Http { url, message } =>
                write!(f, "Request to {url} failed: {message}"),
            SignonError::Certificate { path, reason } =>
                write!(f, "Cannot load CA certificate '{path}': {reason}"),
            SignonError::NoLoginForm { url } =>
                write!(f, "No login form found at {url}"),
            SignonError::UnexpectedResponse { status } =>
                write!(f, "Expected a redirect, got HTTP {status}"),
            SignonError::UnexpectedRedirect { location, expected } =>
                write!(f, "Redirected to '{location}', expected '{expected}'"),
            SignonError::MissingAccessToken { location } =>
                write!(f, "No access token in '{location}'"),
            SignonError::Provider { error, description } => match description {
                Some(description) => write!(f, "Provider error '{error}': {description}"),
                None => write!(f, "Provider error '{error}'"),
            },
            SignonError::Disconnected =>
                write!(f, "Sign-on session was abandoned"),
        }
    }
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountError::NotFound { id } =>
                write!(f, "Account {id} not found"),
            AccountError::UnknownProvider { provider } =>
                write!(f, "Unknown provider '{provider}'"),
            AccountError::Storage { path, reason } =>
                write!(f, "Account storage error '{path}': {reason}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter { parameter, value, reason } =>
                write!(f, "Invalid configuration parameter '{parameter}' = '{value}': {reason}"),
            ConfigError::FileError { path, error } =>
                write!(f, "Configuration file error '{path}': {error}"),
            ConfigError::EnvironmentError { variable, error } =>
                write!(f, "Environment variable '{variable}' error: {error}"),
        }
    }
}

impl StdError for PanelError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PanelError::Server(err) => Some(err),
            PanelError::Form(err) => Some(err),
            PanelError::Signon(err) => Some(err),
            PanelError::Account(err) => Some(err),
            PanelError::Config(err) => Some(err),
        }
    }
}

impl StdError for ServerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ServerError::Bind { source, .. } => Some(source.as_ref()),
            ServerError::Spawn { source } => Some(source),
            ServerError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl StdError for FormError {}
impl StdError for SignonError {}
impl StdError for AccountError {}
impl StdError for ConfigError {}

impl From<ServerError> for PanelError {
    fn from(err: ServerError) -> Self {
        PanelError::Server(err)
    }
}

impl From<FormError> for PanelError {
    fn from(err: FormError) -> Self {
        PanelError::Form(err)
    }
}

impl From<SignonError> for PanelError {
    fn from(err: SignonError) -> Self {
        PanelError::Signon(err)
    }
}

impl From<AccountError> for PanelError {
    fn from(err: AccountError) -> Self {
        PanelError::Account(err)
    }
}

impl From<ConfigError> for PanelError {
    fn from(err: ConfigError) -> Self {
        PanelError::Config(err)
    }
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        ServerError::Io(err)
    }
}

impl From<rustls::Error> for ServerError {
    fn from(err: rustls::Error) -> Self {
        ServerError::Tls { message: err.to_string() }
    }
}

impl From<reqwest::Error> for SignonError {
    fn from(err: reqwest::Error) -> Self {
        SignonError::Http {
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for credentials panel operations
pub type PanelResult<T> = Result<T, PanelError>;

/// Specialized result types for different components
pub type ServerResult<T> = Result<T, ServerError>;
pub type FormResult<T> = Result<T, FormError>;
pub type SignonResult<T> = Result<T, SignonError>;
pub type AccountResult<T> = Result<T, AccountError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
