//! OAuth sign-on: provider parameters, login page scraping, the background
//! sign-on helper and the tokens it brings back.

pub mod login_page;
pub mod params;
pub mod reply;
pub mod signon;

pub use login_page::{FieldKind, FormField, LoginPage};
pub use params::{OAuthMechanism, OAuthParams};
pub use reply::OAuthReply;
pub use signon::{SignonEvent, SignonSession};
