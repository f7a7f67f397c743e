// ============================================================================
// Operator Authentication
// ============================================================================
//
// The listing page is guarded by HTTP Basic credentials. Checking them is a
// capability handed to the ListingService:
// - HtpasswdFile: htpasswd file loaded at startup (bcrypt, apr1, SHA-1, plain)
// - any `Fn(&Credentials) -> bool`
//
// ============================================================================

mod htpasswd;
mod password;

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};

pub use htpasswd::HtpasswdFile;

pub const REALM: &str = "Registrations";

/// Username/password pair presented by a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse an `Authorization: Basic <base64(user:pass)>` header value.
    pub fn from_basic_header(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self::new(username, password))
    }
}

// Keep passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub trait CredentialCheck: Send + Sync {
    fn verify(&self, credentials: &Credentials) -> bool;
}

impl<F> CredentialCheck for F
where
    F: Fn(&Credentials) -> bool + Send + Sync,
{
    fn verify(&self, credentials: &Credentials) -> bool {
        self(credentials)
    }
}
