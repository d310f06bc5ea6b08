//! Staff login boundary.
//!
//! Credential verification (hashing, token issuance, session persistence)
//! lives outside this crate. What the record stores need is only the
//! session flag the authenticator issues on a successful check; operations
//! receive that session explicitly instead of reading ambient state.

use thiserror::Error;

/// Login form fields.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("wrong email or password")]
    InvalidCredentials,
}

/// Session state carried into every service operation.
#[derive(Debug, Clone, Default)]
pub struct StaffSession {
    logged_in: bool,
    staff_email: Option<String>,
}

impl StaffSession {
    /// Session issued after a successful credential check.
    pub fn logged_in(email: impl Into<String>) -> Self {
        Self {
            logged_in: true,
            staff_email: Some(email.into()),
        }
    }

    /// The state every request starts in before login.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.logged_in
    }

    pub fn staff_email(&self) -> Option<&str> {
        self.staff_email.as_deref()
    }
}

/// External credential checker. Implementations hash, compare, and expire
/// however they like; this crate only consumes the resulting session.
pub trait Authenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<StaffSession, AuthError>;
}
