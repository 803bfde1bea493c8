//! Caller credentials and the sign-out hook.

use std::fmt;

/// Bearer credentials passed explicitly to every story service call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Wraps an issued bearer token.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Returns the raw token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Invoked when the story service rejects the credentials.
///
/// Implementations clear whatever the application holds for the signed-in
/// user and send them back to sign in.
pub trait SignOut: Send + Sync {
    /// Performs the global sign-out.
    fn sign_out(&self);
}
