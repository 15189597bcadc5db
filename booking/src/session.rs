//! Signed-in identity, passed explicitly into the wizard.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The caller on whose behalf a booking is made
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account identifier
    pub user_id: String,
    /// Name shown in the UI
    pub display_name: String,
    /// Bearer token for the booking service
    pub access_token: String,
}

impl Identity {
    /// Create an identity
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            access_token: access_token.into(),
        }
    }
}

// Keep tokens out of logs
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Navigation the wizard asks the host to perform
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redirect {
    /// Send the user to sign in, then back to the wizard
    SignInRequired,
}
