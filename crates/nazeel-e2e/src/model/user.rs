//! Login identity carried through a run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Application user
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Display name shown in the top bar (filled in after login)
    pub name: String,
    /// Login username
    pub username: String,
    /// Login password
    pub password: String,
    /// Access code entered after the password
    pub access_code: String,
}

impl User {
    /// Create a user from login credentials
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        access_code: impl Into<String>,
    ) -> Self {
        Self {
            name: String::new(),
            username: username.into(),
            password: password.into(),
            access_code: access_code.into(),
        }
    }

    /// Set display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether all three credentials are present
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty() && !self.access_code.is_empty()
    }
}

// Credentials stay out of logs and reports.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"***")
            .field("access_code", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_credentials() {
        assert!(User::new("qa", "secret", "12345").has_credentials());
        assert!(!User::new("qa", "", "12345").has_credentials());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let text = format!("{:?}", User::new("qa", "secret", "12345").with_name("QA Tester"));
        assert!(text.contains("QA Tester"));
        assert!(!text.contains("secret"));
        assert!(!text.contains("12345"));
    }
}
