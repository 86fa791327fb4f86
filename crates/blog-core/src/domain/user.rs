use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationErrors;

pub const USERNAME_MAX_CHARS: usize = 150;
pub const PASSWORD_MIN_CHARS: usize = 8;

/// User entity - a principal that can author posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated id.
    pub fn new(username: String, password_hash: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at,
        }
    }
}

/// Username/password pair presented at login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Account registration input as submitted.
#[derive(Debug, Clone, Default)]
pub struct SignupDraft {
    pub username: String,
    pub password: String,
    pub password_confirmation: String,
}

impl SignupDraft {
    /// Check the username format and password rules.
    ///
    /// Returns the trimmed username and the password on success.
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let username = self.username.trim();
        let mut errors = ValidationErrors::new();

        let username_len = username.chars().count();
        if username_len == 0 {
            errors.add("username", "This field is required.");
        } else if username_len > USERNAME_MAX_CHARS {
            errors.add(
                "username",
                format!("Ensure this value has at most {USERNAME_MAX_CHARS} characters."),
            );
        } else if !username.chars().all(is_username_char) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if self.password.is_empty() {
            errors.add("password", "This field is required.");
        } else if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.add(
                "password",
                format!("This password is too short. It must contain at least {PASSWORD_MIN_CHARS} characters."),
            );
        }

        if self.password != self.password_confirmation {
            errors.add("password_confirmation", "The two password fields didn't match.");
        }

        errors.into_result(Credentials {
            username: username.to_string(),
            password: self.password.clone(),
        })
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}
