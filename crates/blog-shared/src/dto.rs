//! Form submissions - `application/x-www-form-urlencoded` bodies.
//!
//! Every field defaults to empty so a missing field is reported as a
//! validation error rather than rejected by the extractor.

use serde::{Deserialize, Serialize};

/// Post create/edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub body: String,
}

/// Login form. `next` carries the page to return to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// Account registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Query string of the login page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NextQuery {
    pub next: Option<String>,
}
