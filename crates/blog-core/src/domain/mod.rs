//! Domain entities - the core business objects.

mod post;
mod user;
mod validation;

pub use post::{NewPost, Post, PostContent, PostDraft, PostId, TITLE_MAX_CHARS};
pub use user::{Credentials, PASSWORD_MIN_CHARS, SignupDraft, USERNAME_MAX_CHARS, User};
pub use validation::ValidationErrors;
