//! HTML views rendered with askama.

use actix_web::{HttpResponse, http::StatusCode, http::header::ContentType};
use askama::Template;
use chrono::{DateTime, Utc};

use blog_core::domain::{Post, PostId, ValidationErrors};
use blog_shared::dto::{PostForm, SignupForm};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Render `template` as an HTML response with `status`.
pub fn render<T: Template>(template: &T, status: StatusCode) -> AppResult<HttpResponse> {
    let html = template
        .render()
        .map_err(|e| AppError::Internal(format!("template rendering failed: {e}")))?;

    Ok(HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(html))
}

/// Header state shared by every page.
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    pub signed_in: bool,
    pub username: String,
}

impl Chrome {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: &Identity) -> Self {
        Self {
            signed_in: true,
            username: identity.username.clone(),
        }
    }

    pub fn for_viewer(viewer: Option<&Identity>) -> Self {
        viewer.map(Self::signed_in).unwrap_or_default()
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Display form of a post.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub published: bool,
    pub published_at: String,
}

impl PostView {
    pub fn list(posts: &[Post]) -> Vec<Self> {
        posts.iter().map(Self::from).collect()
    }
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            body: post.body.clone(),
            created_at: format_timestamp(post.created_at),
            published: post.published_at.is_some(),
            published_at: post.published_at.map(format_timestamp).unwrap_or_default(),
        }
    }
}

/// One input's value and its validation messages.
#[derive(Debug, Clone, Default)]
pub struct FormField {
    pub value: String,
    pub errors: Vec<String>,
}

impl FormField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            errors: Vec::new(),
        }
    }

    fn rejected(value: impl Into<String>, errors: &ValidationErrors, name: &str) -> Self {
        Self {
            value: value.into(),
            errors: errors.field(name).to_vec(),
        }
    }
}

/// Post editor state.
#[derive(Debug, Clone, Default)]
pub struct PostFormView {
    pub title: FormField,
    pub body: FormField,
}

impl PostFormView {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_post(post: &Post) -> Self {
        Self {
            title: FormField::new(post.title.clone()),
            body: FormField::new(post.body.clone()),
        }
    }

    /// Re-show what was submitted alongside the reasons it was refused.
    pub fn rejected(form: PostForm, errors: &ValidationErrors) -> Self {
        Self {
            title: FormField::rejected(form.title, errors, "title"),
            body: FormField::rejected(form.body, errors, "body"),
        }
    }
}

#[derive(Template)]
#[template(path = "post_list.html")]
pub struct PostListTemplate {
    pub chrome: Chrome,
    pub posts: Vec<PostView>,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub chrome: Chrome,
    pub post: PostView,
}

#[derive(Template)]
#[template(path = "post_edit.html")]
pub struct PostEditTemplate {
    pub chrome: Chrome,
    pub heading: &'static str,
    pub action: String,
    pub form: PostFormView,
}

impl PostEditTemplate {
    pub fn create(chrome: Chrome, form: PostFormView) -> Self {
        Self {
            chrome,
            heading: "New post",
            action: "/post/new/".to_string(),
            form,
        }
    }

    pub fn edit(chrome: Chrome, id: PostId, form: PostFormView) -> Self {
        Self {
            chrome,
            heading: "Edit post",
            action: format!("/post/{id}/edit/"),
            form,
        }
    }
}

#[derive(Template)]
#[template(path = "post_draft_list.html")]
pub struct PostDraftListTemplate {
    pub chrome: Chrome,
    pub posts: Vec<PostView>,
}

#[derive(Template)]
#[template(path = "post_confirm_delete.html")]
pub struct PostConfirmDeleteTemplate {
    pub chrome: Chrome,
    pub post: PostView,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
    pub next: String,
    pub username: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub chrome: Chrome,
    pub username: FormField,
    pub password: FormField,
    pub password_confirmation: FormField,
}

impl SignupTemplate {
    pub fn empty(chrome: Chrome) -> Self {
        Self {
            chrome,
            username: FormField::default(),
            password: FormField::default(),
            password_confirmation: FormField::default(),
        }
    }

    /// Passwords are never echoed back.
    pub fn rejected(chrome: Chrome, form: SignupForm, errors: &ValidationErrors) -> Self {
        Self {
            chrome,
            username: FormField::rejected(form.username, errors, "username"),
            password: FormField::rejected("", errors, "password"),
            password_confirmation: FormField::rejected("", errors, "password_confirmation"),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub chrome: Chrome,
    pub status: u16,
    pub title: String,
    pub detail: String,
}

/// Error page that cannot itself fail.
pub fn error_page(status: StatusCode, title: &str, detail: &str) -> HttpResponse {
    let template = ErrorTemplate {
        chrome: Chrome::anonymous(),
        status: status.as_u16(),
        title: title.to_string(),
        detail: detail.to_string(),
    };

    match template.render() {
        Ok(html) => HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(html),
        Err(e) => {
            tracing::error!(error = %e, "Error page rendering failed");
            HttpResponse::build(status)
                .content_type(ContentType::plaintext())
                .body(format!("{} {}", status.as_u16(), title))
        }
    }
}
