//! Login, logout and signup.

use actix_web::{HttpResponse, http::StatusCode, http::header, web};

use blog_core::DomainError;
use blog_core::domain::{Credentials, SignupDraft, User};
use blog_shared::dto::{LoginForm, NextQuery, SignupForm};

use crate::middleware::auth::{
    OptionalIdentity, removal_cookie, safe_next, session_cookie,
};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{Chrome, LoginTemplate, SignupTemplate, render};

const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Issue a session cookie for `user` and continue to `next`.
fn start_session(state: &AppState, user: &User, next: &str) -> AppResult<HttpResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, next))
        .cookie(session_cookie(
            &state.session,
            token,
            state.tokens.expiration_seconds(),
        ))
        .finish())
}

/// GET /accounts/login/
pub async fn login_form(
    viewer: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    render(
        &LoginTemplate {
            chrome: Chrome::for_viewer(viewer.identity()),
            next: safe_next(query.next.as_deref()).to_string(),
            username: String::new(),
            errors: Vec::new(),
        },
        StatusCode::OK,
    )
}

/// POST /accounts/login/
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let next = safe_next(form.next.as_deref()).to_string();
    let credentials = Credentials {
        username: form.username.clone(),
        password: form.password,
    };

    match state.accounts.authenticate(&credentials).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User logged in");
            start_session(&state, &user, &next)
        }
        Err(DomainError::Unauthorized) => {
            tracing::info!(username = %form.username, "Login rejected");
            render(
                &LoginTemplate {
                    chrome: Chrome::anonymous(),
                    next,
                    username: form.username,
                    errors: vec![BAD_CREDENTIALS.to_string()],
                },
                StatusCode::OK,
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /accounts/logout/
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .cookie(removal_cookie(&state.session.cookie_name))
        .finish()
}

/// GET /accounts/signup/
pub async fn signup_form(viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    render(
        &SignupTemplate::empty(Chrome::for_viewer(viewer.identity())),
        StatusCode::OK,
    )
}

/// POST /accounts/signup/
pub async fn signup(
    state: web::Data<AppState>,
    form: web::Form<SignupForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let draft = SignupDraft {
        username: form.username.clone(),
        password: form.password.clone(),
        password_confirmation: form.password_confirmation.clone(),
    };

    match state.accounts.signup(&draft).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
            start_session(&state, &user, "/")
        }
        Err(DomainError::Validation(errors)) => render(
            &SignupTemplate::rejected(Chrome::anonymous(), form, &errors),
            StatusCode::OK,
        ),
        Err(e) => Err(e.into()),
    }
}
