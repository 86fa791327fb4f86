//! Authentication extractors and session cookies.

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, ResponseError,
    cookie::{Cookie, SameSite, time::Duration as CookieDuration},
    dev::Payload,
    http::{StatusCode, header},
    web,
};
use futures::future::LocalBoxFuture;
use std::fmt;

use blog_core::ports::AuthError;
use blog_shared::ErrorResponse;

use crate::config::SessionConfig;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/accounts/login/";

/// Authenticated user identity extractor.
///
/// Use this in handlers to require a signed-in user:
/// ```ignore
/// async fn post_new_form(identity: Identity) -> AppResult<HttpResponse> {
///     // ...
/// }
/// ```
///
/// Browsers carry the token in the session cookie; API clients may send
/// `Authorization: Bearer <token>` instead. The token's user must still
/// exist in the account store.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

/// Login page URL that returns to `next` afterwards.
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

/// Only same-site absolute paths are followed after login.
///
/// Browsers drop tabs and newlines from URLs, so any whitespace or control
/// character disqualifies the target before the leading slashes are checked.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => "/",
    }
}

fn is_local_path(path: &str) -> bool {
    if path.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return false;
    }

    let mut chars = path.chars();
    chars.next() == Some('/') && !matches!(chars.next(), Some('/' | '\\'))
}

/// Session cookie carrying a freshly issued token.
pub fn session_cookie(session: &SessionConfig, token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(session.cookie_name.clone(), token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(session.secure)
        .max_age(CookieDuration::seconds(max_age_seconds))
        .finish()
}

/// Cookie that clears the session in the browser.
pub fn removal_cookie(cookie_name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build(cookie_name.to_string(), "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

/// Error type for authentication failures.
///
/// Browsers are redirected to the login page; bearer clients get a 401.
#[derive(Debug)]
pub struct AuthenticationError {
    reason: AuthError,
    bearer: bool,
    next: String,
    stale_cookie: Option<String>,
}

impl AuthenticationError {
    fn bearer(reason: AuthError) -> Self {
        Self {
            reason,
            bearer: true,
            next: "/".to_string(),
            stale_cookie: None,
        }
    }

    fn redirect(reason: AuthError, next: &str, stale_cookie: Option<String>) -> Self {
        Self {
            reason,
            bearer: false,
            next: next.to_string(),
            stale_cookie,
        }
    }
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        if self.bearer {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::SEE_OTHER
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.bearer {
            let error = match &self.reason {
                AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                    .with_detail("Your session has expired. Please log in again."),
                AuthError::InvalidToken(msg) => {
                    ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
                }
                _ => ErrorResponse::new(401, "Authentication Required"),
            };
            return HttpResponse::Unauthorized().json(error);
        }

        let mut response = HttpResponse::SeeOther();
        response.insert_header((header::LOCATION, login_url(&self.next)));
        if let Some(name) = &self.stale_cookie {
            response.cookie(removal_cookie(name));
        }
        response.finish()
    }
}

/// Where the request's token came from.
enum Presented {
    Bearer(String),
    Session(String),
}

/// A `Bearer` Authorization header wins; any other scheme falls through to
/// the session cookie.
fn presented_token(req: &HttpRequest, cookie_name: &str) -> Option<Presented> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(token) = bearer {
        return Some(Presented::Bearer(token.trim().to_string()));
    }

    req.cookie(cookie_name)
        .map(|cookie| Presented::Session(cookie.value().to_string()))
}

/// Resolve the signed-in user.
///
/// The outer error is a server failure; the inner one means the request is
/// not authenticated.
async fn resolve(req: &HttpRequest) -> AppResult<Result<Identity, AuthenticationError>> {
    let next = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err(AppError::Internal("AppState not found in app data".to_string()));
    };
    let cookie_name = &state.session.cookie_name;

    let (token, bearer) = match presented_token(req, cookie_name) {
        Some(Presented::Bearer(token)) => (token, true),
        Some(Presented::Session(token)) => (token, false),
        None => {
            return Ok(Err(AuthenticationError::redirect(
                AuthError::MissingAuth,
                next,
                None,
            )));
        }
    };

    let reject = |reason: AuthError| {
        if bearer {
            AuthenticationError::bearer(reason)
        } else {
            AuthenticationError::redirect(reason, next, Some(cookie_name.clone()))
        }
    };

    let claims = match state.tokens.validate_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token");
            return Ok(Err(reject(e)));
        }
    };

    match state.accounts.find_user(claims.user_id).await? {
        Some(user) => Ok(Ok(Identity {
            user_id: user.id,
            username: user.username,
        })),
        None => {
            tracing::info!(user_id = %claims.user_id, "Token for unknown user");
            Ok(Err(reject(AuthError::InvalidToken(
                "Account no longer exists".to_string(),
            ))))
        }
    }
}

async fn require_identity(req: HttpRequest) -> Result<Identity, actix_web::Error> {
    let identity = resolve(&req).await??;
    Ok(identity)
}

async fn optional_identity(req: HttpRequest) -> Result<OptionalIdentity, actix_web::Error> {
    let identity = resolve(&req).await?.ok();
    Ok(OptionalIdentity(identity))
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        Box::pin(require_identity(req.clone()))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        Box::pin(optional_identity(req.clone()))
    }
}
