//! HTTP handlers and route configuration.

mod accounts;
mod health;
mod posts;

use actix_web::web;

use crate::middleware::error::not_found;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        // Posts
        .route("/", web::get().to(posts::post_list))
        .service(
            web::resource("/post/new/")
                .route(web::get().to(posts::post_new_form))
                .route(web::post().to(posts::post_new)),
        )
        .route("/post/{id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/post/{id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .service(
            web::resource("/post/{id}/publish/")
                .route(web::get().to(posts::post_publish))
                .route(web::post().to(posts::post_publish)),
        )
        .service(
            web::resource("/post/{id}/delete/")
                .route(web::get().to(posts::post_delete_confirm))
                .route(web::post().to(posts::post_delete)),
        )
        .route("/drafts/", web::get().to(posts::post_draft_list))
        // Accounts
        .service(
            web::scope("/accounts")
                .service(
                    web::resource("/login/")
                        .route(web::get().to(accounts::login_form))
                        .route(web::post().to(accounts::login)),
                )
                .route("/logout/", web::post().to(accounts::logout))
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(accounts::signup_form))
                        .route(web::post().to(accounts::signup)),
                ),
        )
        .default_service(web::to(not_found));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{
        App,
        cookie::Cookie,
        http::{StatusCode, header},
        test,
    };
    use chrono::{TimeZone, Utc};

    use blog_core::domain::User;
    use blog_core::ports::{Clock, ManualClock, UserRepository};
    use blog_infra::auth::JwtConfig;
    use blog_infra::memory::{InMemoryPostRepository, InMemoryUserRepository};
    use blog_shared::HealthResponse;
    use blog_shared::dto::{LoginForm, PostForm, SignupForm};

    use super::*;
    use crate::config::SessionConfig;
    use crate::state::AppState;

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    /// Account every `session` cookie belongs to.
    const EDITOR: uuid::Uuid = uuid::Uuid::from_u128(0xed17);

    async fn fixture() -> (AppState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));

        let users = Arc::new(InMemoryUserRepository::new());
        users
            .create(User {
                id: EDITOR,
                username: "editor".to_string(),
                password_hash: "unused".to_string(),
                created_at: clock.now(),
            })
            .await
            .unwrap();

        let state = AppState::new(
            Arc::new(InMemoryPostRepository::new()),
            users,
            clock.clone() as Arc<dyn Clock>,
            JwtConfig::default(),
            SessionConfig::default(),
        );
        (state, clock)
    }

    fn session_for(state: &AppState, user_id: uuid::Uuid) -> Cookie<'static> {
        let token = state.tokens.generate_token(user_id, "editor").unwrap();
        Cookie::new(state.session.cookie_name.clone(), token)
    }

    fn session(state: &AppState) -> Cookie<'static> {
        session_for(state, EDITOR)
    }

    fn location<B>(res: &actix_web::dev::ServiceResponse<B>) -> String {
        res.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string()
    }

    fn post_form(title: &str, body: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    async fn body_text<B: actix_web::body::MessageBody>(
        res: actix_web::dev::ServiceResponse<B>,
    ) -> String {
        String::from_utf8(test::read_body(res).await.to_vec()).unwrap()
    }

    #[actix_web::test]
    async fn test_protected_routes_redirect_to_login() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        for uri in ["/post/new/", "/drafts/", "/post/1/edit/", "/post/1/publish/", "/post/1/delete/"] {
            let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(res.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(
                location(&res),
                format!("/accounts/login/?next={}", urlencoding::encode(uri))
            );
        }
    }

    #[actix_web::test]
    async fn test_create_redirects_to_detail_and_lands_in_drafts() {
        let (state, _) = fixture().await;
        let app = init_app!(state);
        let cookie = session(&state);

        let req = test::TestRequest::post()
            .uri("/post/new/")
            .cookie(cookie.clone())
            .set_form(post_form("Hello", "World"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/post/1/");

        let req = test::TestRequest::get().uri("/drafts/").cookie(cookie).to_request();
        let drafts = body_text(test::call_service(&app, req).await).await;
        assert!(drafts.contains("Hello"));
        assert_eq!(state.posts.get(1).await.unwrap().author, EDITOR);

        let public = body_text(test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await).await;
        assert!(!public.contains("Hello"));
    }

    #[actix_web::test]
    async fn test_session_for_deleted_account_is_sent_to_login() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/post/new/")
            .cookie(session_for(&state, uuid::Uuid::new_v4()))
            .set_form(post_form("Ghost", "Written by nobody"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/accounts/login/?next=%2Fpost%2Fnew%2F");
        let cleared = res
            .response()
            .cookies()
            .find(|c| c.name() == "blog_session")
            .unwrap();
        assert_eq!(cleared.value(), "");
        assert!(state.posts.list_drafts().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_invalid_form_is_shown_again() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/post/new/")
            .cookie(session(&state))
            .set_form(post_form("   ", "kept body"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let html = body_text(res).await;
        assert!(html.contains("This field is required."));
        assert!(html.contains("kept body"));
        assert!(state.posts.list_drafts().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_unknown_or_malformed_ids_are_not_found() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        for uri in ["/post/99/", "/post/abc/", "/no/such/page"] {
            let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        }

        let req = test::TestRequest::post()
            .uri("/post/99/publish/")
            .cookie(session(&state))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_publish_makes_post_public() {
        let (state, clock) = fixture().await;
        let app = init_app!(state);
        let post = state
            .posts
            .create(uuid::Uuid::new_v4(), &blog_core::domain::PostDraft::new("Hello", "World"))
            .await
            .unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/post/{}/publish/", post.id))
            .cookie(session(&state))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), format!("/post/{}/", post.id));

        let published = state.posts.get(post.id).await.unwrap();
        assert_eq!(published.published_at, Some(clock.now()));

        let public = body_text(test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await).await;
        assert!(public.contains("Hello"));
    }

    #[actix_web::test]
    async fn test_publish_via_get_is_accepted() {
        let (state, _) = fixture().await;
        let app = init_app!(state);
        let post = state
            .posts
            .create(uuid::Uuid::new_v4(), &blog_core::domain::PostDraft::new("T", "B"))
            .await
            .unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/post/{}/publish/", post.id))
            .cookie(session(&state))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(!state.posts.get(post.id).await.unwrap().is_draft());
    }

    #[actix_web::test]
    async fn test_edit_prefills_and_updates() {
        let (state, _) = fixture().await;
        let app = init_app!(state);
        let cookie = session(&state);
        let post = state
            .posts
            .create(uuid::Uuid::new_v4(), &blog_core::domain::PostDraft::new("Before", "Old body"))
            .await
            .unwrap();
        let uri = format!("/post/{}/edit/", post.id);

        let req = test::TestRequest::get().uri(&uri).cookie(cookie.clone()).to_request();
        let html = body_text(test::call_service(&app, req).await).await;
        assert!(html.contains("Before"));
        assert!(html.contains("Old body"));

        let req = test::TestRequest::post()
            .uri(&uri)
            .cookie(cookie)
            .set_form(post_form("After", "New body"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let updated = state.posts.get(post.id).await.unwrap();
        assert_eq!(updated.title, "After");
        assert_eq!(updated.body, "New body");
        assert_eq!(updated.created_at, post.created_at);
    }

    #[actix_web::test]
    async fn test_invalid_edit_of_missing_post_is_not_found() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/post/42/edit/")
            .cookie(session(&state))
            .set_form(post_form("", ""))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_delete_confirms_then_removes() {
        let (state, _) = fixture().await;
        let app = init_app!(state);
        let cookie = session(&state);
        let post = state
            .posts
            .create(uuid::Uuid::new_v4(), &blog_core::domain::PostDraft::new("Doomed", "x"))
            .await
            .unwrap();
        let uri = format!("/post/{}/delete/", post.id);

        let req = test::TestRequest::get().uri(&uri).cookie(cookie.clone()).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(state.posts.get(post.id).await.is_ok());

        let req = test::TestRequest::post().uri(&uri).cookie(cookie).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/");

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(&format!("/post/{}/", post.id)).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_signup_then_login_follows_next() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/accounts/signup/")
            .set_form(SignupForm {
                username: "alice".to_string(),
                password: "correct horse".to_string(),
                password_confirmation: "correct horse".to_string(),
            })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/");
        assert!(res.response().cookies().any(|c| c.name() == "blog_session"));

        let req = test::TestRequest::post()
            .uri("/accounts/login/")
            .set_form(LoginForm {
                username: "alice".to_string(),
                password: "wrong password".to_string(),
                next: None,
            })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("Please enter a correct username and password"));

        let req = test::TestRequest::post()
            .uri("/accounts/login/")
            .set_form(LoginForm {
                username: "alice".to_string(),
                password: "correct horse".to_string(),
                next: Some("/drafts/".to_string()),
            })
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/drafts/");

        let session = res
            .response()
            .cookies()
            .find(|c| c.name() == "blog_session")
            .map(|c| c.into_owned())
            .unwrap();
        assert_eq!(session.http_only(), Some(true));

        let req = test::TestRequest::get().uri("/drafts/").cookie(session).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_login_ignores_offsite_next() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/accounts/signup/")
            .set_form(SignupForm {
                username: "bob".to_string(),
                password: "password123".to_string(),
                password_confirmation: "password123".to_string(),
            })
            .to_request();
        test::call_service(&app, req).await;

        for next in ["//evil.example/", "/\t/evil.example/", "/\n/evil.example/"] {
            let req = test::TestRequest::post()
                .uri("/accounts/login/")
                .set_form(LoginForm {
                    username: "bob".to_string(),
                    password: "password123".to_string(),
                    next: Some(next.to_string()),
                })
                .to_request();
            let res = test::call_service(&app, req).await;

            assert_eq!(res.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&res), "/", "{next:?}");
        }
    }

    #[actix_web::test]
    async fn test_signup_errors_are_shown() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/accounts/signup/")
            .set_form(SignupForm {
                username: "carol".to_string(),
                password: "short".to_string(),
                password_confirmation: "other".to_string(),
            })
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.response().cookies().next().is_none());
        let html = body_text(res).await;
        assert!(html.contains("errorlist"));
        assert!(html.contains("carol"));
    }

    #[actix_web::test]
    async fn test_logout_clears_session() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/accounts/logout/")
            .cookie(session(&state))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cleared = res
            .response()
            .cookies()
            .find(|c| c.name() == "blog_session")
            .unwrap();
        assert_eq!(cleared.value(), "");
    }

    #[actix_web::test]
    async fn test_bearer_client_gets_401() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        let req = test::TestRequest::get()
            .uri("/drafts/")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_health_reports_memory_store() {
        let (state, _) = fixture().await;
        let app = init_app!(state);

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.status, "ok");
        assert_eq!(body.database, "memory");
    }
}
