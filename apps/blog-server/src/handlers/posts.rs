//! Post handlers: public listing, detail, editor, drafts, publish and delete.

use actix_web::{HttpResponse, http::StatusCode, http::header, web};

use blog_core::DomainError;
use blog_core::domain::{PostDraft, PostId};
use blog_shared::dto::PostForm;

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views::{
    Chrome, PostConfirmDeleteTemplate, PostDetailTemplate, PostDraftListTemplate,
    PostEditTemplate, PostFormView, PostListTemplate, PostView, render,
};

pub(crate) fn see_other(location: impl Into<String>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

fn detail_url(id: PostId) -> String {
    format!("/post/{id}/")
}

fn draft_from(form: &PostForm) -> PostDraft {
    PostDraft::new(form.title.clone(), form.body.clone())
}

/// GET /
pub async fn post_list(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_published(state.posts.now()).await?;

    render(
        &PostListTemplate {
            chrome: Chrome::for_viewer(viewer.identity()),
            posts: PostView::list(&posts),
        },
        StatusCode::OK,
    )
}

/// GET /post/{id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;

    render(
        &PostDetailTemplate {
            chrome: Chrome::for_viewer(viewer.identity()),
            post: PostView::from(&post),
        },
        StatusCode::OK,
    )
}

/// GET /post/new/
pub async fn post_new_form(identity: Identity) -> AppResult<HttpResponse> {
    render(
        &PostEditTemplate::create(Chrome::signed_in(&identity), PostFormView::empty()),
        StatusCode::OK,
    )
}

/// POST /post/new/
pub async fn post_new(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    match state.posts.create(identity.user_id, &draft_from(&form)).await {
        Ok(post) => {
            tracing::info!(post_id = post.id, author = %identity.user_id, "Post created");
            Ok(see_other(detail_url(post.id)))
        }
        Err(DomainError::Validation(errors)) => render(
            &PostEditTemplate::create(
                Chrome::signed_in(&identity),
                PostFormView::rejected(form, &errors),
            ),
            StatusCode::OK,
        ),
        Err(e) => Err(e.into()),
    }
}

/// GET /post/{id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;

    render(
        &PostEditTemplate::edit(
            Chrome::signed_in(&identity),
            post.id,
            PostFormView::from_post(&post),
        ),
        StatusCode::OK,
    )
}

/// POST /post/{id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let form = form.into_inner();

    match state.posts.update(id, &draft_from(&form)).await {
        Ok(post) => {
            tracing::info!(post_id = post.id, editor = %identity.user_id, "Post updated");
            Ok(see_other(detail_url(post.id)))
        }
        Err(DomainError::Validation(errors)) => {
            // An invalid form for a missing post is still a 404.
            state.posts.get(id).await?;
            render(
                &PostEditTemplate::edit(
                    Chrome::signed_in(&identity),
                    id,
                    PostFormView::rejected(form, &errors),
                ),
                StatusCode::OK,
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /drafts/
pub async fn post_draft_list(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_drafts().await?;

    render(
        &PostDraftListTemplate {
            chrome: Chrome::signed_in(&identity),
            posts: PostView::list(&posts),
        },
        StatusCode::OK,
    )
}

/// GET or POST /post/{id}/publish/
pub async fn post_publish(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state.posts.publish(path.into_inner()).await?;

    tracing::info!(
        post_id = post.id,
        publisher = %identity.user_id,
        published_at = ?post.published_at,
        "Post published"
    );
    Ok(see_other(detail_url(post.id)))
}

/// GET /post/{id}/delete/
pub async fn post_delete_confirm(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;

    render(
        &PostConfirmDeleteTemplate {
            chrome: Chrome::signed_in(&identity),
            post: PostView::from(&post),
        },
        StatusCode::OK,
    )
}

/// POST /post/{id}/delete/
pub async fn post_delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.delete(id).await?;

    tracing::info!(post_id = id, deleted_by = %identity.user_id, "Post deleted");
    Ok(see_other("/"))
}
