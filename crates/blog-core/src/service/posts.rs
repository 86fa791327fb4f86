use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostDraft, PostId};
use crate::error::DomainError;
use crate::ports::{Clock, PostRepository};

const ENTITY: &str = "Post";

/// Post lifecycle over a [`PostRepository`].
///
/// Each operation is a single repository call, so no operation can leave
/// a partially written post behind.
#[derive(Clone)]
pub struct PostStore {
    posts: Arc<dyn PostRepository>,
    clock: Arc<dyn Clock>,
}

impl PostStore {
    pub fn new(posts: Arc<dyn PostRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { posts, clock }
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create a draft authored by `author`.
    pub async fn create(&self, author: Uuid, draft: &PostDraft) -> Result<Post, DomainError> {
        let content = draft.validate().map_err(DomainError::Validation)?;
        let post = self
            .posts
            .create(NewPost::new(author, content, self.clock.now()))
            .await?;
        Ok(post)
    }

    pub async fn get(&self, id: PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await
            .map_err(|e| e.into_domain(ENTITY, id))?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))
    }

    /// Replace title and body. Input is validated before the id is looked up.
    pub async fn update(&self, id: PostId, draft: &PostDraft) -> Result<Post, DomainError> {
        let content = draft.validate().map_err(DomainError::Validation)?;
        self.posts
            .update_content(id, content)
            .await
            .map_err(|e| e.into_domain(ENTITY, id))
    }

    /// Stamp the post as published now. Re-publishing overwrites the stamp.
    pub async fn publish(&self, id: PostId) -> Result<Post, DomainError> {
        self.posts
            .set_published_at(id, self.clock.now())
            .await
            .map_err(|e| e.into_domain(ENTITY, id))
    }

    pub async fn delete(&self, id: PostId) -> Result<(), DomainError> {
        self.posts
            .delete(id)
            .await
            .map_err(|e| e.into_domain(ENTITY, id))
    }

    /// Posts visible to the public at `now`, oldest publication first.
    pub async fn list_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_published(now).await?)
    }

    /// Unpublished posts, oldest first.
    pub async fn list_drafts(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_drafts().await?)
    }
}
