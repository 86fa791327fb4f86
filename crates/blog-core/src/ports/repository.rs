use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostContent, PostId, User};
use crate::error::RepoError;

/// Generic repository trait for lookups and removal by id.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Fails with `RepoError::NotFound` if absent.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Insert a new user. A taken username is a `RepoError::Constraint`.
    async fn create(&self, user: User) -> Result<User, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
///
/// Every mutating method touches exactly one row.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, PostId> {
    /// Insert a new post and return it with its assigned id.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Replace title and body only.
    async fn update_content(&self, id: PostId, content: PostContent) -> Result<Post, RepoError>;

    /// Overwrite the publish timestamp.
    async fn set_published_at(&self, id: PostId, at: DateTime<Utc>) -> Result<Post, RepoError>;

    /// Posts published at or before `now`, by `published_at` then id.
    async fn find_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError>;

    /// Unpublished posts, by `created_at` then id.
    async fn find_drafts(&self) -> Result<Vec<Post>, RepoError>;
}
