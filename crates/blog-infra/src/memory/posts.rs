use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use blog_core::domain::{NewPost, Post, PostContent, PostId};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, PostRepository};

struct PostTable {
    next_id: PostId,
    rows: BTreeMap<PostId, Post>,
}

/// In-memory post repository using a BTreeMap behind an async RwLock.
///
/// Ids are assigned sequentially from 1 and never reused.
pub struct InMemoryPostRepository {
    table: RwLock<PostTable>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(PostTable {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    async fn modify<F>(&self, id: PostId, change: F) -> Result<Post, RepoError>
    where
        F: FnOnce(&mut Post) + Send,
    {
        let mut table = self.table.write().await;
        let post = table.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        change(post);
        Ok(post.clone())
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, PostId> for InMemoryPostRepository {
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let mut table = self.table.write().await;
        table.rows.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id += 1;

        let post = post.into_post(id);
        table.rows.insert(id, post.clone());
        tracing::debug!(post_id = id, "Inserted post");
        Ok(post)
    }

    async fn update_content(&self, id: PostId, content: PostContent) -> Result<Post, RepoError> {
        self.modify(id, |post| {
            post.title = content.title;
            post.body = content.body;
        })
        .await
    }

    async fn set_published_at(&self, id: PostId, at: DateTime<Utc>) -> Result<Post, RepoError> {
        self.modify(id, |post| post.published_at = Some(at)).await
    }

    async fn find_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let table = self.table.read().await;
        // Rows iterate in id order and the sort is stable, so ties stay by id.
        let mut posts: Vec<Post> = table
            .rows
            .values()
            .filter(|post| post.is_visible_at(now))
            .cloned()
            .collect();
        posts.sort_by_key(|post| post.published_at);
        Ok(posts)
    }

    async fn find_drafts(&self) -> Result<Vec<Post>, RepoError> {
        let table = self.table.read().await;
        let mut posts: Vec<Post> = table
            .rows
            .values()
            .filter(|post| post.is_draft())
            .cloned()
            .collect();
        posts.sort_by_key(|post| post.created_at);
        Ok(posts)
    }
}
