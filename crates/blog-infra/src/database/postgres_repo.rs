//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

use blog_core::domain::{NewPost, Post, PostContent, PostId, User};
use blog_core::error::RepoError;
use blog_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(user)
            .insert(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

impl PostgresPostRepository {
    /// Apply a partial update; columns left `NotSet` keep their stored value.
    async fn update_columns(
        db: &DatabaseConnection,
        changes: post::ActiveModel,
    ) -> Result<Post, RepoError> {
        let model = changes.update(db).await.map_err(repo_error)?;
        Ok(model.into())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            id: NotSet,
            author_id: Set(post.author),
            title: Set(post.title),
            body: Set(post.body),
            created_at: Set(post.created_at.into()),
            published_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(repo_error)?;

        tracing::debug!(post_id = model.id, "Inserted post");
        Ok(model.into())
    }

    async fn update_content(&self, id: PostId, content: PostContent) -> Result<Post, RepoError> {
        let changes = post::ActiveModel {
            id: Unchanged(id),
            author_id: NotSet,
            title: Set(content.title),
            body: Set(content.body),
            created_at: NotSet,
            published_at: NotSet,
        };
        Self::update_columns(&self.db, changes).await
    }

    async fn set_published_at(&self, id: PostId, at: DateTime<Utc>) -> Result<Post, RepoError> {
        let changes = post::ActiveModel {
            id: Unchanged(id),
            author_id: NotSet,
            title: NotSet,
            body: NotSet,
            created_at: NotSet,
            published_at: Set(Some(at.into())),
        };
        Self::update_columns(&self.db, changes).await
    }

    async fn find_published(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let cutoff: DateTimeWithTimeZone = now.into();

        let result = PostEntity::find()
            .filter(post::Column::PublishedAt.is_not_null())
            .filter(post::Column::PublishedAt.lte(cutoff))
            .order_by_asc(post::Column::PublishedAt)
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_drafts(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::PublishedAt.is_null())
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
