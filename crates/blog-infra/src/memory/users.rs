use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::User;
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, UserRepository};

/// In-memory user repository keyed by id.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        users.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("username already taken".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use blog_core::AccountService;
    use blog_core::DomainError;
    use blog_core::domain::{Credentials, SignupDraft};
    use blog_core::ports::{AuthError, PasswordService, SystemClock};

    use super::*;

    /// Reversible stand-in so these tests don't pay for real hashing.
    struct PlainPasswords;

    impl PasswordService for PlainPasswords {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            Ok(format!("plain${password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
            Ok(hash.strip_prefix("plain$") == Some(password))
        }
    }

    fn accounts() -> AccountService {
        AccountService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(PlainPasswords),
            Arc::new(SystemClock),
        )
    }

    fn signup(username: &str, password: &str) -> SignupDraft {
        SignupDraft {
            username: username.to_string(),
            password: password.to_string(),
            password_confirmation: password.to_string(),
        }
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_authenticate() {
        let accounts = accounts();
        let user = accounts
            .signup(&signup("alice", "correct horse"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "correct horse");

        let found = accounts
            .authenticate(&credentials("alice", "correct horse"))
            .await
            .unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_are_unauthorized() {
        let accounts = accounts();
        accounts
            .signup(&signup("alice", "correct horse"))
            .await
            .unwrap();

        let wrong = accounts
            .authenticate(&credentials("alice", "battery staple"))
            .await;
        assert!(matches!(wrong, Err(DomainError::Unauthorized)));

        let unknown = accounts
            .authenticate(&credentials("bob", "correct horse"))
            .await;
        assert!(matches!(unknown, Err(DomainError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_field_error() {
        let accounts = accounts();
        accounts
            .signup(&signup("alice", "correct horse"))
            .await
            .unwrap();

        match accounts.signup(&signup("alice", "another pass")).await {
            Err(DomainError::Validation(errors)) => {
                assert_eq!(errors.field("username").len(), 1);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_user_by_id() {
        let accounts = accounts();
        let user = accounts
            .signup(&signup("alice", "correct horse"))
            .await
            .unwrap();

        let found = accounts.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(accounts.find_user(uuid::Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repository_rejects_duplicate_usernames() {
        let repo = InMemoryUserRepository::new();
        repo.create(User::new("alice".into(), "h".into(), Utc::now()))
            .await
            .unwrap();

        let result = repo
            .create(User::new("alice".into(), "h".into(), Utc::now()))
            .await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }
}
