use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Credentials, SignupDraft, User, ValidationErrors};
use crate::error::{DomainError, RepoError};
use crate::ports::{BaseRepository, Clock, PasswordService, UserRepository};

const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

/// Registration and credential checks.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            passwords,
            clock,
        }
    }

    /// Register a new user.
    pub async fn signup(&self, draft: &SignupDraft) -> Result<User, DomainError> {
        let credentials = draft.validate().map_err(DomainError::Validation)?;

        if self
            .users
            .find_by_username(&credentials.username)
            .await?
            .is_some()
        {
            return Err(duplicate_username());
        }

        let password_hash = self
            .passwords
            .hash(&credentials.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = User::new(credentials.username, password_hash, self.clock.now());
        match self.users.create(user).await {
            Ok(user) => Ok(user),
            // Lost a race with a concurrent signup for the same name.
            Err(RepoError::Constraint(_)) => Err(duplicate_username()),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up the account behind a session. `None` once the user is gone.
    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(|e| e.into_domain("User", id))
    }

    /// Resolve credentials to a user. Unknown users and wrong passwords
    /// are indistinguishable to the caller.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<User, DomainError> {
        let user = self
            .users
            .find_by_username(credentials.username.trim())
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = self
            .passwords
            .verify(&credentials.password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if valid {
            Ok(user)
        } else {
            Err(DomainError::Unauthorized)
        }
    }
}

fn duplicate_username() -> DomainError {
    let mut errors = ValidationErrors::new();
    errors.add("username", DUPLICATE_USERNAME);
    DomainError::Validation(errors)
}
