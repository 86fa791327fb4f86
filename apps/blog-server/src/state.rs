//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{Clock, PostRepository, SystemClock, TokenService, UserRepository};
use blog_core::{AccountService, PostStore};
use blog_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use blog_infra::memory::{InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use blog_infra::database::{DatabaseConnections, PostgresPostRepository, PostgresUserRepository};

use crate::config::{AppConfig, SessionConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostStore,
    pub accounts: AccountService,
    pub tokens: Arc<dyn TokenService>,
    pub session: SessionConfig,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Assemble state from repositories and a clock.
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        jwt: JwtConfig,
        session: SessionConfig,
    ) -> Self {
        Self {
            posts: PostStore::new(posts, clock.clone()),
            accounts: AccountService::new(users, Arc::new(Argon2PasswordService::new()), clock),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            session,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// State backed by in-memory repositories.
    pub fn in_memory(clock: Arc<dyn Clock>, jwt: JwtConfig, session: SessionConfig) -> Self {
        Self::new(
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            clock,
            jwt,
            session,
        )
    }

    /// Build the application state with the storage the configuration selects.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        if let Some(state) = Self::connect_postgres(config, clock.clone()).await? {
            tracing::info!("Application state initialized (postgres)");
            return Ok(state);
        }

        tracing::warn!("DATABASE_URL not set. Running with in-memory storage; data is lost on restart.");
        let state = Self::in_memory(clock, config.jwt.clone(), config.session.clone());
        tracing::info!("Application state initialized (in-memory)");
        Ok(state)
    }

    #[cfg(feature = "postgres")]
    async fn connect_postgres(
        config: &AppConfig,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Option<Self>> {
        use migration::MigratorTrait;

        let Some(db_config) = &config.database else {
            return Ok(None);
        };

        let connections = Arc::new(DatabaseConnections::init(db_config).await?);
        if config.auto_migrate {
            tracing::info!("Applying pending migrations");
            migration::Migrator::up(&connections.main, None).await?;
        }

        let mut state = Self::new(
            Arc::new(PostgresPostRepository::new(connections.main.clone())),
            Arc::new(PostgresUserRepository::new(connections.main.clone())),
            clock,
            config.jwt.clone(),
            config.session.clone(),
        );
        state.db = Some(connections);
        Ok(Some(state))
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect_postgres(
        _config: &AppConfig,
        _clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Option<Self>> {
        Ok(None)
    }
}
