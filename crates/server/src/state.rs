//! Application state and the adapters between subsystems

use std::sync::Arc;

use async_trait::async_trait;
use ringline_session_core::{
    CallStateMachine, IdentityProvider, SessionError, SqliteSessionStore, UserId,
};
use ringline_signaling_core::{ConnectionRegistry, SignalingRelay};
use ringline_users_core::{AuthenticationService, JwtConfig, JwtIssuer, SqliteUserStore, UserStore};

use crate::config::ServerConfig;

/// Everything the handlers need, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<SqliteUserStore>,
    pub auth: Arc<AuthenticationService>,
    pub machine: Arc<CallStateMachine>,
    pub relay: Arc<SignalingRelay>,
}

impl AppState {
    /// Wire up stores, state machine and relay over one database pool.
    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let users = Arc::new(SqliteUserStore::new(&config.database_url).await?);
        let sessions = Arc::new(SqliteSessionStore::with_pool(users.pool().clone()).await?);

        let jwt_issuer = JwtIssuer::new(JwtConfig {
            secret: config.secret_key.clone(),
            ..JwtConfig::default()
        })?;
        let auth = Arc::new(AuthenticationService::new(users.clone(), jwt_issuer));

        let machine = Arc::new(CallStateMachine::new(
            sessions,
            Arc::new(UserDirectory::new(users.clone())),
        ));
        let registry = Arc::new(ConnectionRegistry::new());
        let relay = Arc::new(SignalingRelay::new(registry, machine.clone()));

        Ok(Self {
            users,
            auth,
            machine,
            relay,
        })
    }
}

/// Adapter: the session layer's identity seam, answered by the user store.
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityProvider for UserDirectory {
    async fn resolve_user(&self, user_id: UserId) -> ringline_session_core::Result<bool> {
        self.store
            .get_user(user_id)
            .await
            .map(|user| user.is_some())
            .map_err(|e| SessionError::StoreUnavailable(e.to_string()))
    }
}
