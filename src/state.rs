use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::TokenService;
use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, LogMailer, Mailer, SeaOrmAuthService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub mailer: Arc<dyn Mailer>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let tokens = Arc::new(TokenService::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_hours,
        ));

        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens.clone(),
            mailer.clone(),
            &config.auth,
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            tokens,
            mailer,
            auth_service,
        })
    }
}
