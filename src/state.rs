use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{MemoryUserStore, PgUserStore, UserStore};
use crate::auth::service::AuthService;
use crate::config::{AppConfig, JwtConfig, ProviderConfig};
use crate::providers::{CocktailProvider, RecipeProvider};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub recipes: RecipeProvider,
    pub cocktails: CocktailProvider,
}

impl AppState {
    /// Production wiring: environment config, Postgres credential store,
    /// migrations applied at boot.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        Self::from_parts(config, Arc::new(PgUserStore::new(db)))
    }

    /// Wires the state from an already-built config and credential store.
    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
    ) -> anyhow::Result<Self> {
        let keys = JwtKeys::new(&config.jwt);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.providers.http_timeout_secs))
            .build()
            .context("build http client")?;

        Ok(Self {
            auth: AuthService::new(users, keys),
            recipes: RecipeProvider::new(&config.providers, http.clone()),
            cocktails: CocktailProvider::new(&config.providers, http),
            config,
        })
    }

    /// State backed by an in-memory credential store; no Postgres or
    /// network needed. Used by the test suites.
    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            database_url: "postgres://unused".into(),
            db_acquire_timeout_secs: 5,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                ttl_days: 7,
            },
            providers: ProviderConfig {
                spoonacular_api_key: "test-key".into(),
                spoonacular_base_url: "http://127.0.0.1:9".into(),
                cocktaildb_api_key: "1".into(),
                cocktaildb_base_url: "http://127.0.0.1:9".into(),
                http_timeout_secs: 2,
            },
        });
        Self::from_parts(config, Arc::new(MemoryUserStore::default()))
            .expect("in-memory state wiring")
    }
}
