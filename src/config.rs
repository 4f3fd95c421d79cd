use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub spoonacular_api_key: String,
    pub spoonacular_base_url: String,
    pub cocktaildb_api_key: String,
    pub cocktaildb_base_url: String,
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_acquire_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub providers: ProviderConfig,
}

impl AppConfig {
    /// Reads configuration from the environment. `DATABASE_URL`, `JWT_SECRET`
    /// and `SPOONACULAR_API_KEY` are required; startup aborts without them.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_days: std::env::var("TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        let providers = ProviderConfig {
            spoonacular_api_key: std::env::var("SPOONACULAR_API_KEY")?,
            spoonacular_base_url: std::env::var("SPOONACULAR_BASE_URL")
                .unwrap_or_else(|_| "https://api.spoonacular.com".into()),
            // "1" is TheCocktailDB's public development key
            cocktaildb_api_key: std::env::var("COCKTAILDB_API_KEY")
                .unwrap_or_else(|_| "1".into()),
            cocktaildb_base_url: std::env::var("COCKTAILDB_BASE_URL")
                .unwrap_or_else(|_| "https://www.thecocktaildb.com".into()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        Ok(Self {
            database_url,
            db_acquire_timeout_secs: std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5),
            jwt,
            providers,
        })
    }
}
