use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Lifetime of an issued bearer token, in seconds.
    pub token_ttl_seconds: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let token_ttl_seconds = std::env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(3600);
        Ok(Self {
            database_url,
            token_ttl_seconds,
        })
    }
}
