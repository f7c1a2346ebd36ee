use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Policy knobs for the ledger and the share broker.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Hours a share link stays resolvable after minting.
    pub share_ttl_hours: i64,
    /// Days before expiry at which a code counts as expiring soon (inclusive).
    pub expiring_soon_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub policy: PolicyConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL not set"))?;

        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) => s,
            Err(_) if environment == "production" => {
                anyhow::bail!("JWT_SECRET must be set when APP_ENV=production")
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, using insecure development default");
                "dev-secret-key".into()
            }
        };

        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "codestash".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "codestash-users".into()),
            ttl_minutes: env_i64("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_i64("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };

        let policy = PolicyConfig {
            share_ttl_hours: env_i64("SHARE_TTL_HOURS", 24),
            expiring_soon_days: env_i64("EXPIRING_SOON_DAYS", 7),
        };

        Ok(Self {
            database_url,
            jwt,
            policy,
        })
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}
