use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub login_url: String,
    pub run_migrations: bool,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("LOGBOARD_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid LOGBOARD_HOST: {e}"))?;

        let port: u16 = env_or("LOGBOARD_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid LOGBOARD_PORT: {e}"))?;

        let login_url = env_or("LOGBOARD_LOGIN_URL", "/login");

        let run_migrations = match env_or("LOGBOARD_RUN_MIGRATIONS", "true").as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => return Err(format!("Invalid LOGBOARD_RUN_MIGRATIONS: '{other}'")),
        };

        let log_level = env_or("LOGBOARD_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            login_url,
            run_migrations,
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
