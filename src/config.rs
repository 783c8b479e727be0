use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub db_host: String,
    pub db_port: String,
    pub db_name: String,
    pub db_user: String,
    pub db_pass: String,

    /// Number of pooled database sessions.
    pub max_db_conn: usize,

    // API settings
    pub api_port: u16,

    /// Zone the pre-aggregated summary tables are computed in.
    pub default_timezone: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let required =
            |name: &'static str| env::var(name).map_err(|_| ConfigError::Missing(name));

        // A non-positive override clamps to a single connection; no override
        // defaults to the number of online processors.
        let max_db_conn = env::var("MAX_DB_CONN")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(|n| if n < 1 { 1 } else { n as usize })
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(usize::from)
                    .unwrap_or(1)
            });

        Ok(Self {
            db_host: required("DB_HOST")?,
            db_port: required("DB_PORT")?,
            db_name: required("DB_NAME")?,
            db_user: required("DB_USER")?,
            db_pass: required("DB_PASS")?,
            max_db_conn,
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            default_timezone: env::var("DEFAULT_TIMEZONE")
                .unwrap_or_else(|_| "Europe/Madrid".to_string()),
        })
    }

    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_user, self.db_pass, self.db_host, self.db_port, self.db_name
        )
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.api_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
