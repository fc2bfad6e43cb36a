use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct RecaptchaConfig {
    pub enabled: bool,
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_conn: u32,
    pub run_migrations: bool,
    pub port: u16,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: u8,
    pub redis_password: Option<String>,
    pub recaptcha: RecaptchaConfig,
    pub session_ttl_minutes: i64,
    pub otel_endpoint: Option<String>,
    pub admin: Option<AdminConfig>,
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(anyhow!("{name} must be 'true' or 'false', got '{other}'")),
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    pub fn init() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("Missing environment variable: DATABASE_URL")?;
        let run_migrations_str = std::env::var("RUN_MIGRATIONS")
            .context("Missing environment variable: RUN_MIGRATIONS")?;
        let port_str = std::env::var("PORT").context("Missing environment variable: PORT")?;

        let run_migrations = parse_bool("RUN_MIGRATIONS", &run_migrations_str)?;

        let port = port_str
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let db_max_conn = optional_var("DB_MAX_CONN")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("DB_MAX_CONN must be a valid u32 integer")?
            .unwrap_or(5);

        // redis
        let redis_host =
            std::env::var("REDIS_HOST").context("Missing environment variable: REDIS_HOST")?;

        let redis_port = optional_var("REDIS_PORT")
            .map(|v| v.parse::<u16>())
            .transpose()
            .context("REDIS_PORT must be a valid u16 integer")?
            .unwrap_or(6379);

        let redis_db = optional_var("REDIS_DB")
            .map(|v| v.parse::<u8>())
            .transpose()
            .context("REDIS_DB must be a valid u8 integer")?
            .unwrap_or(0);

        let redis_password = optional_var("REDIS_PASSWORD");

        // recaptcha
        let recaptcha_enabled = match optional_var("RECAPTCHA_ENABLED") {
            Some(v) => parse_bool("RECAPTCHA_ENABLED", &v)?,
            None => true,
        };

        let recaptcha_secret = if recaptcha_enabled {
            std::env::var("RECAPTCHA_SECRET")
                .context("Missing environment variable: RECAPTCHA_SECRET")?
        } else {
            optional_var("RECAPTCHA_SECRET").unwrap_or_default()
        };

        let session_ttl_minutes = optional_var("SESSION_TTL_MINUTES")
            .map(|v| v.parse::<i64>())
            .transpose()
            .context("SESSION_TTL_MINUTES must be a valid integer")?
            .unwrap_or(30);

        let otel_endpoint = optional_var("OTEL_ENDPOINT");

        // bootstrap admin, all three or nothing
        let admin = match (
            optional_var("ADMIN_USERNAME"),
            optional_var("ADMIN_EMAIL"),
            optional_var("ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(AdminConfig {
                username,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => {
                return Err(anyhow!(
                    "ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD must be set together"
                ));
            }
        };

        Ok(Self {
            database_url,
            db_max_conn,
            run_migrations,
            port,
            redis_host,
            redis_port,
            redis_db,
            redis_password,
            recaptcha: RecaptchaConfig {
                enabled: recaptcha_enabled,
                secret: recaptcha_secret,
            },
            session_ttl_minutes,
            otel_endpoint,
            admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_boolean_flags() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(!parse_bool("X", "false").unwrap());
        assert!(parse_bool("X", "yes").is_err());
    }
}
