use std::env;

use chrono::Duration;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::{
    constants::{
        DEFAULT_BRAND_NAME, DEFAULT_MAX_CONNECTIONS, DEFAULT_SESSION_LIFETIME_HOURS,
        MAX_SESSION_LIFETIME_HOURS,
    },
    error::Error,
    jwt::SessionKey,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub session_lifetime: Duration,
    pub max_connections: u32,
    pub brand: String,
}

impl Config {
    /// Reads `.env` when present, then the process environment.
    pub fn from_env() -> Result<Self, Error> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {e}");
        }

        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| Error::Config(format!("{name} must be set")))
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            session_secret: required("SESSION_SECRET")?,
            session_lifetime: session_lifetime(parse_or(
                &lookup,
                "SESSION_LIFETIME_HOURS",
                DEFAULT_SESSION_LIFETIME_HOURS,
            )?)?,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            brand: lookup("BRAND_NAME").unwrap_or_else(|| DEFAULT_BRAND_NAME.to_owned()),
        })
    }

    pub fn session_key(&self) -> Result<SessionKey, Error> {
        SessionKey::new(self.session_secret.as_bytes())
    }

    /// Opens the pool and brings the schema up to date.
    pub async fn connect(&self) -> Result<Pool<Postgres>, Error> {
        log::info!(
            "Connecting to database with up to {} connections",
            self.max_connections
        );

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }
}

/// Tokens must outlive their issue time and expire within a year.
fn session_lifetime(hours: i64) -> Result<Duration, Error> {
    if !(1..=MAX_SESSION_LIFETIME_HOURS).contains(&hours) {
        return Err(Error::Config(format!(
            "SESSION_LIFETIME_HOURS must be between 1 and {MAX_SESSION_LIFETIME_HOURS}, got {hours}"
        )));
    }

    Duration::try_hours(hours)
        .ok_or_else(|| Error::Config(format!("SESSION_LIFETIME_HOURS is out of range: {hours}")))
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .parse()
            .map_err(|_| Error::Config(format!("{name} has an invalid value: {value}"))),
        None => Ok(default),
    }
}
