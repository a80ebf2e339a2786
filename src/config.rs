use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    /// Key for the HMAC digests of offer response tokens.
    pub offer_token_secret: String,
    pub api_rps: u32,
    pub public_rps: u32,
    /// Minutes east of UTC used for the "hired this month" boundary.
    pub stats_utc_offset_minutes: i32,
    pub offer_expiry_sweep_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            offer_token_secret: get_env("OFFER_TOKEN_SECRET")?,
            api_rps: get_env_parse("API_RPS")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            stats_utc_offset_minutes: env::var("STATS_UTC_OFFSET_MINUTES")
                .ok()
                .map(|raw| {
                    raw.parse().map_err(|e| {
                        Error::Config(format!("Invalid value for STATS_UTC_OFFSET_MINUTES: {}", e))
                    })
                })
                .transpose()?
                .unwrap_or(0),
            offer_expiry_sweep_secs: env::var("OFFER_EXPIRY_SWEEP_SECS")
                .ok()
                .map(|raw| {
                    raw.parse().map_err(|e| {
                        Error::Config(format!("Invalid value for OFFER_EXPIRY_SWEEP_SECS: {}", e))
                    })
                })
                .transpose()?
                .unwrap_or(60),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
