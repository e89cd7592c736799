use std::env;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Redis,
    Sqlite,
    Memory,
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "sqlite" | "jdbc" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Config(format!("unknown TODO_BACKEND: {}", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdStrategy {
    Sequential,
    Random,
}

impl FromStr for IdStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "random" => Ok(Self::Random),
            other => Err(AppError::Config(format!("unknown ID_STRATEGY: {}", other))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    pub redis_url: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub id_strategy: IdStrategy,
    pub seed_sample: bool,
}

impl Config {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: var("HOST", "127.0.0.1"),
            port: parse(&var("PORT", "8082"), "PORT")?,
            backend: var("TODO_BACKEND", "redis").parse()?,
            redis_url: var("REDIS_URL", "redis://127.0.0.1:6379"),
            database_url: var("DATABASE_URL", "sqlite://todo.db?mode=rwc"),
            database_max_connections: parse(
                &var("DATABASE_MAX_CONNECTIONS", "5"),
                "DATABASE_MAX_CONNECTIONS",
            )?,
            id_strategy: var("ID_STRATEGY", "sequential").parse()?,
            seed_sample: parse_flag(&var("SEED_SAMPLE", "true"), "SEED_SAMPLE")?,
        })
    }

    /// `host:port` the listener binds to.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(value: &str, key: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} is not valid: {}", key, value)))
}

fn parse_flag(value: &str, key: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::Config(format!("{} is not valid: {}", key, value))),
    }
}
