use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Runtime configuration, resolved once at startup.
///
/// Defaults are overridden by `VAXSCHED_*` environment variables
/// (e.g. `VAXSCHED_DATABASE_URL`, `VAXSCHED_LOGLEVEL`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:scheduler.db".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("VAXSCHED_"))
        .extract()
        .expect("FATAL: invalid configuration")
});
