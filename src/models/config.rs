//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers and the worker.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    /// Directory receiving uploaded organization logos.
    pub upload_dir: String,
    /// HMAC secret for session tokens and cookie signing (at least 64 bytes).
    pub secret: String,
    /// External sign-in page; receives `callback` pointing back to `/auth/callback`.
    pub auth_service_url: String,
    /// Endpoint the worker binds its notification publisher to.
    pub zmq_notifications_pub: String,
    /// Endpoint the worker subscribes to for email notifications.
    pub zmq_emails_sub: String,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_sweep_interval() -> u64 {
    60
}

impl ServerConfig {
    /// Layers `config/default.yaml`, `config/{APP_ENV}.yaml` and `APP_*` variables.
    ///
    /// `APP_ENV` selects the profile and defaults to `local`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_interval_defaults_to_a_minute() {
        let config: ServerConfig = serde_json::from_str(
            r#"{
                "domain": "localhost",
                "address": "127.0.0.1",
                "port": 8080,
                "database_url": "app.db",
                "templates_dir": "templates/**/*",
                "upload_dir": "uploads",
                "secret": "s",
                "auth_service_url": "http://auth.localhost/signin",
                "zmq_notifications_pub": "tcp://127.0.0.1:5560",
                "zmq_emails_sub": "tcp://127.0.0.1:5561"
            }"#,
        )
        .unwrap();
        assert_eq!(config.sweep_interval_secs, 60);
    }
}
