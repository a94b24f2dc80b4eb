use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ChatwootConfig {
    pub base_url: String,
    pub account_id: i64,
    pub api_token: String,
}

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Sleep between polls when the queue is empty
    pub poll_interval: Duration,
    pub max_attempts: i32,
    pub backoff_base: Duration,
    /// Delay before a new conversation job becomes runnable
    pub job_delay: Duration,
    /// Pause between the "reviewing" and "joined" notices
    pub join_delay: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            max_attempts: 3,
            backoff_base: Duration::from_millis(2000),
            job_delay: Duration::from_millis(500),
            join_delay: Duration::from_millis(2000),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub chatwoot: Option<ChatwootConfig>,
    pub worker: WorkerConfig,
    pub conversation_stale_hours: i64,
    pub seed_brokers: bool,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://brokerdesk.db?mode=rwc".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            chatwoot: None,
            worker: WorkerConfig::default(),
            conversation_stale_hours: 24,
            seed_brokers: true,
            otel_exporter_endpoint: None,
            service_name: "brokerdesk".to_string(),
            metrics_port: 9000,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        _ => Ok(default),
    }
}

fn parse_millis(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    parse_var(name, default.as_millis() as u64).map(Duration::from_millis)
}

fn parse_flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { name, value }),
        },
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = parse_var("SERVER_PORT", defaults.server_port)
            .map_err(|_| ConfigError::InvalidPort)?;

        let chatwoot = Self::chatwoot_from_env()?;

        let worker = WorkerConfig {
            poll_interval: parse_millis("WORKER_POLL_INTERVAL_MS", defaults.worker.poll_interval)?,
            max_attempts: parse_var("JOB_MAX_ATTEMPTS", defaults.worker.max_attempts)?,
            backoff_base: parse_millis("JOB_BACKOFF_BASE_MS", defaults.worker.backoff_base)?,
            job_delay: parse_millis("JOB_DELAY_MS", defaults.worker.job_delay)?,
            join_delay: parse_millis("WORKER_JOIN_DELAY_MS", defaults.worker.join_delay)?,
        };
        if worker.max_attempts < 1 {
            return Err(ConfigError::InvalidValue {
                name: "JOB_MAX_ATTEMPTS",
                value: worker.max_attempts.to_string(),
            });
        }

        let conversation_stale_hours =
            parse_var("CONVERSATION_STALE_HOURS", defaults.conversation_stale_hours)?;
        let seed_brokers = parse_flag("SEED_BROKERS", defaults.seed_brokers)?;

        let otel_exporter_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();
        let service_name = env::var("SERVICE_NAME").unwrap_or(defaults.service_name);
        let metrics_port = parse_var("METRICS_PORT", defaults.metrics_port)?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            chatwoot,
            worker,
            conversation_stale_hours,
            seed_brokers,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }

    /// All three variables or none
    fn chatwoot_from_env() -> Result<Option<ChatwootConfig>, ConfigError> {
        let base_url = env::var("CHATWOOT_BASE_URL").ok().filter(|v| !v.is_empty());
        let token = env::var("CHATWOOT_API_TOKEN").ok().filter(|v| !v.is_empty());
        let account = env::var("CHATWOOT_ACCOUNT_ID").ok().filter(|v| !v.is_empty());

        match (base_url, token, account) {
            (None, None, None) => Ok(None),
            (Some(base_url), Some(api_token), Some(account)) => {
                let account_id = account.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "CHATWOOT_ACCOUNT_ID",
                    value: account,
                })?;
                Ok(Some(ChatwootConfig {
                    base_url: base_url.trim_end_matches('/').to_string(),
                    account_id,
                    api_token,
                }))
            }
            _ => Err(ConfigError::IncompleteChatwoot),
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::hours(self.conversation_stale_hours.max(1))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("CHATWOOT_BASE_URL, CHATWOOT_API_TOKEN and CHATWOOT_ACCOUNT_ID must be set together")]
    IncompleteChatwoot,
}
