use brokerdesk::config::Config;
use brokerdesk::infrastructure::persistence::Database;
use std::time::Duration;
use uuid::Uuid;

pub async fn setup_test_db() -> Database {
    // File-based SQLite, unique per test for parallel execution
    let db_url = format!("sqlite://test_{}.db?mode=rwc", Uuid::new_v4());

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    db
}

/// Config with every delay removed so worker tests run instantly
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.seed_brokers = false;
    config.worker.poll_interval = Duration::from_millis(10);
    config.worker.backoff_base = Duration::ZERO;
    config.worker.job_delay = Duration::ZERO;
    config.worker.join_delay = Duration::ZERO;
    config.worker.max_attempts = 2;
    config
}
