//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use est_config::EstConfig;
use est_core::enums::DistanceMetric;
use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};

#[test]
fn loads_oracle_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[oracle]
base_url = "http://localhost:11434/v1"
api_key = "sk-toml"
model = "llama3"
timeout_secs = 30
max_retries = 4
retry_backoff_ms = 10
"#,
        )?;

        let config: EstConfig = Figment::from(Serialized::defaults(EstConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.oracle.base_url, "http://localhost:11434/v1");
        assert_eq!(config.oracle.api_key, "sk-toml");
        assert_eq!(config.oracle.model, "llama3");
        assert_eq!(config.oracle.timeout_secs, 30);
        assert_eq!(config.oracle.max_retries, 4);
        assert_eq!(config.oracle.retry_backoff_ms, 10);
        assert!(config.oracle.is_configured());
        Ok(())
    });
}

#[test]
fn partial_sections_keep_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[retrieval]
top_k = 3
metric = "l2"

[validation]
repair_enabled = false
"#,
        )?;

        let config: EstConfig = Figment::from(Serialized::defaults(EstConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.metric, DistanceMetric::L2);
        assert_eq!(config.retrieval.query_timeout_secs, 5);
        assert!(!config.validation.repair_enabled);
        assert_eq!(config.validation.max_record_violations, 50);
        assert_eq!(config.oracle.model, "gpt-4o");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[store]
db_path = "from-toml.db"
"#,
        )?;
        jail.set_env("EST_STORE__DB_PATH", "from-env.db");

        let config: EstConfig = Figment::from(Serialized::defaults(EstConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("EST_").split("__"))
            .extract()?;

        assert_eq!(config.store.db_path, "from-env.db");
        Ok(())
    });
}

#[test]
fn project_config_is_picked_up_by_figment() {
    Jail::expect_with(|jail| {
        jail.create_dir(".est")?;
        jail.create_file(
            ".est/config.toml",
            r#"
[embedding]
enabled = false
timeout_secs = 7
"#,
        )?;

        let config = EstConfig::load().expect("config loads");
        assert!(!config.embedding.enabled);
        assert_eq!(config.embedding.timeout_secs, 7);
        Ok(())
    });
}

#[test]
fn invalid_metric_fails_extraction() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[retrieval]
metric = "manhattan"
"#,
        )?;

        let result: Result<EstConfig, _> =
            Figment::from(Serialized::defaults(EstConfig::default()))
                .merge(Toml::file("config.toml"))
                .extract();
        assert!(result.is_err());
        Ok(())
    });
}
