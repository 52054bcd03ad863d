//! Configuration loading and validation tests

#[cfg(test)]
mod tests {
    use odoo_gateway::config::{Config, LogFormat};
    use odoo_gateway::GatewayError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_full_config_is_valid() {
        let file = write_config(
            r#"
server:
  host: "127.0.0.1"
  port: 8088
  dev_mode: true
upstream:
  url: "https://erp.example.com/"
  database: "prod"
  username: "bot@example.com"
  api_key: "upstream-key"
  timeout_seconds: 15
  read_retries: 2
auth:
  require_api_keys: true
rate_limit:
  default_rpm: 120
audit:
  retention_days: 14
  max_payload_chars: 500
storage:
  database:
    url: "sqlite::memory:"
logging:
  level: "debug"
  format: "json"
"#,
        );

        let config = Config::from_file(file.path()).await.unwrap();
        config.validate().unwrap();

        assert_eq!(config.server().address(), "127.0.0.1:8088");
        assert_eq!(config.upstream().base_url(), "https://erp.example.com");
        assert_eq!(config.upstream().secret(), "upstream-key");
        assert_eq!(config.upstream().read_retries, 2);
        assert_eq!(config.gateway.audit.max_payload_chars, 500);
        assert_eq!(config.logging().format, LogFormat::Json);

        let public = config.gateway.public();
        assert_eq!(public.rate_limit_requests_per_minute, 120);
        assert_eq!(public.audit_retention_days, 14);
        assert_eq!(public.upstream_timeout_seconds, 15);
    }

    #[tokio::test]
    async fn test_missing_upstream_credentials_fail_validation() {
        let file = write_config(
            r#"
upstream:
  url: "https://erp.example.com"
  database: "prod"
"#,
        );

        let config = Config::from_file(file.path()).await.unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
        assert!(err.to_string().contains("username"));
    }

    #[tokio::test]
    async fn test_invalid_values_fail_validation() {
        let cases = [
            ("url: \"not a url\"", "URL"),
            ("timeout_seconds: 0", "timeout"),
        ];

        for (line, expected) in cases {
            let file = write_config(&format!(
                "upstream:\n  database: prod\n  username: admin\n  password: secret\n  {}\n",
                line
            ));
            let config = Config::from_file(file.path()).await.unwrap();
            let err = config.validate().unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "{} should mention {}: {}",
                line,
                expected,
                err
            );
        }

        let file = write_config(
            "upstream:\n  database: prod\n  username: admin\n  password: secret\nrate_limit:\n  default_rpm: 0\n",
        );
        let config = Config::from_file(file.path()).await.unwrap();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_environment_overrides_the_file() {
        let file = write_config(
            "upstream:\n  url: http://old:8069\n  database: prod\n  username: admin\n  password: file-secret\nserver:\n  port: 3000\n",
        );
        let mut config = Config::from_file(file.path()).await.unwrap();

        let env = [
            ("ODOO_URL", "http://erp.internal:8069"),
            ("ODOO_API_KEY", "env-key"),
            ("GATEWAY_PORT", "9090"),
            ("REQUIRE_API_KEYS", "false"),
        ];
        config
            .gateway
            .apply_env_overrides(|name| {
                env.iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| value.to_string())
            })
            .unwrap();
        config.validate().unwrap();

        assert_eq!(config.upstream().url, "http://erp.internal:8069");
        assert_eq!(config.upstream().secret(), "env-key");
        assert_eq!(config.server().port, 9090);
        assert!(!config.gateway.auth.require_api_keys);
        assert_eq!(config.upstream().database, "prod");

        let bad_port = config
            .gateway
            .apply_env_overrides(|name| (name == "GATEWAY_PORT").then(|| "ninety".to_string()));
        assert!(matches!(bad_port, Err(GatewayError::Config(_))));
    }
}
