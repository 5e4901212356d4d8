use super::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

mod integration_tests {
    use super::*;

    #[test]
    fn config_file_persistence() {
        let temp_dir = TempDir::new().expect("should create TempDir successfully");

        let mut original_config = Config {
            base_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        original_config.provider.base_url = "https://llm.internal.example/v1".to_string();
        original_config.provider.api_key_env = "ASSISTANT_KEY".to_string();
        original_config.chunking.max_words = 80;

        original_config.save().expect("should save config");

        let content = fs::read_to_string(temp_dir.path().join("config.toml"))
            .expect("should read from config_path successfully");
        assert!(content.contains("ASSISTANT_KEY"));

        let loaded_config = Config::load(temp_dir.path()).expect("should load config");
        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn invalid_toml_handling() {
        let invalid_toml = r#"
            [provider
            base_url = "http://localhost"
            timeout_seconds = "thirty"
        "#;

        let result: Result<Config, toml::de::Error> = toml::from_str(invalid_toml);
        assert!(result.is_err());
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let invalid_toml = r#"
            [provider]
            timeout_seconds = "thirty"
        "#;

        let result: Result<Config, toml::de::Error> = toml::from_str(invalid_toml);
        assert!(result.is_err());
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").expect("empty toml should parse");
        assert_eq!(config.provider, ProviderConfig::default());
        assert!(config.index_dir.is_none());
    }

    #[test]
    fn explicit_config_dir_wins() {
        let dir = get_config_dir(Some(Path::new("/tmp/assistant-config")))
            .expect("explicit dir should resolve");
        assert_eq!(dir, Path::new("/tmp/assistant-config"));
    }

    #[test]
    fn error_display_messages() {
        let errors = vec![
            ConfigError::InvalidProtocol("ftp".to_string()),
            ConfigError::InvalidTimeout(0),
            ConfigError::InvalidTopK(0),
            ConfigError::InvalidModel(String::new()),
            ConfigError::InvalidUrl("invalid-url".to_string()),
            ConfigError::MissingCredential("EURI_API_KEY".to_string()),
            ConfigError::ModelMismatch {
                index: "a".to_string(),
                configured: "b".to_string(),
            },
        ];

        for error in errors {
            let message = format!("{error}");
            assert!(!message.is_empty());
            assert!(message.len() > 10);
        }
    }
}
