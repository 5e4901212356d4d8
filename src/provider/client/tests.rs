use super::*;

fn test_config() -> ProviderConfig {
    ProviderConfig {
        base_url: "http://test-host:1234/v1".to_string(),
        embedding_model: "test-embed".to_string(),
        completion_model: "test-chat".to_string(),
        max_tokens: 64,
        ..ProviderConfig::default()
    }
}

#[test]
fn client_configuration() {
    let client = ProviderClient::new(&test_config(), Credentials::new("key"))
        .expect("Failed to create client");

    assert_eq!(client.embedding_model, "test-embed");
    assert_eq!(client.generation.model, "test-chat");
    assert_eq!(client.generation.max_tokens, 64);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.base_url.path(), "/v1/");
    assert_eq!(client.timeout, Duration::from_secs(30));
    assert_eq!(client.retry_attempts, 1);
}

#[test]
fn client_builder_methods() {
    let client = ProviderClient::new(&test_config(), Credentials::new("key"))
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(5))
        .with_retry_attempts(3);

    assert_eq!(client.timeout, Duration::from_secs(5));
    assert_eq!(client.retry_attempts, 3);

    let client = client.with_retry_attempts(0);
    assert_eq!(client.retry_attempts, 1);
}

#[test]
fn invalid_config_is_rejected() {
    let config = ProviderConfig {
        base_url: "ftp://files.example.com".to_string(),
        ..ProviderConfig::default()
    };
    assert!(ProviderClient::new(&config, Credentials::new("key")).is_err());
}

#[test]
fn endpoints_join_under_base_path() {
    let client = ProviderClient::new(&test_config(), Credentials::new("key"))
        .expect("Failed to create client");

    assert_eq!(
        client.endpoint("embeddings").expect("url").as_str(),
        "http://test-host:1234/v1/embeddings"
    );
    assert_eq!(
        client.endpoint("chat/completions").expect("url").as_str(),
        "http://test-host:1234/v1/chat/completions"
    );
}

#[test]
fn status_codes_are_classified() {
    let timeout = Duration::from_secs(1);

    assert_eq!(
        classify_error(&ureq::Error::StatusCode(401), timeout),
        ProviderError::Authentication { status: 401 }
    );
    assert_eq!(
        classify_error(&ureq::Error::StatusCode(403), timeout),
        ProviderError::Authentication { status: 403 }
    );
    assert_eq!(
        classify_error(&ureq::Error::StatusCode(429), timeout),
        ProviderError::RateLimited
    );
    assert_eq!(
        classify_error(&ureq::Error::StatusCode(502), timeout),
        ProviderError::Status(502)
    );
}

#[test]
fn transport_errors_are_classified() {
    let timeout = Duration::from_secs(1);

    assert!(matches!(
        classify_error(&ureq::Error::ConnectionFailed, timeout),
        ProviderError::Network(_)
    ));
    assert!(matches!(
        classify_error(&ureq::Error::HostNotFound, timeout),
        ProviderError::Network(_)
    ));
    assert!(matches!(
        classify_error(
            &ureq::Error::Io(io::Error::new(io::ErrorKind::TimedOut, "slow")),
            timeout
        ),
        ProviderError::Timeout(_)
    ));
}

#[test]
fn retry_stops_on_non_transient_error() {
    let client = ProviderClient::new(&test_config(), Credentials::new("key"))
        .expect("Failed to create client")
        .with_retry_attempts(3);

    let mut calls = 0;
    let result = client.make_request_with_retry(|| {
        calls += 1;
        Err(ureq::Error::StatusCode(401))
    });

    assert_eq!(result, Err(ProviderError::Authentication { status: 401 }));
    assert_eq!(calls, 1);
}

#[test]
fn retry_recovers_from_transient_error() {
    let client = ProviderClient::new(&test_config(), Credentials::new("key"))
        .expect("Failed to create client")
        .with_retry_attempts(2);

    let mut calls = 0;
    let result = client.make_request_with_retry(|| {
        calls += 1;
        if calls == 1 {
            Err(ureq::Error::StatusCode(503))
        } else {
            Ok("ok".to_string())
        }
    });

    assert_eq!(result, Ok("ok".to_string()));
    assert_eq!(calls, 2);
}

#[test]
fn single_attempt_by_default() {
    let client = ProviderClient::new(&test_config(), Credentials::new("key"))
        .expect("Failed to create client");

    let mut calls = 0;
    let result = client.make_request_with_retry(|| {
        calls += 1;
        Err(ureq::Error::ConnectionFailed)
    });

    assert!(matches!(result, Err(ProviderError::Network(_))));
    assert_eq!(calls, 1);
}
