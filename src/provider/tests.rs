use super::*;

#[test]
fn transient_errors() {
    assert!(ProviderError::Network("connection reset".to_string()).is_transient());
    assert!(ProviderError::Timeout("30s".to_string()).is_transient());
    assert!(ProviderError::RateLimited.is_transient());
    assert!(ProviderError::Status(502).is_transient());
}

#[test]
fn permanent_errors() {
    assert!(!ProviderError::Authentication { status: 401 }.is_transient());
    assert!(!ProviderError::MalformedResponse("no data".to_string()).is_transient());
    assert!(!ProviderError::Status(404).is_transient());
}

#[test]
fn default_generation_params() {
    let params = GenerationParams::default();
    assert_eq!(params.model, "gpt-4.1-nano");
    assert_eq!(params.max_tokens, 500);
    assert!((params.temperature - 0.3).abs() < f32::EPSILON);
}

#[test]
fn shared_embedder_delegates() {
    struct Fixed;

    impl Embedder for Fixed {
        fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
            Ok(vec![text.len() as f32])
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    let shared: Arc<dyn Embedder> = Arc::new(Fixed);
    let wrapped = Arc::new(shared);
    assert_eq!(wrapped.embed("abc"), Ok(vec![3.0]));
    assert_eq!(Embedder::model(&wrapped), "fixed");
}
