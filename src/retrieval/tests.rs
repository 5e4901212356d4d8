use super::*;

/// Maps a few known words onto fixed axes
struct KeywordEmbedder;

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<crate::provider::Embedding, ProviderError> {
        let text = text.to_lowercase();
        Ok(vec![
            f32::from(u8::from(text.contains("engineer"))),
            f32::from(u8::from(text.contains("chess"))),
            f32::from(u8::from(text.contains("contact"))),
        ])
    }

    fn model(&self) -> &str {
        "keyword"
    }
}

struct TimeoutEmbedder;

impl Embedder for TimeoutEmbedder {
    fn embed(&self, _text: &str) -> Result<crate::provider::Embedding, ProviderError> {
        Err(ProviderError::Timeout("no response within 30s".to_string()))
    }

    fn model(&self) -> &str {
        "keyword"
    }
}

fn profile_store() -> Arc<IndexStore> {
    let chunks = vec![
        "He enjoys chess on weekends.".to_string(),
        "Nahiyan works as a software engineer.".to_string(),
        "Contact him by email.".to_string(),
    ];
    let vectors = chunks
        .iter()
        .map(|c| KeywordEmbedder.embed(c).expect("embedding should succeed"))
        .collect();
    Arc::new(
        IndexStore::from_parts("keyword", Metric::InnerProduct, vectors, chunks)
            .expect("store should build"),
    )
}

#[test]
fn retrieves_most_relevant_chunk_first() {
    let retriever = Retriever::new(Arc::new(KeywordEmbedder), profile_store());

    let results = retriever
        .retrieve("Is he an engineer?", 2)
        .expect("retrieval should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].text, "Nahiyan works as a software engineer.");
    assert_eq!(results[0].position, 1);
}

#[test]
fn embedding_failure_propagates() {
    let retriever = Retriever::new(Arc::new(TimeoutEmbedder), profile_store());

    let result = retriever.retrieve("anything", 3);
    assert!(matches!(
        result,
        Err(RetrievalError::Embedding(ProviderError::Timeout(_)))
    ));
}

#[test]
fn index_failure_propagates() {
    let store = Arc::new(
        IndexStore::from_parts("keyword", Metric::L2, vec![vec![1.0, 0.0]], vec![
            "two dimensional".to_string(),
        ])
        .expect("store should build"),
    );
    let retriever = Retriever::new(Arc::new(KeywordEmbedder), store);

    let result = retriever.retrieve("engineer", 1);
    assert!(matches!(
        result,
        Err(RetrievalError::Index(IndexError::QueryDimension { .. }))
    ));
}

#[test]
fn default_config() {
    let config = RetrievalConfig::default();
    assert_eq!(config.top_k, 3);
    assert_eq!(config.max_query_chars, 2000);
    assert_eq!(config.metric, Metric::L2);
}
