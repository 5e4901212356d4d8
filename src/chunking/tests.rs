use super::*;

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn rejoin(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn empty_corpus_yields_no_chunks() {
    let chunks = chunk_text("", 100).expect("chunking should succeed");
    assert!(chunks.is_empty());

    let chunks = chunk_text("  \n\t  ", 100).expect("chunking should succeed");
    assert!(chunks.is_empty());
}

#[test]
fn short_corpus_yields_single_chunk() {
    let corpus = "Nahiyan is a software engineer. He built three projects.";
    let chunks = chunk_text(corpus, 100).expect("chunking should succeed");

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, corpus);
    assert_eq!(chunks[0].position, 0);
    assert_eq!(chunks[0].word_count, 9);
}

#[test]
fn zero_max_words_is_rejected() {
    assert_eq!(chunk_text("some words", 0), Err(InputError::ZeroMaxWords));
    assert_eq!(chunk_text("", 0), Err(InputError::ZeroMaxWords));
}

#[test]
fn chunks_respect_word_limit() {
    let corpus = "one two three four five six seven";
    let chunks = chunk_text(corpus, 3).expect("chunking should succeed");

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].text, "one two three");
    assert_eq!(chunks[1].text, "four five six");
    assert_eq!(chunks[2].text, "seven");
    assert!(chunks.iter().all(|c| c.word_count <= 3));
}

#[test]
fn exact_multiple_has_no_trailing_empty_chunk() {
    let chunks = chunk_text("a b c d", 2).expect("chunking should succeed");
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| !c.text.is_empty()));
}

#[test]
fn positions_follow_corpus_order() {
    let chunks = chunk_text("a b c d e f g h", 2).expect("chunking should succeed");
    let positions: Vec<usize> = chunks.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);
}

#[test]
fn rejoined_chunks_reproduce_normalized_corpus() {
    let corpus = "  Nahiyan\tstudied   computer science.\n\nHe enjoys\r\nhiking,  chess and\tbuilding tools.  ";
    let normalized = normalize_whitespace(corpus);

    for max_words in [1, 2, 3, 5, 7, 100] {
        let chunks = chunk_text(corpus, max_words).expect("chunking should succeed");
        assert_eq!(rejoin(&chunks), normalized, "max_words = {max_words}");
    }
}

#[test]
fn words_are_never_split() {
    let corpus = "supercalifragilistic antidisestablishmentarianism short";
    let chunks = chunk_text(corpus, 1).expect("chunking should succeed");

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].text, "supercalifragilistic");
    assert_eq!(chunks[1].text, "antidisestablishmentarianism");
}

#[test]
fn unicode_whitespace_is_a_separator() {
    let corpus = "alpha\u{00A0}beta\u{2003}gamma";
    let chunks = chunk_text(corpus, 2).expect("chunking should succeed");

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "alpha beta");
    assert_eq!(chunks[1].text, "gamma");
}

#[test]
fn default_config_uses_one_hundred_words() {
    assert_eq!(ChunkingConfig::default().max_words, 100);
}
