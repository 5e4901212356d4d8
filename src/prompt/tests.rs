use super::*;

#[test]
fn empty_context_still_produces_prompt() {
    let prompt = build_prompt(&[], "What are his interests?");

    assert!(!prompt.is_empty());
    assert!(prompt.contains("What are his interests?"));
    assert!(prompt.contains("No relevant context was found"));
    assert!(!prompt.contains("[Source"));
}

#[test]
fn context_chunks_are_labeled_in_order() {
    let context = vec![
        "Nahiyan is a software engineer.".to_string(),
        "He built three projects.".to_string(),
    ];
    let prompt = build_prompt(&context, "What does Nahiyan do?");

    let first = prompt.find("[Source 1]").expect("first label");
    let second = prompt.find("[Source 2]").expect("second label");
    let question = prompt.find("What does Nahiyan do?").expect("question");

    assert!(first < second);
    assert!(second < question);
    assert!(prompt.contains("Nahiyan is a software engineer."));
    assert!(!prompt.contains("No relevant context was found"));
}

#[test]
fn instructions_restrict_answers_to_context() {
    let prompt = build_prompt(&["x".to_string()], "q");
    assert!(prompt.contains("Answer only from the provided context"));
    assert!(prompt.contains("do not have enough information"));
}

#[test]
fn query_is_embedded_literally() {
    let query = "Does he know {braces} and \"quotes\"?";
    assert!(build_prompt(&[], query).contains(query));
}

#[test]
fn builder_uses_configured_subject() {
    let builder = PromptBuilder::new(&PromptConfig {
        subject: "Ada".to_string(),
    });
    let prompt = builder.build(&[], "Who?");
    assert!(prompt.contains("questions about Ada"));
    assert!(!prompt.contains("Nahiyan"));
}

#[test]
fn output_is_deterministic() {
    let context = vec!["a".to_string(), "b".to_string()];
    assert_eq!(build_prompt(&context, "q"), build_prompt(&context, "q"));
}
