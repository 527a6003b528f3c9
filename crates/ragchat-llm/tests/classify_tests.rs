use ragchat_llm::{classify, QuestionType};

#[test]
fn comparative_wins_over_other_triggers() {
    assert_eq!(classify("Compare microservices and monoliths"), QuestionType::Comparative);
    // also procedural ("process") and complex ("explain")
    assert_eq!(classify("Explain the difference between the build process of A and B"), QuestionType::Comparative);
    assert_eq!(classify("REST vs GraphQL?"), QuestionType::Comparative);
    assert_eq!(classify("What are the pros and cons of pair programming?"), QuestionType::Comparative);
}

#[test]
fn vs_only_matches_as_a_word() {
    assert_eq!(classify("What is CVS?"), QuestionType::Factual);
}

#[test]
fn procedural_before_complex() {
    assert_eq!(classify("How to set up a CI pipeline"), QuestionType::Procedural);
    assert_eq!(classify("Why should we configure linting?"), QuestionType::Procedural);
    assert_eq!(classify("What are the steps of Scrum?"), QuestionType::Procedural);
}

#[test]
fn complex_by_keyword_or_size() {
    assert_eq!(classify("Why do teams adopt DevOps?"), QuestionType::Complex);
    assert_eq!(classify("What is the impact of technical debt?"), QuestionType::Complex);
    let long = format!("What is {}?", "really ".repeat(20));
    assert!(long.len() > 100);
    assert_eq!(classify(&long), QuestionType::Complex);
    assert_eq!(classify("a b c d e f g h i j k l m n o p"), QuestionType::Complex);
}

#[test]
fn default_is_factual() {
    assert_eq!(classify("What is continuous integration?"), QuestionType::Factual);
    assert_eq!(classify(""), QuestionType::Factual);
}

#[test]
fn classification_is_deterministic() {
    let q = "Evaluate the relationship between testing and deployment frequency";
    assert_eq!(classify(q), classify(q));
    assert_eq!(classify(q).to_string(), "complex");
}
