use agentmem_core::RetrievalConfig;

#[test]
fn defaults_match_spec_weights() {
    let config = RetrievalConfig::default();
    assert_eq!(config.scorer.explicit_relation, 5.0);
    assert_eq!(config.scorer.tag_match, 1.0);
    assert_eq!(config.scorer.scope_proximity, 2.0);
    assert_eq!(config.scorer.text_match, 1.0);
    assert_eq!(config.scorer.priority_max, 3.0);
    assert_eq!(config.scorer.semantic_max, 4.0);
    assert_eq!(config.scorer.recency_max, 2.0);
    assert_eq!(config.default_limit, 20);
    assert_eq!(config.max_limit, 500);
}

#[test]
fn partial_toml_document_fills_remaining_fields_with_defaults() {
    let toml = r#"
        default_limit = 10

        [scorer]
        explicit_relation = 9.0
    "#;
    let config = RetrievalConfig::from_toml(toml).unwrap();
    assert_eq!(config.default_limit, 10);
    assert_eq!(config.scorer.explicit_relation, 9.0);
    // untouched fields keep their defaults
    assert_eq!(config.scorer.tag_match, 1.0);
    assert_eq!(config.max_limit, 500);
}
