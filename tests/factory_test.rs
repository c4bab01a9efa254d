use searchplex::{
    EngineConfig, InputDocument, RemoteConfig, SearchEngine, SearchEngineFactory, SearchQuery,
};

#[test]
fn test_create_memory_engine() -> searchplex::Result<()> {
    let engine = SearchEngineFactory::create(&EngineConfig::Memory)?;

    engine.startup()?;
    engine.add(vec![InputDocument::with_id("u1").field("name", "Alice")])?;
    assert_eq!(engine.query(&SearchQuery::new("name:alice"))?.num_found, 1);
    Ok(())
}

#[test]
fn test_create_logging_engine_from_json() -> searchplex::Result<()> {
    let config = EngineConfig::from_json(
        r#"{"type": "logging", "name_field": "label", "wraps": {"type": "memory"}}"#,
    )?;
    let engine = SearchEngineFactory::create(&config)?;

    engine.add(vec![InputDocument::with_id("u1").field("label", "Alice")])?;
    assert_eq!(engine.document_count()?, 1);
    assert!(format!("{engine:?}").contains("label"));
    Ok(())
}

#[test]
fn test_create_remote_engine_without_connecting() -> searchplex::Result<()> {
    let config = EngineConfig::Remote(
        RemoteConfig::new("http://localhost:9200", "people").with_secondary_index("orgs"),
    );
    let engine = SearchEngineFactory::create(&config)?;

    // Building the engine does no I/O.
    assert!(format!("{engine:?}").contains("orgs"));
    Ok(())
}

#[test]
fn test_invalid_remote_config_fails() {
    let config = EngineConfig::logging(EngineConfig::Remote(RemoteConfig::new(
        "http://localhost:9200",
        "",
    )));
    assert!(SearchEngineFactory::create(&config).is_err());
}
