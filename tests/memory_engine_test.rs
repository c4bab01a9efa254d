use std::sync::Arc;
use std::thread;

use searchplex::{
    DOC_ID_FIELD, FieldValue, InputDocument, MemorySearchEngine, SearchEngine, SearchQuery,
    SortOrder,
};

fn person(id: &str, name: &str, color: &str) -> InputDocument {
    InputDocument::with_id(id)
        .field("name", name)
        .field("color", color)
        .field("type", "person")
}

#[test]
fn test_add_then_query_by_id() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    let doc = InputDocument::with_id("u1")
        .field("name", "Alice Smith")
        .field("tags", vec!["a", "b"]);
    engine.add(vec![doc])?;

    let response = engine.query(&SearchQuery::new("DocId:u1"))?;
    assert_eq!(response.num_found, 1);

    // Collections come back flattened.
    let result = &response.results[0];
    assert_eq!(result.unique_id(), "u1");
    assert_eq!(result.field_values(DOC_ID_FIELD), &[FieldValue::from("u1")]);
    assert_eq!(
        result.field_values("name"),
        &[FieldValue::from("Alice Smith")]
    );
    assert_eq!(
        result.field_values("tags"),
        &[FieldValue::from("a"), FieldValue::from("b")]
    );
    Ok(())
}

#[test]
fn test_add_is_idempotent() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    engine.add(vec![person("u1", "Alice", "red")])?;
    engine.add(vec![person("u1", "Alice", "red")])?;
    assert_eq!(engine.document_count()?, 1);

    // Last write wins.
    engine.add(vec![person("u1", "Alicia", "red")])?;
    let response = engine.query(&SearchQuery::new("DocId:u1"))?;
    assert_eq!(response.num_found, 1);
    assert_eq!(
        response.results[0].first_value("name"),
        Some(&FieldValue::from("Alicia"))
    );
    Ok(())
}

#[test]
fn test_delete_missing_id_is_noop() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    engine.add(vec![person("u1", "Alice", "red")])?;

    engine.delete_by_id(&["nope"])?;
    assert_eq!(engine.document_count()?, 1);

    engine.delete_by_id(&["u1", "u1"])?;
    assert_eq!(engine.document_count()?, 0);
    Ok(())
}

#[test]
fn test_facets_by_descending_count() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    engine.add(vec![
        person("u1", "Alice", "red"),
        person("u2", "Bob", "blue"),
        person("u3", "Carol", "red"),
    ])?;

    let query = SearchQuery::new("type:person").add_facet_field("color");
    let response = engine.query(&query)?;

    let color = response.facet_field("color").expect("color facet");
    let counts: Vec<(&str, usize)> = color
        .values
        .iter()
        .map(|v| (v.value.as_str(), v.count))
        .collect();
    assert_eq!(counts, vec![("red", 2), ("blue", 1)]);
    Ok(())
}

#[test]
fn test_uri_query_matches_uri_term() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    engine.add(vec![
        InputDocument::with_id("d1").field("uri", "http://example.org/x"),
        InputDocument::with_id("d2").field("uri", "http://example.org/y"),
    ])?;

    let response = engine.query(&SearchQuery::new("uri:http://example.org/x"))?;
    assert_eq!(response.ids(), vec!["d1"]);

    // Unqualified terms search every field.
    let response = engine.query(&SearchQuery::new("http://example.org/y"))?;
    assert_eq!(response.ids(), vec!["d2"]);
    Ok(())
}

#[test]
fn test_terms_are_case_insensitive_and_tokenized() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    engine.add(vec![person("u1", "Alice Smith", "red")])?;

    assert_eq!(engine.query(&SearchQuery::new("name:SMITH"))?.num_found, 1);
    assert_eq!(engine.query(&SearchQuery::new("name:alice"))?.num_found, 1);
    assert_eq!(engine.query(&SearchQuery::new("name:ali"))?.num_found, 0);
    Ok(())
}

#[test]
fn test_unsupported_query_matches_nothing() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    engine.add(vec![person("u1", "Alice", "red")])?;

    for text in ["name:alice AND color:red", "name:ali*", "\"alice red\"", ""] {
        let response = engine.query(&SearchQuery::new(text))?;
        assert_eq!(response.num_found, 0, "{text}");
    }
    Ok(())
}

#[test]
fn test_filters_sorting_and_paging() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    engine.add(vec![
        person("u1", "Dave", "red"),
        person("u2", "Alice", "red"),
        person("u3", "Carol", "blue"),
        person("u4", "Bob", "red"),
    ])?;

    let query = SearchQuery::new("type:person")
        .add_filter("color:red")
        .add_sort_field("name", SortOrder::Asc)
        .with_start(1)
        .with_rows(2)
        .add_field_to_return("name");
    let response = engine.query(&query)?;

    assert_eq!(response.num_found, 3);
    assert_eq!(response.ids(), vec!["u4", "u1"]);
    assert_eq!(
        response.results[0].field_names().collect::<Vec<_>>(),
        vec!["name"]
    );
    assert!(response.highlights.is_none());
    Ok(())
}

#[test]
fn test_delete_by_query() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    engine.add(vec![
        person("u1", "Alice", "red"),
        person("u2", "Bob", "blue"),
        person("u3", "Carol", "red"),
    ])?;

    engine.delete_by_query("color:red")?;
    assert_eq!(engine.document_count()?, 1);
    assert_eq!(engine.query(&SearchQuery::new("type:person"))?.ids(), vec!["u2"]);
    Ok(())
}

#[test]
fn test_stored_document_is_a_copy() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    let mut doc = person("u1", "Alice", "red");
    engine.add(vec![doc.clone()])?;

    doc.add_values("name", ["Changed"]);
    let response = engine.query(&SearchQuery::new("name:changed"))?;
    assert_eq!(response.num_found, 0);
    Ok(())
}

#[test]
fn test_concurrent_readers_and_writers() -> searchplex::Result<()> {
    let engine = Arc::new(MemorySearchEngine::new());

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..25 {
                    let id = format!("t{t}-{i}");
                    engine.add(vec![person(&id, "Alice", "red")]).unwrap();
                    let found = engine
                        .query(&SearchQuery::new("type:person"))
                        .unwrap()
                        .num_found;
                    assert!(found >= 1);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(engine.document_count()?, 100);
    Ok(())
}

#[test]
fn test_whole_floats_keep_fraction() -> searchplex::Result<()> {
    let engine = MemorySearchEngine::new();
    engine.add(vec![
        InputDocument::with_id("u1").field("score", 2.0),
        InputDocument::with_id("u2").field("score", 2.5),
    ])?;

    assert_eq!(engine.query(&SearchQuery::new("score:2.0"))?.ids(), vec!["u1"]);
    assert_eq!(engine.query(&SearchQuery::new("score:2"))?.num_found, 0);

    let query = SearchQuery::new("DocId:u1").add_facet_field("score");
    let response = engine.query(&query)?;
    let score = response.facet_field("score").expect("score facet");
    assert_eq!(score.count_of("2.0"), Some(1));
    assert_eq!(score.count_of("2"), None);
    Ok(())
}
