use std::sync::Arc;

use searchplex::logging::{format_query, summarize_response};
use searchplex::{
    InputDocument, LoggingSearchEngine, MemorySearchEngine, SearchEngine, SearchQuery,
};

fn engines() -> (Arc<MemorySearchEngine>, LoggingSearchEngine) {
    let inner = Arc::new(MemorySearchEngine::new());
    let logging = LoggingSearchEngine::new(inner.clone());
    (inner, logging)
}

#[test]
fn test_forwards_calls_unchanged() -> searchplex::Result<()> {
    let (inner, logging) = engines();

    logging.startup()?;
    logging.ping()?;
    logging.add(vec![
        InputDocument::with_id("u1").field("nameRaw", "Alice").field("type", "person"),
        InputDocument::with_id("u2").field("nameRaw", "Bob").field("type", "person"),
    ])?;
    logging.commit(true)?;
    assert_eq!(logging.document_count()?, 2);
    assert_eq!(inner.document_count()?, 2);

    let query = logging.create_query_with_text("type:person").add_facet_field("type");
    assert_eq!(logging.query(&query)?, inner.query(&query)?);

    logging.delete_by_id(&["u1"])?;
    assert_eq!(inner.document_count()?, 1);

    logging.delete_by_query("type:person")?;
    assert_eq!(inner.document_count()?, 0);

    logging.shutdown()?;
    Ok(())
}

#[test]
fn test_errors_pass_through() -> searchplex::Result<()> {
    let (inner, logging) = engines();

    let docs = vec![
        InputDocument::with_id("u1"),
        InputDocument::new().field("nameRaw", "nobody"),
    ];
    let err = logging.add(docs).unwrap_err();

    assert_eq!(err.failures().len(), 1);
    assert_eq!(err.failures()[0].item, "document #1");
    assert_eq!(inner.document_count()?, 1);
    Ok(())
}

#[test]
fn test_unparseable_queries_are_forwarded() -> searchplex::Result<()> {
    let (_, logging) = engines();
    logging.add(vec![InputDocument::with_id("u1").field("nameRaw", "Alice")])?;

    for text in ["(unbalanced", "a AND b", "uri:http://example.org/x"] {
        let response = logging.query(&SearchQuery::new(text))?;
        assert_eq!(response.num_found, 0, "{text}");
    }
    Ok(())
}

#[test]
fn test_summaries() -> searchplex::Result<()> {
    let (_, logging) = engines();
    logging.add(vec![
        InputDocument::with_id("u1").field("nameRaw", "Alice"),
        InputDocument::with_id("u2").field("nameRaw", vec!["Bob", "Robert"]),
    ])?;

    let query = SearchQuery::new("DocId:u2").with_rows(5);
    assert_eq!(format_query(&query), "SearchQuery[queryText=DocId:u2, rows=5]");

    let response = logging.query(&query)?;
    assert_eq!(
        summarize_response(&response, "nameRaw"),
        "RESPONSE: 1 of 1, [[u2, [Bob, Robert]]]"
    );
    Ok(())
}
