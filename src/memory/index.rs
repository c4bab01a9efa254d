//! The document collection of the in-memory engine and query execution.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::data::InputDocument;
use crate::error::Result;
use crate::memory::document::IndexedDocument;
use crate::query::{QueryNode, QueryParser, SearchQuery, SortField, SortOrder};
use crate::response::{FacetCount, FacetField, ResultDocument, SearchResponse};

/// Documents keyed by id, iterated in id order.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    documents: BTreeMap<String, IndexedDocument>,
    parser: QueryParser,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(parser: QueryParser) -> Self {
        Self {
            documents: BTreeMap::new(),
            parser,
        }
    }

    /// Add a document, replacing any document with the same id.
    pub fn add(&mut self, doc: &InputDocument) -> Result<()> {
        let indexed = IndexedDocument::from_input(doc)?;
        self.documents.insert(indexed.id().to_string(), indexed);
        Ok(())
    }

    /// Remove a document. Returns false if there was none.
    pub fn delete_by_id(&mut self, id: &str) -> bool {
        self.documents.remove(id).is_some()
    }

    /// Remove every document matching the query text. Returns the number removed.
    pub fn delete_by_query(&mut self, query_text: &str) -> usize {
        let node = self.parser.parse(query_text, &[]);
        let ids: Vec<String> = self
            .matches(&node)
            .into_iter()
            .map(|doc| doc.id().to_string())
            .collect();
        for id in &ids {
            self.documents.remove(id);
        }
        ids.len()
    }

    pub fn size(&self) -> usize {
        self.documents.len()
    }

    pub fn get(&self, id: &str) -> Option<&IndexedDocument> {
        self.documents.get(id)
    }

    pub fn process_query(&self, query: &SearchQuery) -> SearchResponse {
        let node = self.parser.parse_query(query);
        let mut matched = self.matches(&node);

        let facets = query
            .facet_fields
            .iter()
            .map(|field| (field.clone(), facet_counts(field, &matched, query)))
            .collect();

        let num_found = matched.len();
        if !query.sort_fields.is_empty() {
            matched.sort_by(|a, b| compare(a, b, &query.sort_fields));
        }

        let remaining = matched.into_iter().skip(query.start);
        let page: Vec<ResultDocument> = if query.rows == 0 {
            remaining
                .map(|doc| doc.to_result(&query.fields_to_return))
                .collect()
        } else {
            remaining
                .take(query.rows)
                .map(|doc| doc.to_result(&query.fields_to_return))
                .collect()
        };

        debug!("Highlighting is not computed by the in-memory index");

        SearchResponse {
            results: page,
            num_found,
            facets,
            highlights: None,
        }
    }

    fn matches(&self, node: &QueryNode) -> Vec<&IndexedDocument> {
        self.documents
            .values()
            .filter(|doc| node.evaluate(*doc))
            .collect()
    }
}

/// Count every raw value of `field` over the matched documents.
fn facet_counts(field: &str, docs: &[&IndexedDocument], query: &SearchQuery) -> FacetField {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for doc in docs {
        if let Some(indexed) = doc.field(field) {
            for value in indexed.values() {
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
        }
    }

    let mut values: Vec<FacetCount> = counts
        .into_iter()
        .filter(|(_, count)| *count >= query.facet_min_count)
        .map(|(value, count)| FacetCount { value, count })
        .collect();
    values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    values.truncate(query.facet_limit);

    FacetField {
        name: field.to_string(),
        values,
    }
}

fn compare(a: &IndexedDocument, b: &IndexedDocument, sort_fields: &[SortField]) -> Ordering {
    for sort in sort_fields {
        let ordering = a.sort_value(&sort.field).cmp(b.sort_value(&sort.field));
        let ordering = match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with_colors() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        for (id, color, name) in [
            ("u1", "red", "Carol"),
            ("u2", "red", "Alice"),
            ("u3", "blue", "Bob"),
        ] {
            let doc = InputDocument::with_id(id)
                .field("color", color)
                .field("name", name)
                .field("type", "person");
            index.add(&doc).unwrap();
        }
        index
    }

    #[test]
    fn test_add_replaces_by_id() {
        let mut index = MemoryIndex::new();
        index.add(&InputDocument::with_id("u1").field("name", "Alice")).unwrap();
        index.add(&InputDocument::with_id("u1").field("name", "Alicia")).unwrap();

        assert_eq!(index.size(), 1);
        let response = index.process_query(&SearchQuery::new("name:alicia"));
        assert_eq!(response.num_found, 1);
    }

    #[test]
    fn test_delete_by_id() {
        let mut index = index_with_colors();
        assert!(index.delete_by_id("u1"));
        assert!(!index.delete_by_id("u1"));
        assert_eq!(index.size(), 2);
    }

    #[test]
    fn test_facets_sorted_by_count() {
        let index = index_with_colors();
        let query = SearchQuery::new("type:person").add_facet_field("color");
        let response = index.process_query(&query);

        let color = response.facet_field("color").unwrap();
        assert_eq!(
            color.values,
            vec![
                FacetCount {
                    value: "red".to_string(),
                    count: 2
                },
                FacetCount {
                    value: "blue".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_facet_ties_ordered_by_value() {
        let mut index = MemoryIndex::new();
        for (id, tag) in [("u1", "zeta"), ("u2", "alpha"), ("u3", "mid")] {
            index
                .add(&InputDocument::with_id(id).field("type", "thing").field("tag", tag))
                .unwrap();
        }

        let response = index.process_query(&SearchQuery::new("type:thing").add_facet_field("tag"));
        let values: Vec<(&str, usize)> = response
            .facet_field("tag")
            .unwrap()
            .values
            .iter()
            .map(|v| (v.value.as_str(), v.count))
            .collect();
        assert_eq!(values, vec![("alpha", 1), ("mid", 1), ("zeta", 1)]);
    }

    #[test]
    fn test_facet_limit_and_min_count() {
        let index = index_with_colors();

        let limited = index.process_query(
            &SearchQuery::new("type:person")
                .add_facet_field("color")
                .with_facet_limit(1),
        );
        assert_eq!(limited.facet_field("color").unwrap().values.len(), 1);

        let min_two = index.process_query(
            &SearchQuery::new("type:person")
                .add_facet_field("color")
                .with_facet_min_count(2),
        );
        let color = min_two.facet_field("color").unwrap();
        assert_eq!(color.count_of("red"), Some(2));
        assert_eq!(color.count_of("blue"), None);
    }

    #[test]
    fn test_facets_cover_all_matches_not_just_page() {
        let index = index_with_colors();
        let query = SearchQuery::new("type:person")
            .with_rows(1)
            .add_facet_field("color");
        let response = index.process_query(&query);

        assert_eq!(response.len(), 1);
        assert_eq!(response.num_found, 3);
        assert_eq!(response.facet_field("color").unwrap().count_of("red"), Some(2));
    }

    #[test]
    fn test_sort_and_pagination() {
        let index = index_with_colors();

        let by_name = index.process_query(
            &SearchQuery::new("type:person").add_sort_field("name", SortOrder::Asc),
        );
        assert_eq!(by_name.ids(), vec!["u2", "u3", "u1"]);

        let by_color_desc = index.process_query(
            &SearchQuery::new("type:person")
                .add_sort_field("color", SortOrder::Desc)
                .add_sort_field("name", SortOrder::Desc),
        );
        assert_eq!(by_color_desc.ids(), vec!["u1", "u2", "u3"]);

        let page = index.process_query(&SearchQuery::new("type:person").with_start(1).with_rows(1));
        assert_eq!(page.ids(), vec!["u2"]);

        let past_end = index.process_query(&SearchQuery::new("type:person").with_start(10));
        assert!(past_end.is_empty());
        assert_eq!(past_end.num_found, 3);
    }

    #[test]
    fn test_filters() {
        let index = index_with_colors();
        let query = SearchQuery::new("type:person").add_filter("color:blue");
        assert_eq!(index.process_query(&query).ids(), vec!["u3"]);
    }

    #[test]
    fn test_not_implemented_matches_nothing() {
        let index = index_with_colors();
        let response = index.process_query(&SearchQuery::new("type:person AND color:red"));
        assert_eq!(response.num_found, 0);
        assert!(response.highlights.is_none());
    }

    #[test]
    fn test_delete_by_query() {
        let mut index = index_with_colors();
        assert_eq!(index.delete_by_query("color:red"), 2);
        assert_eq!(index.size(), 1);
        assert!(index.get("u3").is_some());
    }
}
