//! End-to-end search engine tests against a recording in-memory client.

mod common;

use serde_json::{Value, json};

use common::{MockClient, engine, hits_response};
use quarry_search::error::{FilterError, SearchError};
use quarry_search::types::{Pagination, SearchCriteria, Sort};

fn name_of(doc: quarry_search::core::RawDoc) -> Option<String> {
    doc.get("name").and_then(Value::as_str).map(str::to_string)
}

// ============================================================================
// Request shape
// ============================================================================

#[tokio::test]
async fn test_precedence_scenario() {
    let (engine, client) = engine(MockClient::new(hits_response(0, vec![])));
    let criteria = SearchCriteria::from_params(
        None,
        Some("age gt '18' and (status eq 'active' or status eq 'pending')"),
        None,
        None,
        None,
    );

    engine.search("people", &criteria, name_of).await.unwrap();

    let body = client.last_body();
    let filter = &body["query"]["bool"]["filter"][0];
    let must = filter["bool"]["must"].as_array().unwrap();
    assert_eq!(must.len(), 2);
    assert_eq!(must[0], json!({ "range": { "age": { "gt": "18" } } }));

    let should = must[1]["bool"]["should"].as_array().unwrap();
    assert_eq!(should.len(), 2);
    assert_eq!(must[1]["bool"]["minimum_should_match"], 1);
    assert_eq!(should[0], json!({ "term": { "status": "active" } }));
    assert_eq!(should[1], json!({ "term": { "status": "pending" } }));
}

#[tokio::test]
async fn test_nested_scenario() {
    let (engine, client) = engine(MockClient::new(hits_response(0, vec![])));
    let criteria =
        SearchCriteria::from_params(None, Some("department.name eq 'Eng'"), None, None, None);

    engine.search("people", &criteria, name_of).await.unwrap();

    let body = client.last_body();
    let nested = &body["query"]["bool"]["filter"][0]["nested"];
    assert_eq!(nested["path"], "department");
    assert_eq!(nested["score_mode"], "none");
    assert_eq!(nested["query"], json!({ "term": { "department.name": "Eng" } }));
}

#[tokio::test]
async fn test_free_text_scenario() {
    let (engine, client) = engine(MockClient::new(hits_response(0, vec![])));
    let criteria = SearchCriteria {
        search_text: Some("foo".to_string()),
        filter: None,
        sorts: vec![],
        pagination: Pagination::new(0, 10),
        facet_fields: vec![],
    };

    engine.search("people", &criteria, name_of).await.unwrap();

    let body = client.last_body();
    let bool_query = &body["query"]["bool"];
    assert_eq!(bool_query["must"][0]["multi_match"]["query"], "foo");
    assert_eq!(bool_query["must"][0]["multi_match"]["fields"], json!(["*"]));
    assert!(bool_query.get("filter").is_none());
    assert!(body.get("sort").is_none());
    assert_eq!(body["from"], 0);
    assert_eq!(body["size"], 10);
}

#[tokio::test]
async fn test_sort_and_pagination_reach_backend() {
    let (engine, client) = engine(MockClient::new(hits_response(0, vec![])));
    let criteria = SearchCriteria::from_params(
        None,
        None,
        Some("name, created_at desc, manager.name"),
        Some(2),
        Some(5),
    );

    engine.search("people", &criteria, name_of).await.unwrap();

    let (index, body) = client.requests().remove(0);
    assert_eq!(index, "people");
    assert_eq!(body["from"], 10);
    assert_eq!(body["size"], 5);
    assert_eq!(
        body["sort"],
        json!([
            { "name": { "order": "asc", "unmapped_type": "keyword" } },
            { "created_at": { "order": "desc", "unmapped_type": "keyword" } },
            { "manager.name": {
                "order": "asc",
                "unmapped_type": "keyword",
                "nested": { "path": "manager" }
            } }
        ])
    );
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_missing_literal_fails_before_backend() {
    let (engine, client) = engine(MockClient::new(hits_response(0, vec![])));
    let criteria = SearchCriteria::from_params(None, Some("age gt"), None, None, None);

    let err = engine.search("people", &criteria, name_of).await.unwrap_err();

    match err {
        SearchError::InvalidFilter(FilterError::Parse(parse)) => {
            assert_eq!(parse.offset, "age gt".len());
            assert_eq!(parse.found, "end of input");
        }
        other => panic!("expected InvalidFilter, got {:?}", other),
    }
    assert_eq!(client.search_calls(), 0);
}

#[tokio::test]
async fn test_lex_error_fails_before_backend() {
    let (engine, client) = engine(MockClient::new(hits_response(0, vec![])));
    let criteria = SearchCriteria::from_params(None, Some("name eq 'open"), None, None, None);

    let err = engine.search("people", &criteria, name_of).await.unwrap_err();

    assert!(matches!(
        err,
        SearchError::InvalidFilter(FilterError::Lex(_))
    ));
    assert_eq!(client.search_calls(), 0);
}

#[tokio::test]
async fn test_unsupported_literal_fails_before_backend() {
    let (engine, client) = engine(MockClient::new(hits_response(0, vec![])));
    let criteria = SearchCriteria::from_params(None, Some("age ge null"), None, None, None);

    let err = engine.search("people", &criteria, name_of).await.unwrap_err();

    assert!(matches!(err, SearchError::UnsupportedOperator { .. }));
    assert_eq!(client.search_calls(), 0);
}

#[tokio::test]
async fn test_backend_failure_is_reported() {
    let (engine, client) = engine(MockClient::unavailable());

    let err = engine
        .search("people", &SearchCriteria::default(), name_of)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::BackendUnavailable(_)));
    assert_eq!(client.search_calls(), 1);
}

#[tokio::test]
async fn test_malformed_response() {
    let (engine, _client) = engine(MockClient::new(json!({ "took": 3 })));

    let err = engine
        .search("people", &SearchCriteria::default(), name_of)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::MalformedResponse { .. }));
}

// ============================================================================
// Result mapping
// ============================================================================

#[tokio::test]
async fn test_hits_are_mapped_with_ids() {
    let (engine, _client) = engine(MockClient::new(hits_response(
        12,
        vec![json!({ "name": "Ann" }), json!({ "name": "Bob" })],
    )));
    let criteria = SearchCriteria::from_params(None, None, None, Some(0), Some(2));

    let page = engine
        .search("people", &criteria, |doc| {
            Some(format!(
                "{}:{}",
                doc["id"].as_str().unwrap_or_default(),
                doc["name"].as_str().unwrap_or_default()
            ))
        })
        .await
        .unwrap();

    assert_eq!(page.items, vec!["1:Ann".to_string(), "2:Bob".to_string()]);
    assert_eq!(page.total_count, 12);
    assert_eq!(page.pagination, Pagination { page: 0, size: 2 });
    assert_eq!(page.total_pages(), 6);
    assert!(page.has_next());
}

#[tokio::test]
async fn test_items_never_exceed_page_size() {
    let (engine, _client) = engine(MockClient::new(hits_response(
        3,
        vec![json!({ "name": "a" }), json!({ "name": "b" }), json!({ "name": "c" })],
    )));
    let criteria = SearchCriteria::from_params(None, None, None, None, Some(2));

    let page = engine.search("people", &criteria, name_of).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_count, 3);
}

#[tokio::test]
async fn test_facets_follow_request_order() {
    let mut reply = hits_response(7, vec![]);
    reply["aggregations"] = json!({
        "status": { "buckets": [
            { "key": "active", "doc_count": 5 },
            { "key": "pending", "doc_count": 2 }
        ] },
        "city": { "buckets": [{ "key": "Oslo", "doc_count": 7 }] }
    });
    let (engine, client) = engine(MockClient::new(reply));
    let criteria = SearchCriteria::default()
        .with_facet("status")
        .with_facet("city");

    let page = engine.search("people", &criteria, name_of).await.unwrap();

    let body = client.last_body();
    assert_eq!(body["aggs"]["status"]["terms"]["field"], "status");
    assert_eq!(page.facets.len(), 2);
    assert_eq!(page.facets[0].field_name, "status");
    assert_eq!(page.facets[0].value_counts["active"], 5);
    assert_eq!(page.facets[1].field_name, "city");
    assert_eq!(page.facets[1].value_counts["Oslo"], 7);
}

#[tokio::test]
async fn test_engine_is_shareable_across_tasks() {
    let (engine, client) = engine(MockClient::new(hits_response(0, vec![])));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let criteria = SearchCriteria {
                    sorts: vec![Sort::new("name")],
                    ..SearchCriteria::from_params(None, Some("n eq 1"), None, Some(i), None)
                };
                engine.search("people", &criteria, name_of).await.map(|p| p.total_count)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 0);
    }
    assert_eq!(client.search_calls(), 4);
}

#[test]
fn test_explain_matches_sent_request() {
    let (engine, _client) = engine(MockClient::new(hits_response(0, vec![])));
    let criteria = SearchCriteria::from_params(
        Some("foo"),
        Some("status ?= 'a,b'"),
        Some("name desc"),
        Some(1),
        Some(20),
    );

    let request = engine.explain(&criteria).unwrap();

    assert_eq!(
        request.body["query"]["bool"]["filter"][0],
        json!({ "terms": { "status": ["a", "b"] } })
    );
    assert_eq!(request.offset(), 20);
    assert_eq!(request.limit(), 20);
    // Deterministic
    assert_eq!(engine.explain(&criteria).unwrap(), request);
}
