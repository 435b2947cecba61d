use std::sync::Arc;

use linkscope_common::AnalysisOptions;
use linkscope_lsp::{DocumentStore, DocumentUpdate, UpdateError};
use linkscope_syntax::TreeError;
use linkscope_syntax::fixtures::{Fixture, leaf, node};

fn document(source: &str, binder: &str, value: &str) -> (String, String) {
    let fx = Fixture::new(source);
    let json = fx.tree_json(vec![node(
        "Val",
        fx.word_span(source.trim_end(), 0),
        vec![
            leaf(format!("Binder: {binder}"), fx.word_span(binder, 0)),
            leaf(format!("Variable: {value}"), fx.word_span(value, 0)),
        ],
    )]);
    (source.to_string(), json)
}

#[test]
fn test_update_publishes_snapshot() {
    let store = DocumentStore::new(AnalysisOptions::default());
    assert!(store.is_empty());

    let (source, json) = document("var m = k;\n", "m", "k");
    let analysis = store.update("file:///a.links", 1, &source, &json).unwrap();
    assert_eq!(analysis.diagnostics.len(), 1);
    assert_eq!(store.len(), 1);
    assert!(Arc::ptr_eq(&analysis, &store.get("file:///a.links").unwrap()));
}

#[test]
fn test_failed_update_keeps_previous_analysis() {
    let store = DocumentStore::new(AnalysisOptions::default());
    let (source, json) = document("var m = k;\n", "m", "k");
    let first = store.update("file:///a.links", 1, &source, &json).unwrap();

    let err = store
        .update("file:///a.links", 2, "var m = ;\n", "[\"Interior\", \"Block\"")
        .unwrap_err();
    assert!(matches!(err, UpdateError::Tree(TreeError::InvalidJson(_))));

    let current = store.get("file:///a.links").unwrap();
    assert!(Arc::ptr_eq(&first, &current));
    assert_eq!(current.source, "var m = k;\n");
}

#[test]
fn test_update_many_analyses_independent_documents() {
    let store = DocumentStore::new(AnalysisOptions::default());
    let (first_source, first_json) = document("var x = y;\n", "x", "y");
    let (second_source, second_json) = document("var z = w;\n", "z", "w");
    let updates = vec![
        DocumentUpdate {
            uri: "file:///one.links".to_string(),
            version: 1,
            source: first_source,
            tree_json: first_json,
        },
        DocumentUpdate {
            uri: "file:///two.links".to_string(),
            version: 1,
            source: second_source,
            tree_json: second_json,
        },
        DocumentUpdate {
            uri: "file:///bad.links".to_string(),
            version: 1,
            source: String::new(),
            tree_json: "{}".to_string(),
        },
    ];

    let results = store.update_many(&updates);
    assert_eq!(results.len(), 3);
    assert!(results[0].1.is_ok());
    assert!(results[1].1.is_ok());
    assert!(results[2].1.is_err());
    assert_eq!(store.uris(), vec!["file:///one.links", "file:///two.links"]);

    assert!(store.remove("file:///one.links").is_some());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_out_of_order_update_is_rejected() {
    let store = DocumentStore::new(AnalysisOptions::default());
    let (newer_source, newer_json) = document("var m = k;\n", "m", "k");
    let (older_source, older_json) = document("var s = t;\n", "s", "t");

    let newer = store.update("file:///a.links", 2, &newer_source, &newer_json).unwrap();
    let err = store
        .update("file:///a.links", 1, &older_source, &older_json)
        .unwrap_err();
    assert_eq!(err, UpdateError::Stale { version: 1, current: 2 });

    let current = store.get("file:///a.links").unwrap();
    assert!(Arc::ptr_eq(&newer, &current));
    assert_eq!(current.source, "var m = k;\n");
    assert_eq!(store.version("file:///a.links"), Some(2));

    // Re-sending the published version is accepted.
    store.update("file:///a.links", 2, &newer_source, &newer_json).unwrap();
    assert_eq!(store.version("file:///a.links"), Some(2));
}

#[test]
fn test_update_many_keeps_the_newest_version_of_a_document() {
    let store = DocumentStore::new(AnalysisOptions::default());
    let (old_source, old_json) = document("var s = t;\n", "s", "t");
    let (new_source, new_json) = document("var m = k;\n", "m", "k");
    let updates = vec![
        DocumentUpdate {
            uri: "file:///a.links".to_string(),
            version: 3,
            source: new_source,
            tree_json: new_json,
        },
        DocumentUpdate {
            uri: "file:///a.links".to_string(),
            version: 2,
            source: old_source,
            tree_json: old_json,
        },
    ];

    store.update_many(&updates);
    assert_eq!(store.version("file:///a.links"), Some(3));
    assert_eq!(store.get("file:///a.links").unwrap().source, "var m = k;\n");
}
