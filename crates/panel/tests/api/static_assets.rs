use crate::helpers::{get, spawn_app};
use hyper::StatusCode;
use std::fs;

#[tokio::test]
async fn script_bundle_is_minified() {
    let test_app = spawn_app();

    let (status, bundle) = get(&test_app.app, "/static/app.min.js").await;

    assert_eq!(status, StatusCode::OK);
    assert!(bundle.contains("DOMContentLoaded"));
    assert!(bundle.contains("htmx:afterSwap"));
    assert!(!bundle.contains("// === charts.js ==="));
    assert!(!bundle.contains("Keeps the date picker"));

    // Non-release builds keep the readable bundle next to the minified one
    let debug = fs::read_to_string("./static/app.debug.js").unwrap();
    assert!(debug.contains("// === charts.js ==="));
    assert!(bundle.len() < debug.len());
}

#[tokio::test]
async fn stylesheet_is_served() {
    let test_app = spawn_app();

    let (status, css) = get(&test_app.app, "/static/styles.min.css").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!css.is_empty());
    assert!(!css.contains("/* ==="));
}
