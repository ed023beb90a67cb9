//! Single-result routes: caching, key separation and error mapping.

mod common;

use axum::http::StatusCode;

use common::{Mode, TestApp};

#[tokio::test]
async fn repeated_request_is_served_from_cache_byte_for_byte() {
    let app = TestApp::new();

    let (status, first) = app.get("/18E51A0479/2000-01-01/1-1").await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = app.get("/18E51A0479/2000-01-01/1-1").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(first, second);
    assert_eq!(app.results.year_calls(), 1);
}

#[tokio::test]
async fn single_result_uses_data_envelope() {
    let app = TestApp::new();

    let (status, body) = app.get_json("/18e51a0479/2000-01-01/1-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["student_details"]["hallticket"], "18E51A0479");
    assert_eq!(body["data"]["results"]["1-1"]["subjects"]["MA101BS"]["grade"], "A");
    assert!(body["data"]["results"]["1-1"].get("sgpa").is_none());
}

#[tokio::test]
async fn calculate_route_adds_sgpa_and_has_its_own_slot() {
    let app = TestApp::new();

    app.get("/18E51A0479/2000-01-01/1-1").await;
    let (status, body) = app.get_json("/calculate/18E51A0479/2000-01-01/1-1").await;

    assert_eq!(status, StatusCode::OK);
    // (8*4 + 10*4) / 8
    assert_eq!(body["data"]["results"]["1-1"]["sgpa"], 9.0);
    assert_eq!(body["data"]["overall_gpa"], 9.0);
    assert_eq!(app.results.year_calls(), 2);
}

#[tokio::test]
async fn query_form_matches_path_form_and_shares_its_slot() {
    let app = TestApp::new();

    let (_, path_body) = app.get("/18E51A0479/2000-01-01/2-1").await;
    let (status, query_body) = app
        .get("/result?hallticket=18E51A0479&dob=2000-01-01&year=2-1")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(path_body, query_body);
    assert_eq!(app.results.year_calls(), 1);
}

#[tokio::test]
async fn every_parameter_gets_an_independent_slot() {
    let app = TestApp::new();

    app.get("/18E51A0479/2000-01-01/1-1").await;
    app.get("/18E51A0479/2000-01-02/1-1").await;
    app.get("/18E51A0479/2000-01-01/1-2").await;
    app.get("/18E51A0480/2000-01-01/1-1").await;
    assert_eq!(app.results.year_calls(), 4);

    let base = "/api?hallticket=18E51A0479&degree=btech&examCode=1662&etype=r17&type=intgrade";
    let variants = [
        base.to_string(),
        format!("{base}&result=gradercrv"),
        format!("{base}&dob=2000-01-01"),
        base.replace("examCode=1662", "examCode=1663"),
        base.replace("etype=r17", "etype=r18"),
        base.replace("type=intgrade", "type=grace"),
        base.replace("degree=btech", "degree=mtech"),
    ];
    for uri in &variants {
        let (status, _) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
    assert_eq!(app.results.exam_calls(), variants.len());

    for uri in &variants {
        app.get(uri).await;
    }
    assert_eq!(app.results.exam_calls(), variants.len());
}

#[tokio::test]
async fn empty_result_is_returned_but_never_cached() {
    let app = TestApp::new();
    app.results.set_mode(Mode::Empty);

    let (status, body) = app.get_json("/18E51A0479/2000-01-01/1-1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["results"].as_object().unwrap().is_empty());

    app.get("/18E51A0479/2000-01-01/1-1").await;
    assert_eq!(app.results.year_calls(), 2);
}

#[tokio::test]
async fn upstream_failure_is_503_and_not_cached() {
    let app = TestApp::new();
    app.results.set_mode(Mode::Error);

    let (status, body) = app.get_json("/18E51A0479/2000-01-01/1-1").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("connection reset"));

    app.results.set_mode(Mode::Normal);
    let (status, _) = app.get("/18E51A0479/2000-01-01/1-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.results.year_calls(), 2);
}

#[tokio::test]
async fn unknown_year_is_404() {
    let app = TestApp::new();
    app.results.set_mode(Mode::NotFound);

    let (status, body) = app.get_json("/18E51A0479/2000-01-01/9-9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_parameters_are_400() {
    let app = TestApp::new();

    let (status, body) = app.get_json("/result?hallticket=18E51A0479&dob=2000-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("year"));

    let (status, body) = app
        .get_json("/api?hallticket=18E51A0479&degree=btech&etype=r17&type=intgrade")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("examCode"));

    assert_eq!(app.results.year_calls(), 0);
    assert_eq!(app.results.exam_calls(), 0);
}

#[tokio::test]
async fn api_fills_defaults_for_degree_and_result() {
    let app = TestApp::new();

    let (status, _) = app
        .get("/api?hallticket=18e51a0479&examCode=1662&etype=r17&type=intgrade")
        .await;
    assert_eq!(status, StatusCode::OK);

    let queries = app.results.exam_queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].hallticket, "18E51A0479");
    assert_eq!(queries[0].degree, "btech");
    assert_eq!(queries[0].result, "null");
    assert_eq!(queries[0].dob, None);
}

#[tokio::test]
async fn api_calculate_adds_sgpa() {
    let app = TestApp::new();

    let uri = "/api/calculate?hallticket=18E51A0479&degree=btech&examCode=1662&etype=r17&type=intgrade";
    let (status, body) = app.get_json(uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["results"]["1662"]["sgpa"], 9.0);

    app.get(uri).await;
    assert_eq!(app.results.exam_calls(), 1);
}

#[tokio::test]
async fn all_results_route_computes_overall_gpa_and_caches() {
    let app = TestApp::new();

    let (status, first) = app.get("/all-r18/18e51a0479").await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = app.get("/all-r18/18E51A0479").await;
    assert_eq!(first, second);
    assert_eq!(app.results.all_calls(), 1);

    let body: serde_json::Value = serde_json::from_str(&first).unwrap();
    // 1-1: (8*4 + 10*4) / 8 = 9.0, 1-2: (7*4 + 10*4) / 8 = 8.5
    assert_eq!(body["data"]["results"]["1-1"]["sgpa"], 9.0);
    assert_eq!(body["data"]["results"]["1-2"]["sgpa"], 8.5);
    assert_eq!(body["data"]["overall_gpa"], 8.75);
}
