use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use chrono::Utc;
use futures::future::join_all;
use serde_json::json;

use pingmon::{HistoryLog, Host, HostRegistry, HostStatus, LogEntry};

use super::{ApiContext, routes};

fn test_context() -> ApiContext {
    ApiContext {
        registry: Arc::new(HostRegistry::new()),
        history: Arc::new(HistoryLog::new()),
    }
}

#[actix_web::test]
async fn health_answers_ok() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn put_registers_and_list_shows_latest_status() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    let put = test::TestRequest::put()
        .uri("/hosts/1.1.1.1")
        .set_json(json!({"address": "1.1.1.1", "description": "upstream dns"}))
        .to_request();
    let resp = test::call_service(&app, put).await;
    assert!(resp.status().is_success());

    let hosts: HashMap<String, Host> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/hosts").to_request())
            .await;

    assert_eq!(hosts.len(), 1);
    let host = &hosts["1.1.1.1"];
    assert_eq!(host.description, "upstream dns");
    assert_eq!(host.status, HostStatus::Unknown);
    assert_eq!(host.latency_ms, 0);
}

#[actix_web::test]
async fn reregistering_keeps_the_original_description() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    for description in ["router", "something else"] {
        let put = test::TestRequest::put()
            .uri("/hosts/10.0.0.1")
            .set_json(json!({"address": "10.0.0.1", "description": description}))
            .to_request();
        let resp = test::call_service(&app, put).await;
        assert!(resp.status().is_success());
    }

    let hosts: HashMap<String, Host> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/hosts").to_request())
            .await;

    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts["10.0.0.1"].description, "router");
}

#[actix_web::test]
async fn put_without_address_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    let put = test::TestRequest::put()
        .uri("/hosts/x")
        .set_json(json!({"address": "", "description": "no address"}))
        .to_request();
    let resp = test::call_service(&app, put).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(
        body["error"]
            .as_str()
            .expect("error body missing")
            .contains("address required")
    );
}

#[actix_web::test]
async fn put_with_overlong_description_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    let put = test::TestRequest::put()
        .uri("/hosts/1.1.1.1")
        .set_json(json!({"address": "1.1.1.1", "description": "x".repeat(201)}))
        .to_request();
    let resp = test::call_service(&app, put).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn put_with_malformed_address_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    let put = test::TestRequest::put()
        .uri("/hosts/bad")
        .set_json(json!({"address": "x$yz", "description": ""}))
        .to_request();
    let resp = test::call_service(&app, put).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn put_with_malformed_json_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    let put = test::TestRequest::put()
        .uri("/hosts/1.1.1.1")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, put).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn delete_of_unknown_host_is_not_found() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/hosts/10.9.9.9")
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(
        body["error"]
            .as_str()
            .expect("error body missing")
            .contains("10.9.9.9")
    );
}

#[actix_web::test]
async fn delete_removes_the_host() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    let put = test::TestRequest::put()
        .uri("/hosts/1.1.1.1")
        .set_json(json!({"address": "1.1.1.1", "description": ""}))
        .to_request();
    assert!(test::call_service(&app, put).await.status().is_success());

    let del = test::TestRequest::delete().uri("/hosts/1.1.1.1").to_request();
    assert!(test::call_service(&app, del).await.status().is_success());

    let hosts: HashMap<String, Host> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/hosts").to_request())
            .await;
    assert!(hosts.is_empty());

    // A second delete finds nothing
    let del = test::TestRequest::delete().uri("/hosts/1.1.1.1").to_request();
    assert_eq!(
        test::call_service(&app, del).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn history_of_unknown_address_is_an_empty_list() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    let entries: Vec<LogEntry> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/history/10.9.9.9")
            .to_request(),
    )
    .await;

    assert!(entries.is_empty());
}

#[actix_web::test]
async fn history_returns_recorded_entries_in_order() {
    let context = test_context();
    context
        .history
        .add_entry("10.0.0.1", LogEntry::new(HostStatus::Online, 18, Utc::now()))
        .await;
    context
        .history
        .add_entry("10.0.0.1", LogEntry::new(HostStatus::Offline, 0, Utc::now()))
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(context))
            .configure(routes),
    )
    .await;

    let entries: Vec<LogEntry> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/history/10.0.0.1")
            .to_request(),
    )
    .await;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].status, HostStatus::Online);
    assert_eq!(entries[1].status, HostStatus::Offline);
}

#[actix_web::test]
async fn concurrent_registrations_all_land() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(test_context()))
            .configure(routes),
    )
    .await;

    let requests = (0..20).map(|i| {
        let req = test::TestRequest::put()
            .uri(&format!("/hosts/10.2.0.{i}"))
            .set_json(json!({"address": format!("10.2.0.{i}"), "description": ""}))
            .to_request();
        test::call_service(&app, req)
    });

    for resp in join_all(requests).await {
        assert!(resp.status().is_success());
    }

    let hosts: HashMap<String, Host> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/hosts").to_request())
            .await;
    assert_eq!(hosts.len(), 20);
}
