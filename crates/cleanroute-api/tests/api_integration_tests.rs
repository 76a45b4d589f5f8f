#![cfg(feature = "postgres-tests")]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use chrono::NaiveTime;
use cleanroute_api::state::AppState;
use cleanroute_api::build_router;
use cleanroute_config::AppConfig;
use cleanroute_domain::{ApartmentType, Cleaner, CleanerId, ContractClass, LogisticCode, Role, Task, TaskId};
use cleanroute_storage::PostgresStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt;

fn test_config() -> AppConfig {
    AppConfig {
        database_url: std::env::var("DATABASE_URL").unwrap_or_default(),
        bind_address: "127.0.0.1:0".to_string(),
        algorithm_version: "cleanroute-test".to_string(),
        log_level: "info".to_string(),
    }
}

async fn test_state() -> Arc<AppState> {
    let pool = cleanroute_storage::create_pool(&std::env::var("DATABASE_URL").expect("DATABASE_URL"))
        .await
        .expect("connect");
    let store = PostgresStore::new(pool);
    store.migrate().await.expect("migrate");
    Arc::new(AppState { store, config: test_config(), start_time: Instant::now() })
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = build_router(test_state().await);

    let response = app
        .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn create_run_then_fetch_it() {
    let app = build_router(test_state().await);

    let task = Task {
        id: TaskId(1),
        logistic_code: LogisticCode(100),
        lat: 41.9,
        lon: 12.5,
        client_id: 1,
        premium: false,
        straordinaria: false,
        apartment_type: ApartmentType::A,
        priority: None,
        cleaning_minutes: 60,
        checkout_time: None,
        checkin_time: None,
    };
    let cleaner = Cleaner {
        id: CleanerId(1),
        name: "Ana".to_string(),
        role: Role::Standard,
        contract_class: ContractClass::C,
        can_do_straordinaria: false,
        preferred_customers: vec![],
        accumulated_hours: 0.0,
        day_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
    };

    let body = json!({
        "work_date": "2026-08-01",
        "tasks": [task],
        "cleaners": [cleaner],
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/runs")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let created: Value = serde_json::from_slice(&body).unwrap();
    let run_id = created["run_id"].as_str().unwrap().to_string();

    let fetch = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/runs/{run_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fetch.status(), StatusCode::OK);
}
