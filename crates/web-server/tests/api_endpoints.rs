use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use configuration::DatabaseSettings;
use database::{DbRepository, connect, connect_lazy, run_migrations};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;
use web_server::{AppState, build_router, service::API_VERSION};

async fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = DatabaseSettings {
        path: dir.path().join("api.db"),
        max_connections: 2,
        connect_timeout_secs: 2,
    };
    let pool = connect(&settings).await.expect("connect");
    run_migrations(&pool).await.expect("migrations");

    let state = Arc::new(AppState::new(Arc::new(DbRepository::new(pool))));
    (build_router(state, Duration::from_secs(5)), dir)
}

/// An app whose database file sits in a directory that does not exist.
fn unreachable_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = DatabaseSettings {
        path: dir.path().join("no-such-dir").join("api.db"),
        max_connections: 1,
        connect_timeout_secs: 1,
    };
    let repo = DbRepository::new(connect_lazy(&settings));
    let state = Arc::new(AppState::new(Arc::new(repo)));
    (build_router(state, Duration::from_secs(5)), dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.expect("router response");
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, location, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn posted_weigh_in_is_returned_by_last_one() {
    let (app, _dir) = test_app().await;

    let (status, location, created) = send(
        &app,
        post_json("/weight", json!({ "date": "2025-06-01", "weight": 180.5, "bmi": 24.5 })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("assigned id");
    assert!(id > 0);
    assert_eq!(location, Some(format!("/weight/{id}")));
    assert_eq!(created["date"], "2025-06-01");
    assert_eq!(created["weight"], 180.5);
    assert!(created["fat"].is_null());

    let (status, _, listed) = send(&app, get("/weight/last/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn posted_run_is_returned_by_last_one() {
    let (app, _dir) = test_app().await;

    let (status, location, created) = send(
        &app,
        post_json(
            "/run",
            json!({ "date": "2025-06-02", "distance": 3.1, "distanceUnit": "mi", "time": 1800 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("assigned id");
    assert_eq!(location, Some(format!("/run/{id}")));
    assert_eq!(created["distanceUnit"], "mi");
    assert_eq!(created["time"], 1800);

    let (status, _, listed) = send(&app, get("/run/last/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn last_n_lists_are_newest_first_and_capped() {
    let (app, _dir) = test_app().await;
    for day in ["2025-06-01", "2025-06-03", "2025-06-02"] {
        let (status, _, _) = send(
            &app,
            post_json("/weight", json!({ "date": day, "weight": 180.0, "bmi": 24.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, _, listed) = send(&app, get("/weight/last/2")).await;
    let dates: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2025-06-03", "2025-06-02"]);

    let (_, _, all) = send(&app, get("/weight/last/50")).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn empty_tables_list_as_empty_arrays() {
    let (app, _dir) = test_app().await;

    let (status, _, weigh_ins) = send(&app, get("/weight/last/5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(weigh_ins, json!([]));

    let (status, _, runs) = send(&app, get("/run/last/5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(runs, json!([]));
}

#[tokio::test]
async fn out_of_range_weight_is_a_field_level_400() {
    let (app, _dir) = test_app().await;

    let (status, _, body) = send(
        &app,
        post_json("/weight", json!({ "date": "2025-06-01", "weight": 350.0, "bmi": 24.5 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "weight");
    assert!(body["error"].as_str().unwrap().contains("between 100 and 300"));

    let (_, _, about) = send(&app, get("/about")).await;
    assert_eq!(about["weighInsCount"], 0);
}

#[tokio::test]
async fn non_positive_distance_is_a_field_level_400() {
    let (app, _dir) = test_app().await;

    let (status, _, body) = send(
        &app,
        post_json(
            "/run",
            json!({ "date": "2025-06-02", "distance": 0, "distanceUnit": "km", "time": 600 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "distance");
}

#[tokio::test]
async fn malformed_bodies_are_rejected_before_the_store() {
    let (app, _dir) = test_app().await;

    let bad_bodies = [
        json!({ "date": "06/01/2025", "weight": 180.5, "bmi": 24.5 }),
        json!({ "date": "2025-02-30", "weight": 180.5, "bmi": 24.5 }),
        json!({ "date": "2025-06-01", "weight": 180.5 }),
        json!({ "date": "2025-06-01", "weight": "heavy", "bmi": 24.5 }),
    ];
    for body in bad_bodies {
        let (status, _, response) = send(&app, post_json("/weight", body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body} should be rejected");
        assert!(response["error"].is_string());
    }

    let (status, _, _) = send(&app, get("/weight/last/many")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _, _) = send(&app, get("/run/last/-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn about_on_a_fresh_store_is_all_zeroes() {
    let (app, _dir) = test_app().await;

    let (status, _, body) = send(&app, get("/about")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "apiVersion": API_VERSION,
            "weighInsCount": 0,
            "runsCount": 0,
            "lastWeighInDate": null,
            "lastRunDate": null
        })
    );
}

#[tokio::test]
async fn about_reflects_logged_records() {
    let (app, _dir) = test_app().await;
    send(
        &app,
        post_json("/weight", json!({ "date": "2025-06-01", "weight": 180.5, "bmi": 24.5 })),
    )
    .await;
    send(
        &app,
        post_json(
            "/run",
            json!({ "date": "2025-06-02", "distance": 3.1, "distanceUnit": "mi", "time": 1800 }),
        ),
    )
    .await;

    let (_, _, body) = send(&app, get("/about")).await;

    assert_eq!(body["weighInsCount"], 1);
    assert_eq!(body["runsCount"], 1);
    assert_eq!(body["lastWeighInDate"], "2025-06-01");
    assert_eq!(body["lastRunDate"], "2025-06-02");
}

#[tokio::test]
async fn health_is_ok_when_the_store_is_reachable() {
    let (app, _dir) = test_app().await;

    let (status, _, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Healthy");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn health_is_503_when_the_store_is_unreachable() {
    let (app, _dir) = unreachable_app();

    let (status, _, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "Unhealthy");
}

#[tokio::test]
async fn about_degrades_to_zero_values_when_the_store_is_unreachable() {
    let (app, _dir) = unreachable_app();

    let (status, _, body) = send(&app, get("/about")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weighInsCount"], 0);
    assert_eq!(body["runsCount"], 0);
    assert!(body["lastWeighInDate"].is_null());
    assert!(body["lastRunDate"].is_null());
}

#[tokio::test]
async fn writes_to_an_unreachable_store_do_not_leak_internals() {
    let (app, dir) = unreachable_app();

    let (status, _, body) = send(
        &app,
        post_json("/weight", json!({ "date": "2025-06-01", "weight": 180.5, "bmi": 24.5 })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains(&*dir.path().to_string_lossy()));
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[tokio::test]
async fn records_dated_today_are_accepted_but_tomorrow_is_not() {
    let (app, _dir) = test_app().await;
    let today = today();
    let tomorrow = today.succ_opt().unwrap();

    let (status, _, _) = send(
        &app,
        post_json("/weight", json!({ "date": today.to_string(), "weight": 180.5, "bmi": 24.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = send(
        &app,
        post_json("/weight", json!({ "date": tomorrow.to_string(), "weight": 180.5, "bmi": 24.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "date");
    assert_eq!(body["error"], "Date cannot be in the future");

    let run = |date: chrono::NaiveDate| {
        json!({ "date": date.to_string(), "distance": 3.1, "distanceUnit": "mi", "time": 1800 })
    };
    let (status, _, _) = send(&app, post_json("/run", run(today))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _, body) = send(&app, post_json("/run", run(tomorrow))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "date");

    let (_, _, about) = send(&app, get("/about")).await;
    assert_eq!(about["weighInsCount"], 1);
    assert_eq!(about["runsCount"], 1);
}

#[tokio::test]
async fn signed_or_expanded_years_are_rejected() {
    let (app, _dir) = test_app().await;

    for date in ["+12345-01-01", "-0001-01-01", "+2025-06-01"] {
        let (status, _, _) = send(
            &app,
            post_json("/weight", json!({ "date": date, "weight": 180.5, "bmi": 24.5 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "weigh-in dated {date}");

        let (status, _, _) = send(
            &app,
            post_json(
                "/run",
                json!({ "date": date, "distance": 3.1, "distanceUnit": "mi", "time": 1800 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "run dated {date}");
    }

    let (_, _, listed) = send(&app, get("/weight/last/10")).await;
    assert_eq!(listed, json!([]));
}

/// A service double with fixed answers, independent of any store.
struct CannedHealth {
    healthy: bool,
    about: core_types::AboutInfo,
}

#[async_trait::async_trait]
impl web_server::service::HealthService for CannedHealth {
    async fn is_healthy(&self) -> bool {
        self.healthy
    }

    async fn get_about_info(&self) -> core_types::AboutInfo {
        self.about.clone()
    }
}

fn app_with_service(health: CannedHealth) -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = DatabaseSettings {
        path: dir.path().join("service.db"),
        max_connections: 1,
        connect_timeout_secs: 1,
    };
    let store = Arc::new(DbRepository::new(connect_lazy(&settings)));
    let state = Arc::new(AppState::with_service(store, Arc::new(health)));
    (build_router(state, Duration::from_secs(5)), dir)
}

#[tokio::test]
async fn health_and_about_come_from_the_injected_service() {
    let (app, _dir) = app_with_service(CannedHealth {
        healthy: false,
        about: core_types::AboutInfo {
            api_version: "2.0.0-test".to_string(),
            weigh_ins_count: 42,
            runs_count: 7,
            last_weigh_in_date: chrono::NaiveDate::from_ymd_opt(2025, 5, 30),
            last_run_date: None,
        },
    });

    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "Unhealthy");

    let (status, _, body) = send(&app, get("/about")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "apiVersion": "2.0.0-test",
            "weighInsCount": 42,
            "runsCount": 7,
            "lastWeighInDate": "2025-05-30",
            "lastRunDate": null
        })
    );
}

#[tokio::test]
async fn a_healthy_service_answers_200_regardless_of_the_store() {
    let (app, _dir) = app_with_service(CannedHealth {
        healthy: true,
        about: core_types::AboutInfo::empty("0.0.0"),
    });

    let (status, _, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Healthy");
}
