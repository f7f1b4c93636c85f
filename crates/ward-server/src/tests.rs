//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use ward_core::db::Database;
use ward_core::models::{NewMedicalAct, NewPersonnel};
use ward_core::test_utils::{days_ago, seed_ward};

fn test_config() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        allowed_origins: vec![],
        ..Default::default()
    }
}

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router_with_engine(db, None, test_config(), EngineConfig::default())
}

fn setup_seeded_app() -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    seed_ward(&db).unwrap();
    let app = create_router_with_engine(db.clone(), None, test_config(), EngineConfig::default());
    (app, db)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

// ========== Forecast API Tests ==========

#[tokio::test]
async fn test_global_forecast_empty_database() {
    let app = setup_test_app();

    let response = get(app, "/api/forecasts?days=30").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["globalTotal"], 0.0);
    assert_eq!(json["globalPrediction"], 0.0);
    assert_eq!(json["globalHistory"], serde_json::json!([]));
    assert_eq!(json["stays"]["methodology"]["seasonality"], serde_json::json!({}));
}

#[tokio::test]
async fn test_global_forecast_defaults_to_thirty_days() {
    let (app, _db) = setup_seeded_app();

    let response = get(app, "/api/forecasts").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let future = json["medicalActs"]["history"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["isFuture"] == true)
        .count();
    assert_eq!(future, 30);

    // 5 acts + two stays + (600 + 220) * 30 personnel baseline
    let acts = 60.0 + 180.0 + 60.0 + 1500.0 + 200.0;
    let stays = 450.0 * 4.0 + 380.0 * 4.0;
    let expected = acts + stays + 820.0 * 30.0;
    assert!((json["globalTotal"].as_f64().unwrap() - expected).abs() < 1e-6);
}

#[tokio::test]
async fn test_global_forecast_monthly_for_long_horizon() {
    let (app, _db) = setup_seeded_app();

    let response = get(app, "/api/forecasts?days=365").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let future: Vec<_> = json["medicalActs"]["history"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["isFuture"] == true)
        .collect();
    assert_eq!(future.len(), 13);
    // Monthly keys are YYYY-MM
    assert_eq!(future[0]["period"].as_str().unwrap().len(), 7);
    assert!(future.iter().all(|p| p.get("real").is_none()));
}

#[tokio::test]
async fn test_forecast_rejects_bad_days() {
    for uri in [
        "/api/forecasts?days=-5",
        "/api/forecasts?days=abc",
        "/api/forecasts/stays?days=-1",
        "/api/forecasts?days=3651",
    ] {
        let response = get(setup_test_app(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let json = get_body_json(response).await;
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn test_category_forecast() {
    let (app, _db) = setup_seeded_app();

    let response = get(app, "/api/forecasts/medical-acts?days=14").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["currentTotal"], 2000.0);
    assert!(json["predictedTotal"].as_f64().unwrap() >= 0.0);
    assert!(json["methodology"]["slope"].is_number());
    let seasonality = json["methodology"]["seasonality"].as_object().unwrap();
    assert_eq!(seasonality.len(), 7);
}

#[tokio::test]
async fn test_unknown_category_is_bad_request() {
    let app = setup_test_app();

    let response = get(app, "/api/forecasts/personnel").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forecast_as_of_anchors_history() {
    let db = Database::in_memory().unwrap();
    db.add_medical_act(&NewMedicalAct {
        act_type: "Consultation".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
        cost: Some(100.0),
        ..Default::default()
    })
    .unwrap();
    let app = create_router_with_engine(db, None, test_config(), EngineConfig::default());

    let response = get(app.clone(), "/api/forecasts/medical-acts?days=30&as_of=2024-03-15").await;
    let json = get_body_json(response).await;
    let observed = json["history"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p.get("real").is_some())
        .count();
    assert_eq!(observed, 1);

    let response = get(app.clone(), "/api/forecasts/medical-acts?as_of=2025-03-15").await;
    let json = get_body_json(response).await;
    let observed = json["history"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p.get("real").is_some())
        .count();
    assert_eq!(observed, 0);

    let response = get(app, "/api/forecasts?as_of=15-03-2024").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Dashboard API Tests ==========

#[tokio::test]
async fn test_dashboard_summary_shape() {
    let (app, _db) = setup_seeded_app();

    let response = get(app, "/api/dashboard/summary").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    for key in [
        "totalRealCost",
        "totalRealCostTrend",
        "totalPredictedCost",
        "totalPredictedCostTrend",
        "avgCostPerStay",
        "avgCostPerStayTrend",
        "personnelCostRatio",
        "personnelCostRatioTrend",
    ] {
        assert!(json[key].is_number(), "{} should be a number", key);
    }

    let categories = json["costByCategory"].as_array().unwrap();
    assert_eq!(categories.len(), 4);
    assert_eq!(categories[0]["name"], "Medical acts");
    assert_eq!(categories[3]["name"], "Personnel");
    assert_eq!(categories[3]["value"], 820.0 * 30.0);

    let recent = json["recentStays"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0]["patientName"], "Bruno Petit");
    assert_eq!(recent[0]["department"], "N/A");
    assert_eq!(recent[0]["status"], "In progress");
    assert_eq!(recent[1]["status"], "Completed");

    let alert = &json["smartAlert"];
    assert!(["warning", "success", "info"].contains(&alert["type"].as_str().unwrap()));
    assert!(alert["message"].as_str().unwrap().len() > 10);
}

#[tokio::test]
async fn test_dashboard_personnel_only() {
    let db = Database::in_memory().unwrap();
    db.add_personnel(&NewPersonnel {
        name: "Nurse".to_string(),
        cost_per_day: Some(100.0),
        ..Default::default()
    })
    .unwrap();
    let app = create_router_with_engine(db, None, test_config(), EngineConfig::default());

    let json = get_body_json(get(app, "/api/dashboard/summary").await).await;
    assert_eq!(json["totalRealCost"], 3000.0);
    assert_eq!(json["totalPredictedCost"], 3000.0);
    assert_eq!(json["personnelCostRatio"], 100.0);
    assert_eq!(json["smartAlert"]["driver"], "General");
    assert_eq!(json["smartAlert"]["type"], "info");
}

#[tokio::test]
async fn test_dashboard_as_of_far_past() {
    let (app, _db) = setup_seeded_app();

    let response = get(app, "/api/dashboard/summary?as_of=-262143-01-01").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["avgCostPerStay"], 0.0);
    assert_eq!(json["costByCategory"].as_array().unwrap().len(), 4);
}

// ========== Record API Tests ==========

#[tokio::test]
async fn test_create_and_list_medical_acts() {
    let db = Database::in_memory().unwrap();
    let app = create_router_with_engine(db.clone(), None, test_config(), EngineConfig::default());

    let body = serde_json::json!({
        "act_type": "MRI",
        "date": days_ago(3).to_string(),
        "practitioner": "Dr. Colin",
        "cost": 420.0
    });
    let response = post_json(app.clone(), "/api/medical-acts", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(json["id"].as_i64().unwrap() > 0);

    let json = get_body_json(get(app, "/api/medical-acts").await).await;
    let acts = json.as_array().unwrap();
    assert_eq!(acts.len(), 1);
    assert_eq!(acts[0]["act_type"], "MRI");
    assert_eq!(acts[0]["cost"], 420.0);
}

#[tokio::test]
async fn test_create_records_validation() {
    let app = setup_test_app();

    let cases = [
        ("/api/medical-acts", serde_json::json!({"act_type": "X", "cost": -1.0})),
        ("/api/consumables", serde_json::json!({"item": "Gauze", "quantity": -2})),
        (
            "/api/stays",
            serde_json::json!({"start_date": "2025-03-10", "end_date": "2025-03-01"}),
        ),
        ("/api/stays", serde_json::json!({"patient_id": 42})),
        ("/api/personnel", serde_json::json!({"name": "  "})),
        ("/api/patients", serde_json::json!({})),
    ];

    for (uri, body) in cases {
        let response = post_json(app.clone(), uri, body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", uri, body);
    }
}

#[tokio::test]
async fn test_patient_endpoints() {
    let app = setup_test_app();

    let body = serde_json::json!({"first_name": "Emma", "last_name": "Laurent", "birth_date": "1988-09-21"});
    let json = get_body_json(post_json(app.clone(), "/api/patients", body).await).await;
    let id = json["id"].as_i64().unwrap();

    let response = get(app.clone(), &format!("/api/patients/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["last_name"], "Laurent");

    let response = get(app, "/api/patients/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_created_stay_feeds_forecast() {
    let (app, db) = setup_seeded_app();
    let patient_id = db.list_patients().unwrap()[0].id;

    let body = serde_json::json!({
        "patient_id": patient_id,
        "start_date": days_ago(2).to_string(),
        "end_date": days_ago(2).to_string(),
        "daily_rate": 500.0,
        "pathology": "Observation"
    });
    let response = post_json(app.clone(), "/api/stays", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(get(app, "/api/forecasts/stays").await).await;
    // Seeded stays (1800 + 1520) plus a one-night stay
    assert_eq!(json["currentTotal"], 1800.0 + 1520.0 + 500.0);
}

// ========== Auth Tests ==========

fn setup_auth_app(api_keys: Vec<String>) -> Router {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        require_auth: true,
        allowed_origins: vec![],
        api_keys,
    };
    create_router_with_engine(db, None, config, EngineConfig::default())
}

#[tokio::test]
async fn test_auth_required() {
    let app = setup_auth_app(vec!["secret-key".to_string()]);

    let response = get(app, "/api/forecasts").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Authentication required");
}

#[tokio::test]
async fn test_auth_with_api_key() {
    let app = setup_auth_app(vec!["other".to_string(), "secret-key".to_string()]);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/summary")
                .header("authorization", "Bearer secret-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/summary")
                .header("authorization", "Bearer secret-kez")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_without_configured_keys_rejects_everything() {
    let app = setup_auth_app(vec![]);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/forecasts")
                .header("authorization", "Bearer ")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = get(app, "/api/forecasts").await;
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("content-security-policy").is_some());
}

#[test]
fn test_parse_api_keys() {
    assert_eq!(
        parse_api_keys(" a , ,b,"),
        vec!["a".to_string(), "b".to_string()]
    );
    assert!(parse_api_keys("").is_empty());
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["abc123".to_string()];
    assert!(validate_api_key("abc123", &keys));
    assert!(!validate_api_key("abc12", &keys));
    assert!(!validate_api_key("", &keys));
}
