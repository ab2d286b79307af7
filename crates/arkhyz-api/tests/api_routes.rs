//! Router-level tests: every request goes through `build_router` with an
//! in-memory SQLite store behind it.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

use arkhyz_api::{AdminAccess, AdminCredentials, DispatchOptions, Dispatcher, build_router};
use arkhyz_db::{LeadStore, SqliteStore};

/// base64("admin:s3cret")
const GOOD_AUTH: &str = "Basic YWRtaW46czNjcmV0";
/// base64("admin:wrong")
const BAD_AUTH: &str = "Basic YWRtaW46d3Jvbmc=";

struct TestApp {
    router: Router,
    store: Arc<SqliteStore>,
}

impl TestApp {
    fn new(options: DispatchOptions, access: AdminAccess) -> Self {
        let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory database"));
        let dispatcher = Dispatcher::new(store.clone(), options);
        Self {
            router: build_router(dispatcher, &access),
            store,
        }
    }

    fn protected() -> Self {
        Self::new(
            DispatchOptions::default(),
            AdminAccess::Protected(AdminCredentials::new("admin", "s3cret")),
        )
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Should parse JSON")
        };
        (status, body)
    }

    async fn submit(&self, payload: Value) -> (StatusCode, Value) {
        self.send(json_request("POST", "/api/submit-form", &payload, None)).await
    }
}

fn json_request(method: &str, uri: &str, payload: &Value, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

fn booking_payload() -> Value {
    json!({
        "type": "booking",
        "bookingType": "Шале",
        "name": "Мария Петрова",
        "phone": "8 (999) 123-45-67",
        "email": "maria@example.com",
        "checkIn": "2026-07-10",
        "checkOut": "2026-07-14",
        "bathhouse": true,
        "message": "С собакой",
        "timestamp": "2026-06-30T12:00:00.000Z"
    })
}

#[tokio::test]
async fn review_scenario_round_trip() {
    let app = TestApp::protected();

    let (status, body) = app
        .submit(json!({
            "type": "review",
            "name": "Иван Иванов",
            "email": "ivan@example.com",
            "text": "Отличное место, рекомендую!"
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "id": 1 }));

    let (status, body) = app.send(empty_request("GET", "/api/reviews", Some(GOOD_AUTH))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], 1);
    assert_eq!(data[0]["name"], "Иван Иванов");
    assert_eq!(data[0]["email"], "ivan@example.com");
    assert_eq!(data[0]["text"], "Отличное место, рекомендую!");
    // Server fills in the client timestamp when the form omits it.
    assert!(data[0]["timestamp"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(data[0]["created_at"].is_string());
}

#[tokio::test]
async fn booking_phone_is_normalized_and_listing_is_newest_first() {
    let app = TestApp::protected();

    let (_, first) = app.submit(booking_payload()).await;
    let mut second_payload = booking_payload();
    second_payload["name"] = json!("Второй Гость");
    let (_, second) = app.submit(second_payload).await;
    assert_eq!(first["id"], 1);
    assert_eq!(second["id"], 2);

    let (_, body) = app.send(empty_request("GET", "/api/bookings", Some(GOOD_AUTH))).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], 2);
    assert_eq!(data[1]["id"], 1);

    let booking = &data[1];
    assert_eq!(booking["type"], "booking");
    assert_eq!(booking["booking_type"], "Шале");
    assert_eq!(booking["phone"], "+79991234567");
    assert_eq!(booking["check_in"], "2026-07-10");
    assert_eq!(booking["check_out"], "2026-07-14");
    assert_eq!(booking["bathhouse"], true);
    assert_eq!(booking["message"], "С собакой");
    assert_eq!(booking["timestamp"], "2026-06-30T12:00:00.000Z");
}

#[tokio::test]
async fn investment_inquiry_is_stored() {
    let app = TestApp::protected();

    let (status, body) = app
        .submit(json!({ "type": "investment", "name": "Олег", "phone": "9991234567" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);

    let rows = app.store.list_investments().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].phone, "+79991234567");
}

#[tokio::test]
async fn unknown_kind_is_rejected_without_writing() {
    let app = TestApp::protected();

    let (status, body) = app
        .submit(json!({ "type": "donation", "name": "Иван", "amount": 100 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unknown form type: donation");

    assert!(app.store.list_bookings().unwrap().is_empty());
    assert!(app.store.list_reviews().unwrap().is_empty());
    assert!(app.store.list_investments().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_body_gets_a_failure_envelope() {
    let app = TestApp::protected();

    let request = Request::builder()
        .method("POST")
        .uri("/api/submit-form")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let (status, body) = app.submit(json!({ "type": "review", "name": "Иван" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn invalid_fields_fail_validation() {
    let app = TestApp::protected();

    let mut payload = booking_payload();
    payload["email"] = json!("maria@localhost");
    payload["checkOut"] = json!("2026-07-01");
    let (status, body) = app.submit(payload).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("Invalid email address"));
    assert!(error.contains("Check-out date must be later than check-in date"));
    assert!(app.store.list_bookings().unwrap().is_empty());
}

#[tokio::test]
async fn lenient_mode_stores_payload_as_sent() {
    let app = TestApp::new(
        DispatchOptions { strict_validation: false, dedup_window: Duration::ZERO },
        AdminAccess::Disabled,
    );

    let (status, body) = app
        .submit(json!({ "type": "review", "name": "X", "email": "x", "text": "ok" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(app.store.list_reviews().unwrap()[0].text, "ok");
}

#[tokio::test]
async fn repeated_idempotency_key_returns_the_same_id() {
    let app = TestApp::protected();

    let request = || {
        let mut req = json_request("POST", "/api/submit-form", &booking_payload(), None);
        req.headers_mut().insert("idempotency-key", "form-42".parse().unwrap());
        req
    };

    let (_, first) = app.send(request()).await;
    let (status, second) = app.send(request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, json!({ "success": true, "id": 1 }));
    assert_eq!(second, first);
    assert_eq!(app.store.list_bookings().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_routes_require_credentials() {
    let app = TestApp::protected();

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/bookings", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Basic realm=\"Admin Panel\""
    );

    let (status, body) = app.send(empty_request("DELETE", "/api/bookings/1", Some(BAD_AUTH))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    // Public routes stay open.
    let (status, body) = app.send(empty_request("GET", "/ping", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn delete_missing_record_is_not_found() {
    let app = TestApp::protected();

    let (status, body) = app.send(empty_request("DELETE", "/api/reviews/99", Some(GOOD_AUTH))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn delete_removes_the_record() {
    let app = TestApp::protected();
    app.submit(booking_payload()).await;

    let (status, body) = app.send(empty_request("DELETE", "/api/bookings/1", Some(GOOD_AUTH))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "Record deleted" }));
    assert!(app.store.list_bookings().unwrap().is_empty());
}

#[tokio::test]
async fn update_booking_keeps_identity_and_creation_time() {
    let app = TestApp::protected();
    app.submit(booking_payload()).await;
    let before = app.store.list_bookings().unwrap().remove(0);

    let update = json!({
        "booking_type": "Коттедж",
        "name": "Мария Сидорова",
        "phone": "+7 999 765-43-21",
        "email": "maria.s@example.com",
        "check_in": "2026-08-01",
        "check_out": "2026-08-03",
        "bathhouse": false,
        "message": ""
    });
    let (status, body) = app
        .send(json_request("PUT", "/api/bookings/1", &update, Some(GOOD_AUTH)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "Record updated" }));

    let after = app.store.list_bookings().unwrap().remove(0);
    assert_eq!(after.id, before.id);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.timestamp, before.timestamp);
    assert_eq!(after.name, "Мария Сидорова");
    assert_eq!(after.phone, "+79997654321");
    assert_eq!(after.booking_type.as_deref(), Some("Коттедж"));
    assert!(!after.bathhouse);
}

#[tokio::test]
async fn update_rejects_bad_targets() {
    let app = TestApp::protected();
    let update = json!({ "name": "Олег", "phone": "+79991234567" });

    let (status, _) = app
        .send(json_request("PUT", "/api/investments/5", &update, Some(GOOD_AUTH)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(json_request("PUT", "/api/donations/5", &update, Some(GOOD_AUTH)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown record type: donations");

    let (status, _) = app
        .send(json_request("PUT", "/api/investments/abc", &update, Some(GOOD_AUTH)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reduced_configuration_has_public_listings_and_no_mutation() {
    let app = TestApp::new(DispatchOptions::default(), AdminAccess::Disabled);
    app.submit(json!({ "type": "investment", "name": "Олег", "phone": "+79991234567" }))
        .await;

    let (status, body) = app.send(empty_request("GET", "/api/investments", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app.send(empty_request("DELETE", "/api/investments/1", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(app.store.list_investments().unwrap().len(), 1);
}

#[tokio::test]
async fn unreadable_authorization_gets_the_challenge() {
    let app = TestApp::protected();

    for auth in ["Bearer abc", "Basic !!!notbase64"] {
        let response = app
            .router
            .clone()
            .oneshot(empty_request("GET", "/api/bookings", Some(auth)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{auth}");
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"Admin Panel\""
        );

        let (_, body) = app.send(empty_request("GET", "/api/bookings", Some(auth))).await;
        assert_eq!(body, json!({ "success": false, "error": "Invalid credentials" }));
    }
}

#[tokio::test]
async fn unknown_routes_and_methods_keep_the_envelope() {
    let app = TestApp::protected();

    let (status, body) = app.send(empty_request("GET", "/api/bookings/1", Some(GOOD_AUTH))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "success": false, "error": "Method not allowed" }));

    let (status, body) = app.send(empty_request("GET", "/api/submit-form", None)).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);

    let (status, body) = app.send(empty_request("GET", "/api/nowhere", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Route not found" }));
}
