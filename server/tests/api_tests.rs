//! HTTP facade tests.
//!
//! Drives the real router through `tower::ServiceExt::oneshot` with an
//! offline configuration: no watermark URL and no outbound accounts, so
//! nothing reaches the network.

use std::collections::HashMap;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use ticketmill::{Config, app, routes};
use ticketmill_types::SmtpConfig;

fn test_router() -> Router {
	let config = Config {
		listen: "127.0.0.1:0".into(),
		brand: "Ticketmill".into(),
		watermark_url: None,
		smtp: SmtpConfig { host: "127.0.0.1".into(), port: 2525, secure: false },
		accounts: HashMap::new(),
	};
	routes::init(app::build(config).unwrap())
}

async fn post(
	router: Router,
	uri: &str,
	body: Value,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
	let request = Request::builder()
		.method("POST")
		.uri(uri)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.unwrap();
	let response = router.oneshot(request).await.unwrap();
	let status = response.status();
	let headers = response.headers().clone();
	let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();
	(status, headers, bytes)
}

fn as_json(bytes: &[u8]) -> Value {
	serde_json::from_slice(bytes).unwrap()
}

fn sample_order() -> Value {
	json!({
		"eventTitle": "Test Gala",
		"eventDate": "2025-01-01",
		"tickets": [
			{"ticketType": "VIP", "quantity": 2, "amount": "$50", "codes": ["A1", "A2"]}
		]
	})
}

#[tokio::test]
async fn test_health_check() {
	let request = Request::builder().uri("/").body(Body::empty()).unwrap();
	let response = test_router().oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let bytes = response.into_body().collect().await.unwrap().to_bytes();
	assert_eq!(as_json(&bytes), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_generate_pdf_returns_binary_download() {
	let (status, headers, body) =
		post(test_router(), "/api/tickets/generate-pdf", sample_order()).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/pdf");
	let disposition = headers.get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
	assert!(disposition.starts_with("attachment"));
	assert!(disposition.contains("test-gala-tickets.pdf"));
	assert!(body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_generate_pdf_missing_title_is_client_error() {
	let mut order = sample_order();
	order.as_object_mut().unwrap().remove("eventTitle");
	let (status, _, body) = post(test_router(), "/api/tickets/generate-pdf", order).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	let json = as_json(&body);
	assert_eq!(json["success"], false);
	assert!(json["error"].as_str().unwrap().contains("eventTitle"));
}

#[tokio::test]
async fn test_generate_pdf_empty_tickets_is_client_error() {
	let order = json!({"eventTitle": "Test Gala", "eventDate": "2025-01-01", "tickets": []});
	let (status, _, body) = post(test_router(), "/api/tickets/generate-pdf", order).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(as_json(&body)["success"], false);
}

#[tokio::test]
async fn test_validate_unknown_code() {
	let (status, _, body) =
		post(test_router(), "/api/tickets/validate", json!({"qrData": "evt123|VIP"})).await;
	assert_eq!(status, StatusCode::OK);
	let json = as_json(&body);
	assert_eq!(json["valid"], false);
	assert_eq!(json["eventId"], "evt123");
	assert_eq!(json["ticketType"], "VIP");
	let scanned_at = json["scannedAt"].as_str().unwrap();
	assert!(chrono::DateTime::parse_from_rfc3339(scanned_at).is_ok());
}

#[tokio::test]
async fn test_validate_recognizes_generated_codes() {
	let (status, _, body) = post(
		test_router(),
		"/api/tickets/validate",
		json!({"qrData": "TKT-1700000000000-0|GA"}),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(as_json(&body)["valid"], true);
}

#[tokio::test]
async fn test_validate_requires_qr_data() {
	let (status, _, body) = post(test_router(), "/api/tickets/validate", json!({})).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(as_json(&body)["success"], false);
}

#[tokio::test]
async fn test_send_email_unknown_type_sends_nothing() {
	let (status, _, body) = post(
		test_router(),
		"/send-email",
		json!({"to": "x@example.com", "type": "spam", "data": {}}),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	let json = as_json(&body);
	assert_eq!(json["success"], false);
	assert!(json["error"].as_str().unwrap().contains("invalid email request"));
}

#[tokio::test]
async fn test_send_email_without_account_is_config_error() {
	let (status, _, body) = post(
		test_router(),
		"/send-email",
		json!({"to": "x@example.com", "type": "otp", "data": {"otp": "123456"}}),
	)
	.await;
	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	let json = as_json(&body);
	assert_eq!(json["success"], false);
	assert!(json["error"].as_str().unwrap().contains("configuration error"));
}

#[tokio::test]
async fn test_send_email_requires_recipient() {
	let (status, _, body) = post(
		test_router(),
		"/send-email",
		json!({"type": "otp", "data": {"otp": "123456"}}),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(as_json(&body)["success"], false);
}

#[tokio::test]
async fn test_send_with_pdf_requires_recipient() {
	let (status, _, body) =
		post(test_router(), "/api/tickets/send-with-pdf", sample_order()).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	let json = as_json(&body);
	assert!(json["error"].as_str().unwrap().contains("to is required"));
}

// vim: ts=4
