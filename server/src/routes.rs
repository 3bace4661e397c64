use axum::{
	Json, Router,
	routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app::App;
use crate::email;
use crate::ticket;

pub fn init(state: App) -> Router {
	Router::new()
		.route("/", get(health))
		.route("/api/tickets/generate-pdf", post(ticket::handler::generate_pdf))
		.route("/api/tickets/send-with-pdf", post(ticket::handler::send_with_pdf))
		.route("/api/tickets/validate", post(ticket::handler::validate))
		.route("/send-email", post(email::handler::send_email))
		// the storefront calls this service cross-origin
		.layer(CorsLayer::permissive())
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

// vim: ts=4
