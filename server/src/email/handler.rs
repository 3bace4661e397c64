//! Generic email dispatch endpoint.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::prelude::*;
use ticketmill_email::{Notification, SendRequest};
use ticketmill_types::AccountKey;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest {
	#[serde(default)]
	to: String,
	#[serde(flatten)]
	notification: Notification,
	#[serde(default)]
	from_account_key: Option<AccountKey>,
}

/// POST /send-email: forward `to`/`type`/`data` to the dispatcher.
/// Unknown notification types fail deserialization and surface as a
/// validation error; nothing is sent for them.
pub async fn send_email(
	State(app): State<App>,
	Json(body): Json<Value>,
) -> TmResult<Json<Value>> {
	let request: SendEmailRequest = serde_json::from_value(body)
		.map_err(|e| Error::ValidationError(format!("invalid email request: {}", e)))?;

	let report = app
		.dispatcher
		.send(SendRequest {
			to: request.to,
			notification: request.notification,
			from: request.from_account_key,
			attachments: Vec::new(),
		})
		.await?;
	debug!("send-email delivered, subject {:?}", report.subject);

	Ok(Json(json!({
		"success": true,
		"message": "Email sent successfully",
	})))
}

// vim: ts=4
