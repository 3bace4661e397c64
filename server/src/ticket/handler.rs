//! Ticket endpoints: PDF download, combined send, QR validation.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Json, http::StatusCode};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::prelude::*;
use ticketmill_email::dispatch::ticket_attachment_name;
use ticketmill_email::{EmailAttachment, Notification, SendRequest};
use ticketmill_types::TicketEmailData;

/// Prefixes a genuine ticket code starts with: gateway order references
/// and locally generated fallback codes.
const KNOWN_CODE_MARKERS: [&str; 2] = ["RAEXp", "TKT"];

/// POST /api/tickets/generate-pdf: build the ticket document and return
/// it as a download.
pub async fn generate_pdf(
	State(app): State<App>,
	Json(body): Json<Value>,
) -> TmResult<Response> {
	let data: TicketEmailData = parse_body(body)?;
	require_ticket_fields(&data)?;
	let data = with_pdf_defaults(data).normalized();

	let document = app.pdf.build(&data).await?;
	let disposition =
		format!("attachment; filename=\"{}-tickets.pdf\"", slug(&data.event_title));

	Ok((
		StatusCode::OK,
		[
			(header::CONTENT_TYPE, "application/pdf".to_string()),
			(header::CONTENT_DISPOSITION, disposition),
		],
		document.bytes,
	)
		.into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendWithPdfRequest {
	#[serde(default)]
	to: String,
	#[serde(flatten)]
	data: TicketEmailData,
}

/// POST /api/tickets/send-with-pdf: build the document, then email it as
/// an attachment in the same call.
pub async fn send_with_pdf(
	State(app): State<App>,
	Json(body): Json<Value>,
) -> TmResult<Json<Value>> {
	let request: SendWithPdfRequest = parse_body(body)?;
	if request.to.trim().is_empty() {
		return Err(Error::ValidationError("to is required".into()));
	}
	require_ticket_fields(&request.data)?;
	let data = with_pdf_defaults(request.data).normalized();

	// unlike the dispatcher's own best-effort attachment, a build failure
	// here fails the request: the PDF is what the caller asked for
	let document = app.pdf.build(&data).await?;
	let pdf_size = document.bytes.len();
	let filename = ticket_attachment_name(&data);

	let report = app
		.dispatcher
		.send(SendRequest {
			to: request.to,
			notification: Notification::Ticket(data),
			from: None,
			attachments: vec![EmailAttachment {
				filename,
				content_type: "application/pdf".into(),
				bytes: document.bytes,
			}],
		})
		.await?;
	debug!("send-with-pdf delivered, attachment: {:?}", report.attachment);

	Ok(Json(json!({
		"success": true,
		"message": "Email sent successfully with PDF attachment",
		"pdfSize": pdf_size,
	})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest {
	#[serde(default)]
	qr_data: String,
}

/// POST /api/tickets/validate: decode a scanned `eventId|ticketType`
/// payload and flag whether it looks like one of ours.
///
/// This only substring-matches the known code markers; it does not check
/// the code against any purchase record, so it must not be treated as
/// admission control.
/// TODO: look the code up in the marketplace's purchases store once this
/// service gets read access to it.
pub async fn validate(Json(body): Json<Value>) -> TmResult<Json<Value>> {
	let request: ValidateRequest = parse_body(body)?;
	if request.qr_data.trim().is_empty() {
		return Err(Error::ValidationError("qrData is required".into()));
	}

	let (event_id, ticket_type) =
		request.qr_data.split_once('|').unwrap_or((request.qr_data.as_str(), ""));
	let valid = KNOWN_CODE_MARKERS.iter().any(|marker| request.qr_data.contains(marker));

	Ok(Json(json!({
		"valid": valid,
		"eventId": event_id,
		"ticketType": ticket_type,
		"scannedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
	})))
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value) -> TmResult<T> {
	serde_json::from_value(body)
		.map_err(|e| Error::ValidationError(format!("invalid request body: {}", e)))
}

fn require_ticket_fields(data: &TicketEmailData) -> TmResult<()> {
	if data.event_title.trim().is_empty() {
		return Err(Error::ValidationError("eventTitle is required".into()));
	}
	if data.tickets.is_empty() {
		return Err(Error::ValidationError("tickets must be a non-empty array".into()));
	}
	Ok(())
}

/// Fill the fields the document builder requires but the endpoint accepts
/// as optional, and give skeleton line items usable fallback values.
fn with_pdf_defaults(mut data: TicketEmailData) -> TicketEmailData {
	if data.name.trim().is_empty() {
		data.name = "Guest".into();
	}
	if data.event_date.trim().is_empty() {
		data.event_date = "To be announced".into();
	}
	if data.event_time.trim().is_empty() {
		data.event_time = "To be announced".into();
	}
	if data.event_venue.trim().is_empty() {
		data.event_venue = "To be announced".into();
	}
	for item in &mut data.tickets {
		if item.ticket_type.trim().is_empty() {
			item.ticket_type = "General Admission".into();
		}
		if item.quantity == 0 {
			item.quantity = 1;
		}
		if item.amount.trim().is_empty() {
			item.amount = "FREE".into();
		}
	}
	data
}

fn slug(title: &str) -> String {
	let mut out = String::with_capacity(title.len());
	let mut last_dash = true;
	for c in title.chars() {
		if c.is_ascii_alphanumeric() {
			out.push(c.to_ascii_lowercase());
			last_dash = false;
		} else if !last_dash {
			out.push('-');
			last_dash = true;
		}
	}
	out.trim_end_matches('-').to_string()
}


// vim: ts=4
