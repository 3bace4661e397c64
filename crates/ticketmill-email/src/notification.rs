//! Typed notification records.
//!
//! One record per notification kind, collected in the adjacently-tagged
//! `Notification` enum (`{"type": "...", "data": {...}}` on the wire).
//! Unknown tags fail deserialization, so an unsupported kind can never
//! reach the renderer, and adding a kind forces every match to follow.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::prelude::*;
use ticketmill_types::TicketEmailData;

/// Verification-code email for organizers logging into the dashboard.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpData {
	#[serde(default = "default_otp_name")]
	pub name: String,
	pub otp: String,
	/// Validity window in minutes.
	#[serde(default = "default_otp_expiry")]
	pub expires_in: u32,
	#[serde(default)]
	pub subject: Option<String>,
}

fn default_otp_name() -> String {
	"Organizer".into()
}

fn default_otp_expiry() -> u32 {
	5
}

/// "Your event is live" notice sent to the organizer on publication.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPublishedData {
	#[serde(default)]
	pub organizer_name: Option<String>,
	pub event_title: String,
	#[serde(default)]
	pub event_date: String,
	#[serde(default = "default_announced")]
	pub event_time: String,
	#[serde(default)]
	pub event_venue: Option<String>,
	#[serde(default = "default_price")]
	pub price: String,
	/// Public event page; the call-to-action renders only when present.
	#[serde(default)]
	pub event_url: Option<String>,
	#[serde(default)]
	pub subject: Option<String>,
}

fn default_announced() -> String {
	"To be announced".into()
}

fn default_price() -> String {
	"Free".into()
}

/// Generic announcement to subscribers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterData {
	#[serde(default)]
	pub name: Option<String>,
	pub title: String,
	/// Pre-rendered HTML fragment supplied by the campaign editor.
	pub content: String,
	#[serde(default)]
	pub cta_text: Option<String>,
	#[serde(default)]
	pub cta_url: Option<String>,
	#[serde(default)]
	pub subject: Option<String>,
}

/// Sale notice sent to the organizer when a buyer completes checkout.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSaleData {
	#[serde(default)]
	pub organizer_name: Option<String>,
	#[serde(default)]
	pub buyer_name: String,
	pub event_title: String,
	#[serde(default = "default_quantity")]
	pub quantity: u32,
	#[serde(default)]
	pub ticket_type: Option<String>,
	#[serde(default)]
	pub amount: Option<String>,
	#[serde(default)]
	pub subject: Option<String>,
}

fn default_quantity() -> u32 {
	1
}

/// Every notification the service can send.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Notification {
	Ticket(TicketEmailData),
	Otp(OtpData),
	Event(EventPublishedData),
	Newsletter(NewsletterData),
	TicketPurchased(TicketSaleData),
}

impl Notification {
	/// Name of the registered template pair for this kind.
	pub fn template_name(&self) -> &'static str {
		match self {
			Notification::Ticket(_) => "ticket",
			Notification::Otp(_) => "otp",
			Notification::Event(_) => "event",
			Notification::Newsletter(_) => "newsletter",
			Notification::TicketPurchased(_) => "ticketpurchased",
		}
	}

	/// Caller-supplied subject override, if any.
	pub fn subject_override(&self) -> Option<&str> {
		let subject = match self {
			Notification::Ticket(data) => &data.subject,
			Notification::Otp(data) => &data.subject,
			Notification::Event(data) => &data.subject,
			Notification::Newsletter(data) => &data.subject,
			Notification::TicketPurchased(data) => &data.subject,
		};
		subject.as_deref().filter(|s| !s.trim().is_empty())
	}

	/// Template variables for this notification. Every key a template can
	/// reference is always present (null when absent); the engine runs
	/// in strict mode.
	pub fn template_vars(&self) -> TmResult<Value> {
		match self {
			Notification::Ticket(data) => Ok(ticket_vars(data)),
			Notification::Otp(data) => to_vars(data),
			Notification::Event(data) => {
				let mut vars = to_vars(data)?;
				// empty URL means no CTA
				if data.event_url.as_deref().is_some_and(str::is_empty) {
					vars["eventUrl"] = Value::Null;
				}
				Ok(vars)
			}
			Notification::Newsletter(data) => {
				let mut vars = to_vars(data)?;
				vars["cta"] = match (data.cta_text.as_deref(), data.cta_url.as_deref()) {
					(Some(text), Some(url)) if !text.is_empty() && !url.is_empty() => {
						json!({ "text": text, "url": url })
					}
					_ => Value::Null,
				};
				Ok(vars)
			}
			Notification::TicketPurchased(data) => {
				let mut vars = to_vars(data)?;
				vars["ticketLabel"] =
					Value::String(if data.quantity == 1 { "ticket" } else { "tickets" }.into());
				Ok(vars)
			}
		}
	}
}

fn to_vars<T: Serialize>(data: &T) -> TmResult<Value> {
	serde_json::to_value(data)
		.map_err(|e| Error::Internal(format!("notification serialization failed: {}", e)))
}

fn ticket_vars(data: &TicketEmailData) -> Value {
	let items: Vec<Value> = data
		.tickets
		.iter()
		.map(|item| {
			json!({
				"ticketType": item.ticket_type,
				"quantity": item.quantity,
				"amount": item.amount,
			})
		})
		.collect();
	let codes: Vec<Value> = data
		.tickets
		.iter()
		.flat_map(|item| {
			item.codes.iter().map(|code| {
				json!({
					"code": code,
					"ticketType": item.ticket_type,
					"qrUrl": qr_image_url(code),
				})
			})
		})
		.collect();
	json!({
		"name": data.name,
		"eventTitle": data.event_title,
		"eventDate": data.event_date,
		"eventTime": data.event_time,
		"eventVenue": data.event_venue,
		"eventPosterUrl": data.event_poster_url,
		"items": items,
		"codes": codes,
		"total": data.fare_total(),
	})
}

/// Hosted QR image for embedding in HTML mail; most clients refuse data
/// URIs in `img` tags.
fn qr_image_url(code: &str) -> String {
	let encoded: String = url::form_urlencoded::byte_serialize(code.as_bytes()).collect();
	format!("https://api.qrserver.com/v1/create-qr-code/?size=160x160&data={}", encoded)
}


// vim: ts=4
