//! Ticket purchase records.
//!
//! `TicketEmailData` is the input of both the HTML renderer and the PDF
//! builder. It arrives from the HTTP boundary in camelCase, is normalized
//! once per request (so renderer and builder see the same codes), and is
//! discarded after the response.

use serde::{Deserialize, Serialize};

/// Amounts equal to this literal (any case) are treated as zero.
pub const FREE_LABEL: &str = "FREE";

/// One purchasable tier: a quantity and one redemption code per unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLineItem {
	pub ticket_type: String,
	pub quantity: u32,
	/// Display string as the storefront produced it: "$50", "€12.50",
	/// or the literal "FREE".
	pub amount: String,
	#[serde(default)]
	pub codes: Vec<String>,
}

impl TicketLineItem {
	/// Numeric value of `amount`. Strips everything outside `[0-9.-]`
	/// before parsing; "FREE" and unparsable remainders are zero.
	pub fn unit_amount(&self) -> f64 {
		parse_amount(&self.amount)
	}
}

/// Per-request ticket/event record used for rendering and PDF generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketEmailData {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub event_title: String,
	#[serde(default)]
	pub event_date: String,
	#[serde(default)]
	pub event_time: String,
	#[serde(default)]
	pub event_venue: String,
	#[serde(default)]
	pub event_poster_url: Option<String>,
	#[serde(default)]
	pub order_id: Option<String>,
	/// Caller-supplied subject override for the confirmation email.
	#[serde(default)]
	pub subject: Option<String>,
	#[serde(default)]
	pub tickets: Vec<TicketLineItem>,
}

impl TicketEmailData {
	/// Establish the `codes.len() == quantity` invariant on every line
	/// item. Missing codes are synthesized from the current timestamp and
	/// a running counter, so they are unique within one pass and carry the
	/// `TKT` marker the scanner recognizes. Surplus codes are dropped.
	///
	/// Call this once per request, before rendering or building, so the
	/// email and the PDF agree on the generated codes.
	pub fn normalized(mut self) -> Self {
		let seed = chrono::Utc::now().timestamp_millis();
		let mut counter = 0usize;
		for item in &mut self.tickets {
			let want = item.quantity as usize;
			item.codes.truncate(want);
			while item.codes.len() < want {
				item.codes.push(format!("TKT-{}-{}", seed, counter));
				counter += 1;
			}
		}
		self
	}

	/// Grand total over all line items, as the storefront displays it:
	/// the literal "FREE" when the sum is exactly zero, otherwise a bare
	/// two-decimal number.
	pub fn fare_total(&self) -> String {
		let total: f64 = self
			.tickets
			.iter()
			.map(|item| item.unit_amount() * f64::from(item.quantity))
			.sum();
		if total == 0.0 {
			FREE_LABEL.to_string()
		} else {
			format!("{:.2}", total)
		}
	}

	/// Total number of individual tickets across all line items.
	pub fn ticket_count(&self) -> u32 {
		self.tickets.iter().map(|item| item.quantity).sum()
	}
}

/// Numeric value of a storefront amount string.
pub fn parse_amount(amount: &str) -> f64 {
	if amount.trim().eq_ignore_ascii_case(FREE_LABEL) {
		return 0.0;
	}
	let cleaned: String = amount
		.chars()
		.filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
		.collect();
	cleaned.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn item(ticket_type: &str, quantity: u32, amount: &str, codes: &[&str]) -> TicketLineItem {
		TicketLineItem {
			ticket_type: ticket_type.into(),
			quantity,
			amount: amount.into(),
			codes: codes.iter().map(|c| (*c).to_string()).collect(),
		}
	}

	fn data(tickets: Vec<TicketLineItem>) -> TicketEmailData {
		TicketEmailData {
			name: "Ada".into(),
			event_title: "Test Gala".into(),
			event_date: "2025-01-01".into(),
			event_time: "19:00".into(),
			event_venue: "Main Hall".into(),
			event_poster_url: None,
			order_id: None,
			subject: None,
			tickets,
		}
	}

	#[test]
	fn test_parse_amount_strips_currency_symbols() {
		assert_eq!(parse_amount("$50"), 50.0);
		assert_eq!(parse_amount("€12.50"), 12.5);
		assert_eq!(parse_amount("INR 1,250"), 1250.0);
		assert_eq!(parse_amount("-5"), -5.0);
	}

	#[test]
	fn test_parse_amount_free_and_garbage_are_zero() {
		assert_eq!(parse_amount("FREE"), 0.0);
		assert_eq!(parse_amount("free"), 0.0);
		assert_eq!(parse_amount("on the house"), 0.0);
		assert_eq!(parse_amount(""), 0.0);
	}

	#[test]
	fn test_fare_total_all_free_renders_literal() {
		let data = data(vec![
			item("GA", 3, "FREE", &["A", "B", "C"]),
			item("Student", 2, "$0", &["D", "E"]),
		]);
		assert_eq!(data.fare_total(), "FREE");
	}

	#[test]
	fn test_fare_total_two_decimals() {
		let data = data(vec![
			item("VIP", 2, "$50", &["A1", "A2"]),
			item("GA", 1, "$12.50", &["B1"]),
		]);
		assert_eq!(data.fare_total(), "112.50");
	}

	#[test]
	fn test_fare_total_skips_free_items_in_mixed_order() {
		let data = data(vec![
			item("Comp", 10, "FREE", &[]),
			item("GA", 2, "$20", &["X", "Y"]),
		]);
		assert_eq!(data.fare_total(), "40.00");
	}

	#[test]
	fn test_normalized_fills_missing_codes() {
		let normalized = data(vec![item("VIP", 3, "$50", &["KEEP-1"])]).normalized();
		let codes = &normalized.tickets[0].codes;
		assert_eq!(codes.len(), 3);
		assert_eq!(codes[0], "KEEP-1");
		assert!(codes[1].starts_with("TKT-"));
		assert!(codes[2].starts_with("TKT-"));
		assert_ne!(codes[1], codes[2]);
	}

	#[test]
	fn test_normalized_unique_across_items() {
		let normalized =
			data(vec![item("VIP", 2, "$50", &[]), item("GA", 2, "$10", &[])]).normalized();
		let mut all: Vec<&String> =
			normalized.tickets.iter().flat_map(|item| item.codes.iter()).collect();
		all.sort();
		all.dedup();
		assert_eq!(all.len(), 4);
	}

	#[test]
	fn test_normalized_drops_surplus_codes() {
		let normalized = data(vec![item("GA", 1, "$5", &["A", "B", "C"])]).normalized();
		assert_eq!(normalized.tickets[0].codes, vec!["A".to_string()]);
	}

	#[test]
	fn test_camel_case_wire_format() {
		let json = r#"{
			"name": "Ada",
			"eventTitle": "Test Gala",
			"eventDate": "2025-01-01",
			"tickets": [{"ticketType": "VIP", "quantity": 2, "amount": "$50", "codes": ["A1", "A2"]}]
		}"#;
		let data: TicketEmailData = serde_json::from_str(json).unwrap();
		assert_eq!(data.event_title, "Test Gala");
		assert_eq!(data.tickets[0].ticket_type, "VIP");
		assert_eq!(data.tickets[0].codes.len(), 2);
	}
}

// vim: ts=4
