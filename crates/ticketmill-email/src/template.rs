//! Email template rendering with Handlebars.
//!
//! All templates are embedded at compile time: the notification kind set
//! is closed, so rendering is a pure function of the input record. Each
//! kind has an HTML and a plain text source; the HTML source carries YAML
//! frontmatter with the kind's default subject line (itself a Handlebars
//! string, rendered against the same variables).

use handlebars::Handlebars;
use serde::Deserialize;
use std::collections::HashMap;

use crate::prelude::*;

/// Metadata extracted from template frontmatter
#[derive(Debug, Default, Deserialize)]
pub struct TemplateMetadata {
	/// Default subject line for the notification kind
	#[serde(default)]
	pub subject: Option<String>,
}

/// Result of template rendering
#[derive(Debug)]
pub struct RenderResult {
	/// Subject rendered from template frontmatter
	pub subject: Option<String>,
	pub html_body: String,
	pub text_body: String,
}

/// (kind, html source, text source)
const TEMPLATE_SOURCES: [(&str, &str, &str); 5] = [
	(
		"ticket",
		include_str!("../templates/ticket.html.hbs"),
		include_str!("../templates/ticket.txt.hbs"),
	),
	("otp", include_str!("../templates/otp.html.hbs"), include_str!("../templates/otp.txt.hbs")),
	(
		"event",
		include_str!("../templates/event.html.hbs"),
		include_str!("../templates/event.txt.hbs"),
	),
	(
		"newsletter",
		include_str!("../templates/newsletter.html.hbs"),
		include_str!("../templates/newsletter.txt.hbs"),
	),
	(
		"ticketpurchased",
		include_str!("../templates/ticketpurchased.html.hbs"),
		include_str!("../templates/ticketpurchased.txt.hbs"),
	),
];

/// Template engine for email rendering
pub struct TemplateEngine {
	handlebars: Handlebars<'static>,
	subjects: HashMap<&'static str, String>,
	brand: String,
}

impl TemplateEngine {
	/// Register all embedded templates. `brand` is injected into every
	/// render as the `brand` variable.
	pub fn new(brand: impl Into<String>) -> TmResult<Self> {
		let mut handlebars = Handlebars::new();

		// Strict mode: a template referencing a variable the notification
		// record does not provide is a bug, not an empty string
		handlebars.set_strict_mode(true);

		let mut subjects = HashMap::new();
		for (name, html_source, text_source) in TEMPLATE_SOURCES {
			let (metadata, html_template) = parse_frontmatter(html_source);
			let (_, text_template) = parse_frontmatter(text_source);
			handlebars
				.register_template_string(&format!("{}.html", name), html_template)
				.map_err(|e| Error::Internal(format!("template '{}' html: {}", name, e)))?;
			handlebars
				.register_template_string(&format!("{}.txt", name), text_template)
				.map_err(|e| Error::Internal(format!("template '{}' text: {}", name, e)))?;
			if let Some(subject) = metadata.subject {
				subjects.insert(name, subject);
			}
		}

		Ok(Self { handlebars, subjects, brand: brand.into() })
	}

	/// Render the HTML and text bodies plus the frontmatter subject for
	/// the given kind. Deterministic: identical vars render identically.
	pub fn render(&self, name: &str, vars: &serde_json::Value) -> TmResult<RenderResult> {
		let mut vars = vars.clone();
		if let serde_json::Value::Object(ref mut map) = vars {
			map.insert("brand".to_string(), serde_json::Value::String(self.brand.clone()));
		}

		let subject = match self.subjects.get(name) {
			Some(template) => {
				let rendered = self.handlebars.render_template(template, &vars).map_err(|e| {
					Error::Internal(format!("failed to render subject for '{}': {}", name, e))
				})?;
				Some(rendered)
			}
			None => None,
		};

		let html_body = self.handlebars.render(&format!("{}.html", name), &vars).map_err(|e| {
			Error::Internal(format!("failed to render HTML template '{}': {}", name, e))
		})?;
		let text_body = self.handlebars.render(&format!("{}.txt", name), &vars).map_err(|e| {
			Error::Internal(format!("failed to render text template '{}': {}", name, e))
		})?;

		Ok(RenderResult { subject, html_body, text_body })
	}
}

/// Parse YAML frontmatter from template content
///
/// Frontmatter is delimited by `---` at the start of the file:
/// ```text
/// ---
/// subject: Your tickets for {{eventTitle}}
/// ---
/// Template content here...
/// ```
///
/// Returns (metadata, content_without_frontmatter)
fn parse_frontmatter(content: &str) -> (TemplateMetadata, &str) {
	let content = content.trim_start();

	if !content.starts_with("---") {
		return (TemplateMetadata::default(), content);
	}

	let after_first = &content[3..];
	if let Some(end_pos) = after_first.find("\n---") {
		let yaml_content = &after_first[..end_pos];
		let template_content = &after_first[end_pos + 4..]; // Skip "\n---"

		match serde_yaml::from_str(yaml_content) {
			Ok(metadata) => (metadata, template_content.trim_start_matches('\n')),
			Err(e) => {
				warn!("Failed to parse frontmatter YAML: {}", e);
				(TemplateMetadata::default(), content)
			}
		}
	} else {
		// No closing delimiter found
		(TemplateMetadata::default(), content)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::notification::{
		EventPublishedData, NewsletterData, Notification, OtpData, TicketSaleData,
	};
	use serde_json::json;

	fn engine() -> TemplateEngine {
		TemplateEngine::new("Ticketmill").unwrap()
	}

	fn ticket_vars() -> serde_json::Value {
		let data = serde_json::from_value(json!({
			"name": "Ada",
			"eventTitle": "Test Gala",
			"eventDate": "2025-01-01",
			"eventTime": "19:00",
			"eventVenue": "Main Hall",
			"tickets": [
				{"ticketType": "VIP", "quantity": 2, "amount": "$50", "codes": ["A1", "A2"]}
			]
		}))
		.unwrap();
		Notification::Ticket(data).template_vars().unwrap()
	}

	#[test]
	fn test_parse_frontmatter_basic() {
		let content = "---\nsubject: Test Subject\n---\nHello {{name}}!";
		let (metadata, template) = parse_frontmatter(content);
		assert_eq!(metadata.subject, Some("Test Subject".to_string()));
		assert_eq!(template, "Hello {{name}}!");
	}

	#[test]
	fn test_parse_frontmatter_missing() {
		let (metadata, template) = parse_frontmatter("Hello {{name}}!");
		assert!(metadata.subject.is_none());
		assert_eq!(template, "Hello {{name}}!");
	}

	#[test]
	fn test_parse_frontmatter_unclosed() {
		let (metadata, _) = parse_frontmatter("---\nsubject: Test\nHello!");
		assert!(metadata.subject.is_none());
	}

	#[test]
	fn test_all_templates_register() {
		// strict-mode registration catches syntax errors at startup
		let _ = engine();
	}

	#[test]
	fn test_ticket_render() {
		let result = engine().render("ticket", &ticket_vars()).unwrap();
		assert_eq!(result.subject.as_deref(), Some("Your tickets for Test Gala"));
		assert!(result.html_body.contains("Test Gala"));
		assert!(result.html_body.contains("A1"));
		assert!(result.html_body.contains("A2"));
		assert!(result.html_body.contains("100.00"));
		assert!(result.html_body.contains("api.qrserver.com"));
		assert!(result.text_body.contains("A2"));
	}

	#[test]
	fn test_ticket_render_is_idempotent() {
		let engine = engine();
		let vars = ticket_vars();
		let first = engine.render("ticket", &vars).unwrap();
		let second = engine.render("ticket", &vars).unwrap();
		assert_eq!(first.html_body, second.html_body);
		assert_eq!(first.text_body, second.text_body);
		assert_eq!(first.subject, second.subject);
	}

	#[test]
	fn test_otp_defaults() {
		let data: OtpData = serde_json::from_value(json!({"otp": "482910"})).unwrap();
		let vars = Notification::Otp(data).template_vars().unwrap();
		let result = engine().render("otp", &vars).unwrap();
		assert!(result.html_body.contains("Organizer"));
		assert!(result.html_body.contains("482910"));
		assert!(result.html_body.contains("5 minutes"));
		assert_eq!(result.subject.as_deref(), Some("Your verification code"));
	}

	#[test]
	fn test_event_cta_only_with_url() {
		let without: EventPublishedData =
			serde_json::from_value(json!({"eventTitle": "Gala"})).unwrap();
		let vars = Notification::Event(without.clone()).template_vars().unwrap();
		let result = engine().render("event", &vars).unwrap();
		assert!(!result.html_body.contains("View your event"));
		assert!(result.html_body.contains("To be announced"));
		assert!(result.html_body.contains("Free"));

		let with = EventPublishedData {
			event_url: Some("https://ticketmill.io/e/gala".into()),
			..without
		};
		let vars = Notification::Event(with).template_vars().unwrap();
		let result = engine().render("event", &vars).unwrap();
		assert!(result.html_body.contains("View your event"));
		assert!(result.html_body.contains("https://ticketmill.io/e/gala"));
	}

	#[test]
	fn test_newsletter_content_is_not_escaped() {
		let data = NewsletterData {
			name: None,
			title: "March news".into(),
			content: "<p>Hello <strong>world</strong></p>".into(),
			cta_text: None,
			cta_url: None,
			subject: None,
		};
		let vars = Notification::Newsletter(data).template_vars().unwrap();
		let result = engine().render("newsletter", &vars).unwrap();
		assert!(result.html_body.contains("<strong>world</strong>"));
		assert_eq!(result.subject.as_deref(), Some("March news"));
	}

	#[test]
	fn test_sale_subject_embeds_quantity_and_title() {
		let data = TicketSaleData {
			organizer_name: Some("Ona".into()),
			buyer_name: "Bo".into(),
			event_title: "Test Gala".into(),
			quantity: 3,
			ticket_type: Some("VIP".into()),
			amount: Some("$150".into()),
			subject: None,
		};
		let vars = Notification::TicketPurchased(data).template_vars().unwrap();
		let result = engine().render("ticketpurchased", &vars).unwrap();
		assert_eq!(result.subject.as_deref(), Some("You sold 3 tickets for Test Gala"));
		assert!(result.html_body.contains("Bo"));
	}

	#[test]
	fn test_html_is_escaped_by_default() {
		let data: OtpData =
			serde_json::from_value(json!({"otp": "1", "name": "<script>x</script>"})).unwrap();
		let vars = Notification::Otp(data).template_vars().unwrap();
		let result = engine().render("otp", &vars).unwrap();
		assert!(!result.html_body.contains("<script>"));
		assert!(result.html_body.contains("&lt;script&gt;"));
	}
}

// vim: ts=4
