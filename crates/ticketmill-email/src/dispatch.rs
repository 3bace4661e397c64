//! SMTP mail dispatch.
//!
//! Each send is stateless and independent: resolve the outbound account,
//! render the templates, attach the ticket PDF when the notification calls
//! for one, hand the composed message to the SMTP transport. There is no
//! retry, queue or idempotency key: a duplicate call sends a duplicate
//! email.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, Mailbox, Message, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::notification::Notification;
use crate::prelude::*;
use crate::template::TemplateEngine;
use ticketmill_pdf::TicketDocumentBuilder;
use ticketmill_types::{AccountKey, EmailAccount, SmtpConfig, TicketEmailData};

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable dispatcher configuration, built once at startup and passed in
/// explicitly; the dispatcher holds no global state.
#[derive(Clone, Debug)]
pub struct MailerConfig {
	pub smtp: SmtpConfig,
	/// Accounts with a complete credential pair. Resolving a key that is
	/// not in here is a configuration error.
	pub accounts: HashMap<AccountKey, EmailAccount>,
	/// Display name used in the From header and as template brand.
	pub from_name: String,
}

/// A file to send along with the message.
#[derive(Clone, Debug)]
pub struct EmailAttachment {
	pub filename: String,
	pub content_type: String,
	pub bytes: Vec<u8>,
}

/// One outbound email.
#[derive(Clone, Debug)]
pub struct SendRequest {
	pub to: String,
	pub notification: Notification,
	/// Outbound identity; defaults to `noreply`.
	pub from: Option<AccountKey>,
	/// Caller-supplied attachments. When present on a ticket send, the
	/// dispatcher does not generate its own PDF.
	pub attachments: Vec<EmailAttachment>,
}

/// What happened to the (optional) document attachment of a send.
#[derive(Clone, Debug)]
pub enum AttachmentOutcome {
	Attached { filename: String, size: usize },
	/// The ticket PDF could not be generated; the email went out without
	/// it. Carries the reason so tests can assert on the degraded path.
	Degraded(String),
	NotRequested,
}

/// Delivery result of a successful send.
#[derive(Clone, Debug)]
pub struct SendReport {
	pub subject: String,
	pub attachment: AttachmentOutcome,
}

pub struct Dispatcher {
	config: MailerConfig,
	templates: TemplateEngine,
	pdf: Arc<TicketDocumentBuilder>,
}

impl Dispatcher {
	pub fn new(config: MailerConfig, pdf: Arc<TicketDocumentBuilder>) -> TmResult<Self> {
		let templates = TemplateEngine::new(config.from_name.clone())?;
		Ok(Self { config, templates, pdf })
	}

	/// Render, compose and submit one notification.
	///
	/// Account resolution happens before any network activity; ticket PDF
	/// generation is best-effort and never fails the send.
	pub async fn send(&self, request: SendRequest) -> TmResult<SendReport> {
		if request.to.trim().is_empty() {
			return Err(Error::ValidationError("recipient address is required".into()));
		}
		if !request.to.contains('@') {
			return Err(Error::ValidationError("invalid recipient email address".into()));
		}
		let key = request.from.unwrap_or_default();
		let account = self.resolve_account(key)?;

		let vars = request.notification.template_vars()?;
		let rendered = self.templates.render(request.notification.template_name(), &vars)?;
		let subject = request
			.notification
			.subject_override()
			.map(str::to_string)
			.or(rendered.subject.clone())
			.unwrap_or_else(|| format!("Notification from {}", self.config.from_name));

		let mut attachments = request.attachments;
		let outcome = if !attachments.is_empty() {
			AttachmentOutcome::Attached {
				filename: attachments.iter().map(|a| a.filename.clone()).next().unwrap_or_default(),
				size: attachments.iter().map(|a| a.bytes.len()).sum(),
			}
		} else if let Notification::Ticket(data) = &request.notification {
			let (attachment, outcome) = self.build_ticket_attachment(data).await;
			attachments.extend(attachment);
			outcome
		} else {
			AttachmentOutcome::NotRequested
		};

		let message = compose_message(
			&self.config.from_name,
			&account.user,
			&request.to,
			&subject,
			rendered.text_body,
			rendered.html_body,
			attachments,
		)?;

		let mailer = self.transport(account)?;
		match mailer.send(message).await {
			Ok(_) => {
				info!("Email sent to {} from account '{}' ({:?})", request.to, key, subject);
				Ok(SendReport { subject, attachment: outcome })
			}
			Err(e) => {
				warn!("Failed to send email to {}: {}", request.to, e);
				Err(Error::ServiceUnavailable(format!("SMTP send failed: {}", e)))
			}
		}
	}

	fn resolve_account(&self, key: AccountKey) -> TmResult<&EmailAccount> {
		self.config.accounts.get(&key).ok_or_else(|| {
			Error::ConfigError(format!("no credentials configured for account '{}'", key))
		})
	}

	/// Generate the ticket PDF for a confirmation email. Failure degrades
	/// the send instead of aborting it.
	async fn build_ticket_attachment(
		&self,
		data: &TicketEmailData,
	) -> (Option<EmailAttachment>, AttachmentOutcome) {
		match self.pdf.build(data).await {
			Ok(document) => {
				let filename = ticket_attachment_name(data);
				let size = document.bytes.len();
				let attachment = EmailAttachment {
					filename: filename.clone(),
					content_type: "application/pdf".into(),
					bytes: document.bytes,
				};
				(Some(attachment), AttachmentOutcome::Attached { filename, size })
			}
			Err(err) => {
				warn!("Ticket PDF generation failed, sending without attachment: {}", err);
				(None, AttachmentOutcome::Degraded(err.to_string()))
			}
		}
	}

	fn transport(&self, account: &EmailAccount) -> TmResult<AsyncSmtpTransport<Tokio1Executor>> {
		let parameters = TlsParameters::builder(self.config.smtp.host.clone())
			.build()
			.map_err(|e| Error::ConfigError(format!("TLS configuration error: {}", e)))?;
		let tls = if self.config.smtp.secure {
			Tls::Wrapper(parameters)
		} else {
			Tls::Opportunistic(parameters)
		};

		Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp.host)
			.port(self.config.smtp.port)
			.timeout(Some(SEND_TIMEOUT))
			.tls(tls)
			.credentials(Credentials::new(account.user.clone(), account.pass.clone()))
			.build())
	}
}

/// Attachment name from the order identifier, falling back to a timestamp.
pub fn ticket_attachment_name(data: &TicketEmailData) -> String {
	match data.order_id.as_deref() {
		Some(order_id) if !order_id.is_empty() => format!("tickets-{}.pdf", order_id),
		_ => format!("tickets-{}.pdf", chrono::Utc::now().timestamp_millis()),
	}
}

fn compose_message(
	from_name: &str,
	from_address: &str,
	to: &str,
	subject: &str,
	text_body: String,
	html_body: String,
	attachments: Vec<EmailAttachment>,
) -> TmResult<Message> {
	let from: Mailbox = format!("{} <{}>", from_name, from_address)
		.parse()
		.map_err(|_| Error::ConfigError(format!("invalid from address '{}'", from_address)))?;
	let to: Mailbox = to
		.parse()
		.map_err(|_| Error::ValidationError("invalid recipient email format".into()))?;

	let builder = Message::builder().from(from).to(to).subject(subject);
	let alternative = MultiPart::alternative_plain_html(text_body, html_body);

	let message = if attachments.is_empty() {
		builder.multipart(alternative)
	} else {
		let mut mixed = MultiPart::mixed().multipart(alternative);
		for attachment in attachments {
			let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
				Error::Internal(format!("invalid attachment content type: {}", e))
			})?;
			mixed = mixed
				.singlepart(Attachment::new(attachment.filename).body(
					Body::new(attachment.bytes),
					content_type,
				));
		}
		builder.multipart(mixed)
	};

	message.map_err(|e| Error::ValidationError(format!("failed to build email: {}", e)))
}


// vim: ts=4
