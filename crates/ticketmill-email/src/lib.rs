//! Email notification system for Ticketmill.
//!
//! This crate provides:
//! - Template rendering with variable substitution (Handlebars, embedded
//!   HTML + plain-text sources with YAML frontmatter subjects)
//! - Typed notification records, one per notification kind
//! - SMTP email sending with lettre, including PDF ticket attachments
//!
//! Configuration is passed explicitly into the `Dispatcher` constructor;
//! there is no global state and no queue; every send is an independent,
//! stateless operation.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod dispatch;
pub mod notification;
pub mod template;

mod prelude;

pub use dispatch::{
	AttachmentOutcome, Dispatcher, EmailAttachment, MailerConfig, SendReport, SendRequest,
};
pub use notification::{
	EventPublishedData, NewsletterData, Notification, OtpData, TicketSaleData,
};
pub use template::{RenderResult, TemplateEngine};

// vim: ts=4
