//! Shared types for the Ticketmill notification service.
//!
//! This crate contains the data model that flows between the HTTP facade,
//! the mail dispatcher and the ticket document builder:
//! - Ticket purchase records (`TicketEmailData`, `TicketLineItem`) with
//!   code normalization and fare-total arithmetic
//! - Outbound mail account identities (`AccountKey`, `EmailAccount`)
//! - The service-wide `Error` enum and `TmResult` alias
//!
//! Nothing in here is persisted; every value is built per request and
//! dropped once the response is sent.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod error;
pub mod prelude;
pub mod ticket;

pub use account::{AccountKey, EmailAccount, SmtpConfig};
pub use error::{Error, TmResult};
pub use ticket::{TicketEmailData, TicketLineItem};

// vim: ts=4
