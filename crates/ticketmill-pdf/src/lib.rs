//! Ticket document generation for Ticketmill.
//!
//! This crate turns a `TicketEmailData` record into a finished PDF:
//! - QR matrix rasterization (one code per individual ticket)
//! - Best-effort fetching of the brand watermark and event poster
//! - Page layout with bordered per-ticket boxes and automatic pagination
//! - Watermark stamping on every page
//!
//! Remote image failures never fail the document; they are recorded as
//! degradations on the result so callers and tests can observe them
//! without inspecting logs.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod fetch;
pub mod qr;

mod prelude;

pub use builder::{PdfOptions, TicketDocument, TicketDocumentBuilder};
pub use fetch::{BestEffort, RasterImage};

// vim: ts=4
