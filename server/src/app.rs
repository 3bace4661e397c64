//! App state and process entry point.

use std::sync::Arc;

use crate::config::Config;
use crate::prelude::*;
use crate::routes;
use ticketmill_email::{Dispatcher, MailerConfig};
use ticketmill_pdf::{PdfOptions, TicketDocumentBuilder};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub config: Config,
	pub pdf: Arc<TicketDocumentBuilder>,
	pub dispatcher: Dispatcher,
}

pub type App = Arc<AppState>;

/// Wire the document builder and dispatcher from an immutable config.
pub fn build(config: Config) -> TmResult<App> {
	let pdf = Arc::new(TicketDocumentBuilder::new(PdfOptions {
		brand: config.brand.clone(),
		watermark_url: config.watermark_url.clone(),
	})?);
	let dispatcher = Dispatcher::new(
		MailerConfig {
			smtp: config.smtp.clone(),
			accounts: config.accounts.clone(),
			from_name: config.brand.clone(),
		},
		pdf.clone(),
	)?;
	Ok(Arc::new(AppState { config, pdf, dispatcher }))
}

pub async fn run() -> TmResult<()> {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.init();

	let config = Config::from_env()?;
	info!("Ticketmill notification service v{}", VERSION);
	if config.accounts.is_empty() {
		warn!("No outbound mail accounts configured; email endpoints will fail");
	}

	let app = build(config)?;
	let router = routes::init(app.clone());

	let listener = tokio::net::TcpListener::bind(app.config.listen.as_str()).await?;
	info!("Listening on http://{}", app.config.listen);
	axum::serve(listener, router).await?;

	Ok(())
}

// vim: ts=4
