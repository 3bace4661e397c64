//! Environment configuration.
//!
//! Read once at startup into an immutable `Config`; nothing here changes
//! for the process lifetime. Outbound accounts with an incomplete
//! credential pair are dropped with a warning; resolving them later is a
//! configuration error at the dispatch site.

use std::collections::HashMap;
use std::env;

use crate::prelude::*;
use ticketmill_types::{AccountKey, EmailAccount, SmtpConfig};

const DEFAULT_WATERMARK_URL: &str = "https://assets.ticketmill.io/brand/watermark.png";

#[derive(Clone, Debug)]
pub struct Config {
	/// `host:port` the HTTP facade binds to.
	pub listen: String,
	/// Brand name used in document headers, templates and From headers.
	pub brand: String,
	/// Remote watermark bitmap for generated tickets.
	pub watermark_url: Option<String>,
	pub smtp: SmtpConfig,
	pub accounts: HashMap<AccountKey, EmailAccount>,
}

impl Config {
	pub fn from_env() -> TmResult<Self> {
		let port: u16 = parse_var("PORT", "3001")?;
		let smtp_port: u16 = parse_var("SMTP_PORT", "465")?;
		let secure = match env_or("SMTP_SECURE", "true").as_str() {
			"true" | "1" => true,
			"false" | "0" => false,
			other => {
				return Err(Error::ConfigError(format!(
					"SMTP_SECURE must be true or false, got {:?}",
					other
				)));
			}
		};

		let mut accounts = HashMap::new();
		for key in AccountKey::ALL {
			let upper = key.as_str().to_uppercase();
			let user = env::var(format!("SMTP_{}_USER", upper)).ok().filter(|v| !v.is_empty());
			let pass = env::var(format!("SMTP_{}_PASS", upper)).ok().filter(|v| !v.is_empty());
			match (user, pass) {
				(Some(user), Some(pass)) => {
					accounts.insert(key, EmailAccount { user, pass });
				}
				(None, None) => {}
				_ => warn!("Account '{}' has an incomplete credential pair, ignoring it", key),
			}
		}

		Ok(Config {
			listen: format!("0.0.0.0:{}", port),
			brand: env_or("BRAND_NAME", "Ticketmill"),
			watermark_url: match env::var("TICKET_WATERMARK_URL") {
				Ok(url) if url.is_empty() => None,
				Ok(url) => Some(url),
				Err(_) => Some(DEFAULT_WATERMARK_URL.to_string()),
			},
			smtp: SmtpConfig { host: env_or("SMTP_HOST", "smtp.gmail.com"), port: smtp_port, secure },
			accounts,
		})
	}
}

fn env_or(key: &str, default: &str) -> String {
	env::var(key).unwrap_or_else(|_| {
		debug!("{} not set, using default: {}", key, default);
		default.to_string()
	})
}

fn parse_var<T: std::str::FromStr>(key: &str, default: &str) -> TmResult<T> {
	env_or(key, default)
		.parse()
		.map_err(|_| Error::ConfigError(format!("{} is not a valid value", key)))
}

// vim: ts=4
