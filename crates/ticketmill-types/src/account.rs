//! Outbound mail account identities.
//!
//! The service sends from a fixed, small set of identities. Credentials are
//! read from the environment once at startup and stay immutable for the
//! process lifetime; an account without a credential pair is simply absent
//! from the table and resolving it is a configuration error.

use serde::{Deserialize, Serialize};

/// Symbolic name selecting which outbound identity a message is sent from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKey {
	#[default]
	Noreply,
	Info,
	Hello,
}

impl AccountKey {
	pub const ALL: [AccountKey; 3] = [AccountKey::Noreply, AccountKey::Info, AccountKey::Hello];

	pub fn as_str(self) -> &'static str {
		match self {
			AccountKey::Noreply => "noreply",
			AccountKey::Info => "info",
			AccountKey::Hello => "hello",
		}
	}
}

impl std::fmt::Display for AccountKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Credential pair for one outbound account.
#[derive(Clone)]
pub struct EmailAccount {
	pub user: String,
	pub pass: String,
}

impl std::fmt::Debug for EmailAccount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		// never log the password
		f.debug_struct("EmailAccount").field("user", &self.user).finish_non_exhaustive()
	}
}

/// SMTP endpoint shared by all outbound accounts.
#[derive(Clone, Debug)]
pub struct SmtpConfig {
	pub host: String,
	pub port: u16,
	/// true: implicit TLS (wrapper mode), false: opportunistic STARTTLS
	pub secure: bool,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_account_key_wire_names() {
		let key: AccountKey = serde_json::from_str("\"hello\"").unwrap();
		assert_eq!(key, AccountKey::Hello);
		assert_eq!(serde_json::to_string(&AccountKey::Noreply).unwrap(), "\"noreply\"");
	}

	#[test]
	fn test_account_key_default_is_noreply() {
		assert_eq!(AccountKey::default(), AccountKey::Noreply);
	}

	#[test]
	fn test_unknown_account_key_rejected() {
		let key: Result<AccountKey, _> = serde_json::from_str("\"marketing\"");
		assert!(key.is_err());
	}

	#[test]
	fn test_debug_hides_password() {
		let account = EmailAccount { user: "noreply@ticketmill.io".into(), pass: "hunter2".into() };
		let dump = format!("{:?}", account);
		assert!(dump.contains("noreply@ticketmill.io"));
		assert!(!dump.contains("hunter2"));
	}
}

// vim: ts=4
