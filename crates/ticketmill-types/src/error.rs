//! Service-wide error type and HTTP mapping.
//!
//! Handlers return `TmResult<T>`; the `IntoResponse` impl converts every
//! error into a structured JSON body so no stack trace or internal detail
//! ever reaches a client.

use axum::{Json, http::StatusCode, response::IntoResponse};

pub type TmResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Missing or malformed client input. Raised before any side effect.
	ValidationError(String),
	/// Missing or unusable process configuration (e.g. an outbound mail
	/// account without credentials). Fatal to the operation, synchronous.
	ConfigError(String),
	/// An upstream dependency refused or failed the operation (SMTP).
	ServiceUnavailable(String),
	NotFound,
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::ValidationError(msg) => write!(f, "{}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "{}", msg),
			Error::NotFound => write!(f, "not found"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let status = match self {
			Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			Error::NotFound => StatusCode::NOT_FOUND,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};
		let body = serde_json::json!({
			"success": false,
			"error": self.to_string(),
		});
		(status, Json(body)).into_response()
	}
}


// vim: ts=4
