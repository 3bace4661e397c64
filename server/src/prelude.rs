pub use crate::app::App;
pub use ticketmill_types::error::{Error, TmResult};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
