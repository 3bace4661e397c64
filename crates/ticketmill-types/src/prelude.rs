pub use crate::error::{Error, TmResult};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
