mod loader;
mod types;
mod validator;

pub use loader::{load_from_path, parse_config};
pub use types::{Config, LoggingConfig, TimeoutConfig};
pub use validator::{inert_entries, validate, warn_allowlist_issues};
