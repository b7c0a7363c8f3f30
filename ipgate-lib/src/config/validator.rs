use http::uri::Authority;
use tracing::warn;

use crate::config::types::Config;
use crate::error::{GateError, Result};
use crate::security::address_match::is_valid_entry;

/// Reject configurations the gate cannot run with
pub fn validate(config: &Config) -> Result<()> {
    let upstream = config.upstream.trim();
    if upstream.is_empty() {
        return Err(GateError::Config("upstream address cannot be empty".into()));
    }
    if upstream.parse::<Authority>().is_err() {
        return Err(GateError::Config(format!(
            "upstream must be a host:port authority, got '{}'",
            config.upstream
        )));
    }
    if config.timeout.connect_ms == 0 {
        return Err(GateError::Config("connect_ms must be > 0".into()));
    }
    Ok(())
}

/// Allow-list entries that parse as neither an address nor a range
pub fn inert_entries(allowlist: &[String]) -> impl Iterator<Item = &str> {
    allowlist
        .iter()
        .map(String::as_str)
        .filter(|entry| !is_valid_entry(entry))
}

/// Log allow-list entries that can never match, and an empty allow-list
///
/// Neither is fatal: the gate fails closed.
pub fn warn_allowlist_issues(allowlist: &[String]) {
    for entry in inert_entries(allowlist) {
        warn!(entry = %entry, "Allowlist entry is neither an IP address nor a CIDR range, it will never match");
    }
    if allowlist.is_empty() {
        warn!("Allowlist is empty, every request will be rejected");
    }
}
