pub mod access_filter;
pub mod address_match;
pub mod peer_addr;

pub use access_filter::{check_access, AccessDecision, AccessFilter, AllowList, Rejection};
pub use address_match::matches;
pub use peer_addr::{fallback_host, split_host_port, RemoteAddr, SplitHostPortError};
