use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

/// Transport-layer peer address of the connection a request arrived on
///
/// Inserted into request extensions by the server so that [`AccessFilter`]
/// can read it without knowing about the connection.
///
/// [`AccessFilter`]: crate::security::AccessFilter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

impl RemoteAddr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<SocketAddr> for RemoteAddr {
    fn from(addr: SocketAddr) -> Self {
        Self(addr.to_string())
    }
}

impl fmt::Display for RemoteAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reasons a `host:port` string cannot be split
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SplitHostPortError {
    #[error("missing port in address")]
    MissingPort,

    #[error("too many colons in address")]
    TooManyColons,

    #[error("missing ']' in address")]
    MissingBracket,

    #[error("unexpected '[' in address")]
    UnexpectedOpenBracket,

    #[error("unexpected ']' in address")]
    UnexpectedCloseBracket,
}

/// Split `host:port` or `[host]:port` into host and port
///
/// IPv6 hosts must be bracketed. The port is not validated beyond being the
/// text after the last colon.
pub fn split_host_port(addr: &str) -> Result<(&str, &str), SplitHostPortError> {
    let Some(colon) = addr.rfind(':') else {
        return Err(SplitHostPortError::MissingPort);
    };

    let (host, host_start, host_end) = if addr.starts_with('[') {
        let Some(end) = addr.find(']') else {
            return Err(SplitHostPortError::MissingBracket);
        };
        let after = end.saturating_add(1);
        if after == addr.len() {
            return Err(SplitHostPortError::MissingPort);
        }
        if after != colon {
            if addr.as_bytes().get(after) == Some(&b':') {
                return Err(SplitHostPortError::TooManyColons);
            }
            return Err(SplitHostPortError::MissingPort);
        }
        (&addr[1..end], 1, after)
    } else {
        let host = &addr[..colon];
        if host.contains(':') {
            return Err(SplitHostPortError::TooManyColons);
        }
        (host, 0, 0)
    };

    if addr[host_start..].contains('[') {
        return Err(SplitHostPortError::UnexpectedOpenBracket);
    }
    if addr[host_end..].contains(']') {
        return Err(SplitHostPortError::UnexpectedCloseBracket);
    }

    Ok((host, &addr[colon.saturating_add(1)..]))
}

/// Host part of a peer address that carries no port
///
/// A fully bracketed literal (`"[::1]"`) yields its contents, anything else
/// is cut at the first colon.
pub fn fallback_host(addr: &str) -> &str {
    if let Some(inner) = addr.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return inner;
    }
    addr.split(':').next().unwrap_or(addr)
}
