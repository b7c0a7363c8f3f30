use std::future::{ready, Future};
use std::pin::Pin;
use std::sync::Arc;

use http::{Request, Response, StatusCode};
use hyper::service::Service;
use tracing::{debug, error};

use crate::proxy::synthetic_response::{text_response, RespBody};
use crate::security::address_match::matches;
use crate::security::peer_addr::{fallback_host, split_host_port, RemoteAddr, SplitHostPortError};

/// Ordered allow-list entries, each a single address or a CIDR range
///
/// Entries are kept as text: an entry that parses as neither never matches.
pub type AllowList = Arc<[String]>;

/// Why a request was turned away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The peer address could not be split into host and port
    InvalidAddress { remote_addr: String },
    /// No allow-list entry covers the peer host
    NotAllowed { host: String },
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::InvalidAddress { .. } => StatusCode::BAD_REQUEST,
            Rejection::NotAllowed { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Rejection::InvalidAddress { remote_addr } => {
                format!("{remote_addr} is not a valid IP address")
            }
            Rejection::NotAllowed { host } => {
                format!("{host} is not registered in the whitelist IP")
            }
        }
    }

    pub fn into_response(self) -> Response<RespBody> {
        text_response(self.status(), self.message())
    }
}

/// Outcome of checking a peer address against the allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Reject(Rejection),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Decide whether a peer address (`host:port` or bare host) passes `allowlist`
///
/// Splitting errors other than a missing port are logged and rejected as
/// invalid. A peer without a port is matched on its host alone.
pub fn check_access(allowlist: &[String], remote_addr: &str) -> AccessDecision {
    let host = match split_host_port(remote_addr) {
        Ok((host, _port)) => host,
        Err(SplitHostPortError::MissingPort) => fallback_host(remote_addr),
        Err(e) => {
            error!(remote_addr = %remote_addr, error = %e, "Error parsing remote address");
            return AccessDecision::Reject(Rejection::InvalidAddress {
                remote_addr: remote_addr.to_string(),
            });
        }
    };

    if allowlist.iter().any(|entry| matches(entry, host)) {
        return AccessDecision::Allow;
    }

    debug!(host = %host, "Remote address not in allowlist");
    AccessDecision::Reject(Rejection::NotAllowed { host: host.to_string() })
}

/// Service wrapper that only lets allow-listed peers reach `inner`
///
/// The peer address is read from the [`RemoteAddr`] request extension; a
/// request without one is checked as if its peer address were empty and is
/// therefore rejected. Allowed requests are passed to `inner` untouched.
#[derive(Debug, Clone)]
pub struct AccessFilter<S> {
    allowlist: AllowList,
    inner: S,
}

impl<S> AccessFilter<S> {
    pub fn new(allowlist: impl Into<AllowList>, inner: S) -> Self {
        Self { allowlist: allowlist.into(), inner }
    }

    pub fn allowlist(&self) -> &[String] {
        &self.allowlist
    }

    pub fn check(&self, remote_addr: &str) -> AccessDecision {
        check_access(&self.allowlist, remote_addr)
    }
}

impl<S, B> Service<Request<B>> for AccessFilter<S>
where
    S: Service<Request<B>, Response = Response<RespBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response<RespBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let remote_addr = req
            .extensions()
            .get::<RemoteAddr>()
            .map(RemoteAddr::as_str)
            .unwrap_or_default();

        match self.check(remote_addr) {
            AccessDecision::Allow => Box::pin(self.inner.call(req)),
            AccessDecision::Reject(rejection) => Box::pin(ready(Ok(rejection.into_response()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    fn allowlist(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    /// In-memory sink for the fmt layer
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf)
                .lines()
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` under a scoped subscriber and return what it logged
    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_target(false)
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, logs.lines())
    }

    fn error_lines(lines: &[String]) -> Vec<&String> {
        lines.iter().filter(|l| l.contains("ERROR")).collect()
    }

    #[test]
    fn test_invalid_peer_logs_one_error_with_raw_address() {
        let list = allowlist(&["0.0.0.0/0"]);
        let (decision, lines) = with_captured_logs(|| check_access(&list, "2001:db8::1:80"));

        assert_eq!(
            decision,
            AccessDecision::Reject(Rejection::InvalidAddress {
                remote_addr: "2001:db8::1:80".to_string()
            })
        );
        let errors = error_lines(&lines);
        assert_eq!(errors.len(), 1, "{lines:?}");
        assert!(errors[0].contains("remote_addr=2001:db8::1:80"), "{}", errors[0]);
    }

    #[test]
    fn test_forbidden_peer_is_not_logged_as_error() {
        let list = allowlist(&["10.0.0.0/24"]);
        let (decision, lines) = with_captured_logs(|| check_access(&list, "10.0.1.5:8080"));

        assert!(!decision.is_allowed());
        assert!(error_lines(&lines).is_empty(), "{lines:?}");
        assert!(lines.iter().any(|l| l.contains("DEBUG") && l.contains("host=10.0.1.5")), "{lines:?}");
    }

    #[test]
    fn test_allowed_peer_logs_nothing() {
        let list = allowlist(&["10.0.0.0/24"]);
        let (decision, lines) = with_captured_logs(|| check_access(&list, "10.0.0.9:8080"));

        assert!(decision.is_allowed());
        assert!(lines.is_empty(), "{lines:?}");
    }

    #[test]
    fn test_ipv6_wildcard_rejects_ipv4_peer() {
        let list = allowlist(&["::/0"]);
        assert_eq!(
            check_access(&list, "10.0.0.7:8080"),
            AccessDecision::Reject(Rejection::NotAllowed { host: "10.0.0.7".to_string() })
        );
        assert!(check_access(&list, "[2001:db8::7]:443").is_allowed());
    }

    #[test]
    fn test_exact_address_allowed() {
        let list = allowlist(&["10.0.0.5"]);
        assert_eq!(check_access(&list, "10.0.0.5:51342"), AccessDecision::Allow);
    }

    #[test]
    fn test_cidr_allowed() {
        let list = allowlist(&["10.0.0.0/24"]);
        assert_eq!(check_access(&list, "10.0.0.200:8080"), AccessDecision::Allow);
    }

    #[test]
    fn test_outside_cidr_forbidden() {
        let list = allowlist(&["10.0.0.0/24"]);
        let decision = check_access(&list, "10.0.1.5:8080");
        assert_eq!(
            decision,
            AccessDecision::Reject(Rejection::NotAllowed { host: "10.0.1.5".to_string() })
        );
    }

    #[test]
    fn test_missing_port_falls_back_to_host() {
        let list = allowlist(&["10.0.0.5"]);
        assert_eq!(check_access(&list, "10.0.0.5"), AccessDecision::Allow);

        let decision = check_access(&list, "not-an-address");
        let AccessDecision::Reject(rejection) = decision else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.status(), StatusCode::FORBIDDEN);
        assert_eq!(rejection.message(), "not-an-address is not registered in the whitelist IP");
    }

    #[test]
    fn test_bracketed_ipv6_without_port() {
        let list = allowlist(&["::1"]);
        assert_eq!(check_access(&list, "[::1]"), AccessDecision::Allow);
        assert_eq!(check_access(&list, "[::1]:443"), AccessDecision::Allow);
    }

    #[test]
    fn test_bare_ipv6_is_invalid() {
        let list = allowlist(&["::1"]);
        let AccessDecision::Reject(rejection) = check_access(&list, "::1") else {
            panic!("expected rejection");
        };
        assert_eq!(rejection.status(), StatusCode::BAD_REQUEST);
        assert_eq!(rejection.message(), "::1 is not a valid IP address");
    }

    #[test]
    fn test_empty_allowlist_rejects_all() {
        for addr in ["10.0.0.5:1", "127.0.0.1:80", "[::1]:80", ""] {
            assert!(!check_access(&[], addr).is_allowed(), "{addr}");
        }
    }

    #[test]
    fn test_first_valid_entry_wins_over_malformed() {
        let list = allowlist(&["garbage", "10.0.0.0/99", "10.0.0.0/8"]);
        assert!(check_access(&list, "10.20.30.40:1").is_allowed());
    }

    #[test]
    fn test_filter_check_uses_its_allowlist() {
        let filter = AccessFilter::new(allowlist(&["192.168.1.0/24"]), ());
        assert_eq!(filter.allowlist().len(), 1);
        assert!(filter.check("192.168.1.7:9000").is_allowed());
        assert!(!filter.check("192.168.2.7:9000").is_allowed());
    }
}
