#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod proxy;
pub mod security;
pub mod telemetry;

pub use config::{load_from_path, Config};
pub use error::{GateError, Result};
pub use proxy::{run, serve, Upstream};
pub use security::{matches, AccessDecision, AccessFilter, AllowList, RemoteAddr, Rejection};
