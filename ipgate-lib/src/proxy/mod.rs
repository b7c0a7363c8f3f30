pub mod connection;
pub mod forwarding;
pub mod http_result;
pub mod server;
pub mod synthetic_response;

pub use forwarding::Upstream;
pub use http_result::HttpError;
pub use server::{run, serve};
