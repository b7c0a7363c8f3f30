use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::{combinators::BoxBody, BodyExt, Empty, Full};
use hyper::Response;

/// Body type of every response the gate produces or relays
pub type RespBody = BoxBody<Bytes, hyper::Error>;

/// Build an empty-bodied response, used for 4xx and 5xx statuses
pub fn synthetic_error_response(status_code: StatusCode) -> Response<RespBody> {
    let mut resp = Response::new(empty_body());
    *resp.status_mut() = status_code;
    resp
}

/// Build a `text/plain` response carrying `message`
pub fn text_response(status_code: StatusCode, message: impl Into<Bytes>) -> Response<RespBody> {
    let body = Full::new(message.into())
        .map_err(|never| match never {})
        .boxed();
    let mut resp = Response::new(body);
    *resp.status_mut() = status_code;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    resp
}

fn empty_body() -> RespBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}
