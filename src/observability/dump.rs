//! Wire dumps of requests and responses for trace logging.

use http::HeaderMap;
use std::borrow::Cow;
use std::fmt::Write;

use crate::transport::{HttpRequest, HttpResponse};

/// Target of the request/response dump events.
pub const TRACE_TARGET: &str = "infosight_client::trace";

const CONTINUATION_INDENT: &str = "\n                            ";

fn write_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let value = if value.is_sensitive() {
            Cow::Borrowed("[REDACTED]")
        } else {
            String::from_utf8_lossy(value.as_bytes())
        };
        let _ = write!(out, "{}: {}\r\n", name, value);
    }
}

fn write_body(out: &mut String, body: &[u8]) {
    out.push_str("\r\n");
    out.push_str(&String::from_utf8_lossy(body));
}

/// Renders a request the way it goes out on the wire.
pub fn dump_request(request: &HttpRequest) -> String {
    let mut out = String::new();

    match url::Url::parse(&request.url) {
        Ok(url) => {
            let target = match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            };
            let _ = write!(out, "{} {} HTTP/1.1\r\n", request.method.as_str(), target);
            if let Some(host) = url.host_str() {
                match url.port() {
                    Some(port) => {
                        let _ = write!(out, "Host: {}:{}\r\n", host, port);
                    }
                    None => {
                        let _ = write!(out, "Host: {}\r\n", host);
                    }
                }
            }
        }
        Err(_) => {
            let _ = write!(out, "{} {} HTTP/1.1\r\n", request.method.as_str(), request.url);
        }
    }

    write_headers(&mut out, &request.headers);
    write_body(&mut out, request.body.as_deref().unwrap_or_default());
    out
}

/// Renders a response the way it came in on the wire.
pub fn dump_response(response: &HttpResponse) -> String {
    let mut out = String::new();
    let _ = write!(out, "HTTP/1.1 {}\r\n", response.status_line());
    write_headers(&mut out, &response.headers);
    write_body(&mut out, &response.body);
    out
}

fn indent(dump: &str) -> String {
    dump.trim_end_matches(['\r', '\n'])
        .replace("\r\n", "\n")
        .replace('\n', CONTINUATION_INDENT)
}

/// Emits a request and, if there is one, its response as a single trace
/// event on [`TRACE_TARGET`].
pub fn trace_exchange(request: &HttpRequest, response: Option<&HttpResponse>) {
    let request_dump = indent(&dump_request(request));
    let response_dump = response
        .map(|r| indent(&dump_response(r)))
        .unwrap_or_default();

    tracing::trace!(
        target: TRACE_TARGET,
        "{}\n\n                            {}\n",
        request_dump,
        response_dump
    );
}
