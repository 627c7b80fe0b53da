//! Request routing for the read-only info endpoint. The socket loop lives in the firmware.

use core::fmt::Write;

pub const HTTP_HEADER_MAX: usize = 1024;
pub const RESPONSE_HEAD_MAX: usize = 160;

const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    InfoPage,
    Health,
    NotFound,
    BadRequest,
}

impl Route {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InfoPage => "info_page",
            Self::Health => "health",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
        }
    }

    pub const fn status(self) -> &'static str {
        match self {
            Self::InfoPage | Self::Health => "200 OK",
            Self::NotFound => "404 Not Found",
            Self::BadRequest => "400 Bad Request",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::InfoPage => CONTENT_TYPE_HTML,
            _ => CONTENT_TYPE_TEXT,
        }
    }

    /// Fixed body for routes that do not render a page.
    pub const fn static_body(self) -> &'static str {
        match self {
            Self::InfoPage => "",
            Self::Health => "ok",
            Self::NotFound => "not found",
            Self::BadRequest => "bad request",
        }
    }
}

/// Routes a request from its header block (request line first).
pub fn route(header: &str) -> Route {
    let Some((method, target)) = parse_request_line(header) else {
        return Route::BadRequest;
    };
    match (method, target_path(target)) {
        ("GET", "/") => Route::InfoPage,
        ("GET", "/health") => Route::Health,
        _ => Route::NotFound,
    }
}

pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

pub fn parse_request_line(header: &str) -> Option<(&str, &str)> {
    let first_line = header.lines().next()?;
    let mut parts = first_line.split_ascii_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let version = parts.next()?;
    if !version.starts_with("HTTP/") || !target.starts_with('/') {
        return None;
    }
    Some((method, target))
}

pub fn target_path(target: &str) -> &str {
    target.split('?').next().unwrap_or(target)
}

pub fn response_head(route: Route, content_length: usize) -> heapless::String<RESPONSE_HEAD_MAX> {
    let mut out = heapless::String::new();
    let _ = write!(
        &mut out,
        "HTTP/1.0 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status(),
        route.content_type(),
        content_length
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_known_paths() {
        assert_eq!(route("GET / HTTP/1.1\r\nHost: x\r\n"), Route::InfoPage);
        assert_eq!(route("GET /?refresh=1 HTTP/1.0"), Route::InfoPage);
        assert_eq!(route("GET /health HTTP/1.1"), Route::Health);
    }

    #[test]
    fn unknown_paths_and_methods_are_not_found() {
        assert_eq!(route("GET /admin HTTP/1.1"), Route::NotFound);
        assert_eq!(route("POST / HTTP/1.1"), Route::NotFound);
    }

    #[test]
    fn malformed_request_line_is_bad_request() {
        assert_eq!(route(""), Route::BadRequest);
        assert_eq!(route("GET /"), Route::BadRequest);
        assert_eq!(route("GET index HTTP/1.1"), Route::BadRequest);
        assert_eq!(route("GET / FTP/1.0"), Route::BadRequest);
    }

    #[test]
    fn header_end_is_found_after_blank_line() {
        assert_eq!(find_header_end(b"GET / HTTP/1.0\r\n\r\nbody"), Some(14));
        assert_eq!(find_header_end(b"GET / HTTP/1.0\r\n"), None);
    }

    #[test]
    fn response_head_closes_connection() {
        let head = response_head(Route::Health, 2);
        assert_eq!(
            head.as_str(),
            "HTTP/1.0 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: 2\r\nConnection: close\r\n\r\n"
        );
        assert!(response_head(Route::InfoPage, 1_500)
            .as_str()
            .contains("text/html"));
    }
}
