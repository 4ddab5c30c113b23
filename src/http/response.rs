//! HTTP response building module
//!
//! Provides builders for the status code responses the file server emits,
//! decoupled from specific business logic.

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use hyper::{Response, StatusCode};

/// Body type of every response: either buffered or streamed from disk
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Wrap buffered bytes as a response body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Empty response body
pub fn empty() -> ResponseBody {
    full(Bytes::new())
}

/// Build a plain-text response with the given status
pub fn build_text_response(status: StatusCode, message: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, message.len())
        .body(full(message.to_owned()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full(message.to_owned()))
        })
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str) -> Response<ResponseBody> {
    build_text_response(StatusCode::BAD_REQUEST, message)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found: no such file")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(ALLOW, allow)
        .body(full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full("405 Method Not Allowed"))
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response(message: &str) -> Response<ResponseBody> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Build 302 redirect response
pub fn build_redirect_response(target: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(LOCATION, target)
        .header(CONTENT_TYPE, "text/plain")
        .body(full("Redirecting..."))
        .unwrap_or_else(|e| {
            log_build_error("302", &e);
            Response::new(full("Redirecting..."))
        })
}

/// Build generic HTML response
pub fn build_html_response(
    status: StatusCode,
    content: String,
    is_head: bool,
) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head { empty() } else { full(content) };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(empty())
        })
}

/// Build JSON response
pub fn build_json_response(status: StatusCode, content: String) -> Response<ResponseBody> {
    let content_length = content.len();

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(CONTENT_LENGTH, content_length)
        .body(full(content))
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            Response::new(empty())
        })
}

/// Build a download response that asks the client to save the body
pub fn build_attachment_response(
    body: ResponseBody,
    file_name: &str,
    content_type: &str,
    content_length: u64,
) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(
            "Content-Disposition",
            format!(
                "attachment; filename=\"{}\"",
                escape_quoted_string(file_name)
            ),
        )
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(empty())
        })
}

/// Escape `"` and `\` for use inside a quoted header parameter
fn escape_quoted_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(resp: Response<ResponseBody>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_redirect() {
        let resp = build_redirect_response("/files");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[LOCATION], "/files");
    }

    #[tokio::test]
    async fn test_405_carries_allow() {
        let resp = build_405_response("POST");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "POST");
    }

    #[tokio::test]
    async fn test_head_html_has_length_but_no_body() {
        let resp = build_html_response(StatusCode::OK, "<p>hi</p>".to_string(), true);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "9");
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_attachment_header_is_quoted() {
        let resp = build_attachment_response(full("x"), "we\"ird.txt", "text/plain", 1);
        assert_eq!(
            resp.headers()["Content-Disposition"],
            "attachment; filename=\"we\\\"ird.txt\""
        );
        assert_eq!(body_string(resp).await, "x");
    }
}
