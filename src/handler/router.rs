//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! validation and dispatching to the listing, upload and download handlers.

use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

use super::{download, listing, upload, LISTING_PATH, UPLOAD_PATH};
use crate::config::AppState;
use crate::http::{self, ResponseBody};
use crate::logger;

/// Methods accepted by the read-only routes
const READ_METHODS: &str = "GET, HEAD";

/// Main entry point for HTTP request handling
///
/// - `/` redirects to the listing
/// - `/files` renders the listing
/// - `/upload` accepts multipart uploads
/// - anything else is a download of that path under the storage root
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path().to_owned();
    let is_read = matches!(*req.method(), Method::GET | Method::HEAD);
    let is_head = *req.method() == Method::HEAD;

    logger::log_debug(&format!("{} {}", req.method(), req.uri()));

    let response = match path.as_str() {
        "/" => http::build_redirect_response(LISTING_PATH),
        LISTING_PATH if is_read => listing::serve_listing(&state.store, is_head).await,
        UPLOAD_PATH => upload::handle_upload(req, &state).await,
        _ if is_read => download::serve_download(&state.store, &path, is_head).await,
        _ => {
            logger::log_warning(&format!("Method not allowed: {} {path}", req.method()));
            http::build_405_response(READ_METHODS)
        }
    };

    Ok(response)
}
