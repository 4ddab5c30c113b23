//! Directory listing page
//!
//! Lists the regular entries of the storage root and appends the upload form.

use hyper::{Response, StatusCode};
use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::html::{file_href, page};
use super::UPLOAD_PATH;
use crate::http::{self, response::build_html_response, ResponseBody};
use crate::logger;
use crate::storage::{DirEntry, FileStore};

/// Serve the listing of the storage root
pub async fn serve_listing(store: &FileStore, is_head: bool) -> Response<ResponseBody> {
    match store.list_entries(store.root()).await {
        Ok(entries) => build_html_response(StatusCode::OK, render_listing(&entries), is_head),
        Err(e) => {
            logger::log_error(&format!("Listing failed: {e}"));
            http::build_500_response("500 Internal Server Error: unable to read file list")
        }
    }
}

/// Render the listing page; directories are skipped, order is preserved
pub fn render_listing(entries: &[DirEntry]) -> String {
    let mut body = String::from("<h1>Files</h1>\n<ul>\n");

    for entry in entries.iter().filter(|e| !e.is_dir) {
        let _ = writeln!(
            body,
            "<li><a href=\"{}\">{}</a></li>",
            encode_double_quoted_attribute(&file_href(&entry.name)),
            encode_text(&entry.name)
        );
    }

    body.push_str("</ul>\n");
    let _ = writeln!(
        body,
        "<form action=\"{UPLOAD_PATH}\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" multiple>\n\
         <input type=\"submit\" value=\"Upload\">\n\
         </form>"
    );

    page("Files", &body)
}
