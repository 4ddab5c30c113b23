//! Request handler module
//!
//! Responsible for request routing dispatch and the three file operations:
//! listing the storage root, downloading a file, and uploading files.

mod download;
mod html;
mod listing;
pub mod router;
mod upload;

// Re-export main entry point
pub use router::handle_request;

/// Route of the listing page
pub const LISTING_PATH: &str = "/files";

/// Route accepting multipart uploads
pub const UPLOAD_PATH: &str = "/upload";
