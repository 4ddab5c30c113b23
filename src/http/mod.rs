//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! file handlers: status responses, body helpers and MIME detection.

pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_400_response, build_404_response, build_405_response, build_500_response,
    build_redirect_response, ResponseBody,
};
