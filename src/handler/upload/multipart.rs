//! Multipart form decoding for uploads
//!
//! The body is decoded as a stream with a whole-request size ceiling. Every
//! part carrying a `filename` parameter is collected as an [`UploadPart`],
//! whatever its field name; plain form values are skipped.

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::Request;
use multer::{Constraints, Multipart, SizeLimit};

/// One file attached to an upload request
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// Position of the part in the request, from zero
    pub index: usize,
    pub field_name: String,
    /// File name as declared by the client, unsanitized
    pub file_name: String,
    pub data: Bytes,
}

/// Request-level upload failures; all of them map to 400
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("missing or unreadable Content-Type header")]
    MissingContentType,
    #[error("not a multipart form: {0}")]
    Boundary(#[source] multer::Error),
    #[error("upload exceeds the {0} byte limit")]
    TooLarge(u64),
    #[error("malformed multipart body: {0}")]
    Malformed(#[source] multer::Error),
}

impl From<multer::Error> for UploadError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamSizeExceeded { limit } => Self::TooLarge(limit),
            other => Self::Malformed(other),
        }
    }
}

/// Decode every file part of a multipart request into memory
pub async fn read_parts<B>(req: Request<B>, max_size: u64) -> Result<Vec<UploadPart>, UploadError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or(UploadError::MissingContentType)?;
    let boundary = multer::parse_boundary(content_type).map_err(UploadError::Boundary)?;

    let constraints = Constraints::new().size_limit(SizeLimit::new().whole_stream(max_size));
    let mut multipart =
        Multipart::with_constraints(req.into_body().into_data_stream(), boundary, constraints);

    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let field_name = field.name().unwrap_or_default().to_string();
        let data = field.bytes().await?;

        parts.push(UploadPart {
            index: parts.len(),
            field_name,
            file_name,
            data,
        });
    }

    Ok(parts)
}
