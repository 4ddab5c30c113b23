//! File download responder
//!
//! Resolves the request path under the storage root and streams the file
//! back as an attachment.

use futures_util::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::Response;
use percent_encoding::percent_decode_str;
use tokio_util::io::ReaderStream;

use crate::http::{self, mime, response, ResponseBody};
use crate::logger;
use crate::storage::FileStore;

/// Serve `request_path` (as seen in the URI) from the storage root
pub async fn serve_download(
    store: &FileStore,
    request_path: &str,
    is_head: bool,
) -> Response<ResponseBody> {
    let raw = request_path.strip_prefix('/').unwrap_or(request_path);
    let Ok(name) = percent_decode_str(raw).decode_utf8() else {
        return http::build_400_response("400 Bad Request: file name is not valid UTF-8");
    };

    let path = match store.resolve(&name) {
        Ok(path) => path,
        Err(e) => {
            logger::log_warning(&format!("Rejected download '{request_path}': {e}"));
            return http::build_400_response("400 Bad Request: path outside the file directory");
        }
    };

    if !store.exists(&path).await {
        return http::build_404_response();
    }

    let file = match store.open_file(&path).await {
        Ok(file) => file,
        Err(e) => {
            logger::log_error(&format!("Download failed: {e}"));
            return http::build_500_response("500 Internal Server Error: unable to read file");
        }
    };

    let metadata = match file.metadata().await {
        Ok(metadata) => metadata,
        Err(e) => {
            logger::log_error(&format!(
                "Download failed to stat '{}': {e}",
                path.display()
            ));
            return http::build_500_response("500 Internal Server Error: unable to read file");
        }
    };

    // Only regular files are downloadable
    if metadata.is_dir() {
        return http::build_404_response();
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let body = if is_head {
        response::empty()
    } else {
        StreamBody::new(ReaderStream::new(file).map_ok(Frame::data)).boxed_unsync()
    };

    response::build_attachment_response(
        body,
        &file_name,
        mime::content_type_for(&path),
        metadata.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
    use hyper::StatusCode;

    async fn body_bytes(resp: Response<ResponseBody>) -> Vec<u8> {
        resp.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    fn store_with(dir: &tempfile::TempDir, files: &[(&str, &[u8])]) -> FileStore {
        for (name, data) in files {
            std::fs::write(dir.path().join(name), data).unwrap();
        }
        FileStore::new(dir.path().to_path_buf())
    }

    #[tokio::test]
    async fn test_existing_file_is_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[("a.txt", b"hello")]);

        let resp = serve_download(&store, "/a.txt", false).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()["Content-Disposition"],
            "attachment; filename=\"a.txt\""
        );
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "5");
        assert_eq!(body_bytes(resp).await, b"hello");
    }

    #[tokio::test]
    async fn test_percent_encoded_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[("my notes.md", b"# notes")]);

        let resp = serve_download(&store, "/my%20notes.md", false).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()["Content-Disposition"],
            "attachment; filename=\"my notes.md\""
        );
        assert_eq!(body_bytes(resp).await, b"# notes");
    }

    #[tokio::test]
    async fn test_head_sends_headers_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[("big.bin", &[7u8; 4096])]);

        let resp = serve_download(&store, "/big.bin", true).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "4096");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[]);

        let resp = serve_download(&store, "/nope.txt", false).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_directory_is_404() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let store = store_with(&dir, &[]);

        let resp = serve_download(&store, "/sub", false).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_escaping_path_is_400() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"secret").unwrap();
        std::fs::create_dir(outer.path().join("files")).unwrap();
        let store = FileStore::new(outer.path().join("files"));

        for path in ["/../secret.txt", "/..%2Fsecret.txt", "/%2E%2E/secret.txt"] {
            let resp = serve_download(&store, path, false).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "path {path}");
        }
    }
}
