//! Upload coordinator
//!
//! Decodes a multipart upload, writes every attached file concurrently (one
//! task per file), waits for all of them and then answers once:
//!
//! - every file stored (or none attached): redirect to the listing
//! - some stored, some failed: `207 Multi-Status` with a per-file summary
//! - nothing stored: the status of the most severe failure, with the summary
//!
//! Write tasks never touch the response. Each one reports its
//! [`UploadOutcome`] over a channel and the coordinator alone decides the
//! reply after the barrier. A failing file does not cancel its siblings.

mod multipart;
mod outcome;

use multipart::{read_parts, UploadPart};
use outcome::{FailureKind, PartResult, UploadOutcome, UploadReport};

use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, ACCEPT};
use hyper::{Method, Request, Response};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::LISTING_PATH;
use crate::config::{AppState, CollisionPolicy};
use crate::http::{self, response, ResponseBody};
use crate::logger;
use crate::storage::{FileStore, StorageError};

/// Handle a request to the upload route
pub async fn handle_upload<B>(req: Request<B>, state: &AppState) -> Response<ResponseBody>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.method() != Method::POST {
        logger::log_warning(&format!("Method not allowed on upload: {}", req.method()));
        return http::build_405_response("POST");
    }

    let wants_json = accepts_json(req.headers());

    let parts = match read_parts(req, state.config.storage.max_upload_size).await {
        Ok(parts) => parts,
        Err(e) => {
            logger::log_warning(&format!("Rejected upload: {e}"));
            return http::build_400_response(&format!("400 Bad Request: {e}"));
        }
    };

    let report = store_parts(
        Arc::clone(&state.store),
        parts,
        state.config.storage.collision_policy,
    )
    .await;

    match report.failure_status() {
        None => http::build_redirect_response(LISTING_PATH),
        Some(status) if wants_json => response::build_json_response(status, report.to_json()),
        Some(status) => response::build_html_response(status, report.to_html(), false),
    }
}

/// Write every part concurrently and collect one outcome per part
pub async fn store_parts(
    store: Arc<FileStore>,
    parts: Vec<UploadPart>,
    policy: CollisionPolicy,
) -> UploadReport {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut tasks = JoinSet::new();
    let mut pending = BTreeMap::new();

    for part in parts {
        pending.insert(part.index, (part.field_name.clone(), part.file_name.clone()));

        let store = Arc::clone(&store);
        let tx = tx.clone();
        tasks.spawn(async move {
            let outcome = store_part(&store, part, policy).await;
            // The receiver lives until every task has been joined
            let _ = tx.send(outcome);
        });
    }
    drop(tx);

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            logger::log_error(&format!("Upload task did not complete: {e}"));
        }
    }

    let mut outcomes = Vec::with_capacity(pending.len());
    while let Some(outcome) = rx.recv().await {
        pending.remove(&outcome.index);
        outcomes.push(outcome);
    }

    // Tasks that panicked never reported
    for (index, (field_name, file_name)) in pending {
        outcomes.push(UploadOutcome {
            index,
            field_name,
            file_name,
            result: PartResult::failed(FailureKind::ServerError, "unable to save file"),
        });
    }

    UploadReport::new(outcomes)
}

/// Store one part and describe the result
async fn store_part(store: &FileStore, part: UploadPart, policy: CollisionPolicy) -> UploadOutcome {
    let UploadPart {
        index,
        field_name,
        file_name,
        data,
    } = part;

    let result = write_part(store, &file_name, data, policy).await;
    match &result {
        PartResult::Saved { bytes } => logger::log_upload_saved(&file_name, *bytes),
        PartResult::Failed { kind, reason } => {
            logger::log_upload_failed(&file_name, kind.status().as_u16(), reason);
        }
    }

    UploadOutcome {
        index,
        field_name,
        file_name,
        result,
    }
}

async fn write_part(
    store: &FileStore,
    file_name: &str,
    data: Bytes,
    policy: CollisionPolicy,
) -> PartResult {
    if file_name.is_empty() {
        return PartResult::failed(FailureKind::BadRequest, "no file selected");
    }

    let path = match store.resolve(file_name) {
        Ok(path) if path != store.root() => path,
        Ok(_) => {
            return PartResult::failed(FailureKind::BadRequest, "file name does not name a file")
        }
        Err(e) => {
            logger::log_warning(&format!("Rejected upload name: {e}"));
            return PartResult::failed(
                FailureKind::BadRequest,
                "file name points outside the file directory",
            );
        }
    };

    match store.save(&path, data, policy).await {
        Ok(bytes) => PartResult::Saved { bytes },
        Err(StorageError::AlreadyExists(_)) => {
            PartResult::failed(FailureKind::Conflict, "a file with this name already exists")
        }
        Err(e) => {
            logger::log_error(&e.to_string());
            PartResult::failed(FailureKind::ServerError, "unable to save file")
        }
    }
}

/// Whether the client asked for a machine-readable summary
fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("application/json"))
}
