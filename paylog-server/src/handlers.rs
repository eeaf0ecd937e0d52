use axum::extract::{Request, State};
use axum::response::Json;
use paylog_core::{CaptureStore, LogEntry};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// `GET /_logs` — current buffer contents, oldest first. Read-only.
pub async fn get_logs(State(store): State<CaptureStore>) -> Json<Vec<LogEntry>> {
    Json(store.snapshot())
}

/// Every other request is a capture request: drain the body to
/// completion, store it, acknowledge. Capture never fails a request —
/// any bytes are accepted and kept as lossily decoded text, no size or
/// content-type checks.
pub async fn capture(State(store): State<CaptureStore>, request: Request) -> Json<Value> {
    let method = request.method().to_string();
    let url = request.uri().to_string();

    match axum::body::to_bytes(request.into_body(), usize::MAX).await {
        Ok(bytes) => {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            debug!(method = %method, url = %url, bytes = bytes.len(), "Request captured");
            store.append(LogEntry::record(method, url, body));
        }
        // An entry exists only once its body fully arrived; a client
        // that goes away mid-body records nothing.
        Err(e) => {
            warn!(error = %e, method = %method, url = %url, "Body read failed, request not recorded");
        }
    }

    Json(json!({ "ok": true }))
}
