use paylog_core::{LogEntry, RecorderError};

/// Fetch the capture buffer from a running listener and return it
/// newest-first. Transport failures and non-success statuses are both
/// retrieval errors; there is no retry.
pub async fn fetch_logs(port: u16) -> Result<Vec<LogEntry>, RecorderError> {
    let url = format!("http://127.0.0.1:{port}/_logs");
    let client = reqwest::Client::new();
    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| RecorderError::Retrieval(format!("cannot reach {url}: {e}")))?;

    if !resp.status().is_success() {
        return Err(RecorderError::Retrieval(format!(
            "HTTP {} from {url}",
            resp.status()
        )));
    }

    let mut entries: Vec<LogEntry> = resp
        .json()
        .await
        .map_err(|e| RecorderError::Retrieval(format!("invalid log payload: {e}")))?;
    // The listener serves oldest-first; the operator wants the most
    // recent capture at the top.
    entries.reverse();
    Ok(entries)
}

/// `paylog log`: one JSON line per captured entry, newest first. Data
/// output goes through stdout so it stays pipeable.
pub async fn print_logs(port: u16) -> Result<(), RecorderError> {
    for entry in fetch_logs(port).await? {
        println!("{}", serde_json::to_string(&entry)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use paylog_core::CaptureStore;

    async fn serve_on_ephemeral_port(router: axum::Router) -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        port
    }

    #[tokio::test]
    async fn fetch_reverses_to_newest_first() {
        let store = CaptureStore::new(10);
        for body in ["first", "second", "third"] {
            store.append(LogEntry::record("POST".into(), "/hook".into(), body.into()));
        }
        let port = serve_on_ephemeral_port(paylog_server::build_router(store)).await;

        let entries = fetch_logs(port).await.unwrap();
        let bodies: Vec<&str> = entries.iter().map(|e| e.body.as_str()).collect();
        assert_eq!(bodies, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn empty_buffer_fetches_as_empty() {
        let store = CaptureStore::new(10);
        let port = serve_on_ephemeral_port(paylog_server::build_router(store)).await;
        assert_eq!(fetch_logs(port).await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn unreachable_listener_is_a_retrieval_error() {
        // Bind then drop so the port is known-free.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = fetch_logs(port).await.unwrap_err();
        assert!(matches!(err, RecorderError::Retrieval(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn non_success_status_is_a_retrieval_error() {
        let router =
            axum::Router::new().route("/_logs", get(|| async { StatusCode::BAD_GATEWAY }));
        let port = serve_on_ephemeral_port(router).await;

        let err = fetch_logs(port).await.unwrap_err();
        assert!(matches!(err, RecorderError::Retrieval(ref msg) if msg.contains("502")));
        assert_eq!(err.exit_code(), 2);
    }
}
