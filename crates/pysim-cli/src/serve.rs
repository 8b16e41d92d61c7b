//! Newline-delimited JSON server on stdio.
//!
//! Each input line is one request (`{"id": ..., "code": "..."}`); each output
//! line is the matching response. Requests run on blocking tasks and may
//! finish out of order, so clients correlate by `id`.

use anyhow::Result;
use pysim_eval::action::{self, ExecuteResponse};
use pysim_eval::Limits;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Serve requests from `input` until EOF, writing responses to `output`.
pub async fn serve<R, W>(input: R, mut output: W, limits: Limits) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            output.write_all(line.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut lines = BufReader::new(input).lines();
    let mut handled = 0usize;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if tx.is_closed() {
            tracing::error!("response writer stopped, no longer reading requests");
            break;
        }
        handled += 1;
        let tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            let response = action::handle_payload(&line, &limits);
            send_response(&tx, &response);
        });
    }

    // Writer exits once every in-flight request has dropped its sender.
    drop(tx);
    writer.await??;
    tracing::info!(requests = handled, "input closed, server stopping");
    Ok(())
}

/// Queue an encoded response for the writer. Returns false if it was dropped.
fn send_response(tx: &mpsc::UnboundedSender<String>, response: &ExecuteResponse) -> bool {
    let json = match serde_json::to_string(response) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("failed to encode response: {}", e);
            return false;
        }
    };
    if tx.send(json).is_err() {
        tracing::error!(id = ?response.id, "response writer stopped, response dropped");
        return false;
    }
    true
}
