//! The dedicated reader task: blocking I/O on the SSE body, forwarding
//! tagged [`RawEvent`]s to the consumer over a bounded channel (§4.6, §5).

use crate::types::RawEvent;
use futures::StreamExt;
use reqwest::Response;
use tokio::sync::mpsc::Sender;

const DONE_SENTINEL: &str = "[DONE]";

/// Read `response`'s body as SSE, forwarding one [`RawEvent`] per `data: `
/// line plus a terminal `Done`/`Eof`/`Error`.
///
/// Line buffering follows the donor workspace's NDJSON/SSE reader idiom:
/// push each chunk into a `String` buffer, split complete lines on `\n`,
/// `drain` them off the front, and carry any trailing partial line over to
/// the next chunk.
pub(crate) async fn run(response: Response, tx: Sender<RawEvent>) {
    let mut stream = response.bytes_stream();
    let mut line_buf = String::new();

    loop {
        let chunk = match stream.next().await {
            Some(Ok(bytes)) => bytes,
            Some(Err(e)) => {
                let _ = tx.send(RawEvent::Error(format!("stream read error: {e}"))).await;
                return;
            }
            None => break,
        };

        let text = match std::str::from_utf8(&chunk) {
            Ok(s) => s,
            Err(e) => {
                let _ = tx
                    .send(RawEvent::Error(format!("UTF-8 decode error: {e}")))
                    .await;
                return;
            }
        };
        line_buf.push_str(text);

        while let Some(pos) = line_buf.find('\n') {
            let line = line_buf[..pos].trim_end_matches('\r').to_string();
            line_buf.drain(..=pos);
            if let Some(event) = dispatch_line(&line) {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        }
    }

    if let Some(event) = dispatch_line(line_buf.trim_end()) {
        let _ = tx.send(event).await;
    }
    let _ = tx.send(RawEvent::Eof).await;
}

/// Map one already-newline-split SSE line to a [`RawEvent`], or `None` for
/// blank lines, comments, and lines with no recognized prefix.
fn dispatch_line(line: &str) -> Option<RawEvent> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let data = line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:"))?;
    let data = data.trim();
    if data == DONE_SENTINEL {
        Some(RawEvent::Done)
    } else if data.is_empty() {
        None
    } else {
        Some(RawEvent::Data(data.to_string()))
    }
}
