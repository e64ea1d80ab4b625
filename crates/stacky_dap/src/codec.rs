//! DAP base-protocol framing: `Content-Length: N\r\n\r\n<json>`.

use stacky_constant::defaults::DAP_MAX_MESSAGE_BYTES as MAX_MESSAGE_BYTES;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{DapError, Result};
use crate::protocol::ProtocolMessage;

const CONTENT_LENGTH: &str = "content-length";

/// Read one framed message. Returns `Ok(None)` on a clean end of stream.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<ProtocolMessage>>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;

    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            if saw_header {
                return Err(DapError::Protocol(
                    "Stream ended inside message header".to_string(),
                ));
            }
            return Ok(None);
        }

        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            if saw_header {
                break;
            }
            // Stray blank line between messages.
            continue;
        }
        saw_header = true;

        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) {
                let len = value.trim().parse::<usize>().map_err(|e| {
                    DapError::Protocol(format!("Invalid Content-Length '{}': {}", value.trim(), e))
                })?;
                content_length = Some(len);
            }
        }
    }

    let len = content_length
        .ok_or_else(|| DapError::Protocol("Missing Content-Length header".to_string()))?;
    if len > MAX_MESSAGE_BYTES {
        return Err(DapError::Protocol(format!(
            "Content-Length {} exceeds limit of {} bytes",
            len, MAX_MESSAGE_BYTES
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;

    let message = serde_json::from_slice(&body)?;
    Ok(Some(message))
}

/// Frame and write one message, flushing afterwards.
pub async fn write_message<W>(writer: &mut W, message: &ProtocolMessage) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(message)?;
    let header = format!("Content-Length: {}\r\n\r\n", json.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
