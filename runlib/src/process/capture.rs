use crate::error::ProcessError;
use crate::types::OutputBlob;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

const CHUNK_SIZE: usize = 4096;

/// What to do once a stream has produced more than its limit.
#[derive(Clone, Copy, Debug)]
pub enum Overflow {
    /// Stop reading and fail, so the caller can kill the process.
    Abort,
    /// Keep draining the pipe but drop everything past the limit.
    Truncate,
}

/// Read `stream` to end of file, chunk by chunk, as the process emits it.
pub async fn drain<R>(
    stream: Option<R>,
    limit: Option<usize>,
    overflow: Overflow,
) -> Result<OutputBlob, ProcessError>
where
    R: AsyncRead + Unpin,
{
    let mut captured = BytesMut::new();
    let mut stream = match stream {
        Some(stream) => stream,
        None => return Ok(captured.freeze()),
    };
    let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
    loop {
        buf.clear();
        if stream.read_buf(&mut buf).await? == 0 {
            break;
        }
        let chunk = buf.split();
        match limit {
            Some(limit) if captured.len() + chunk.len() > limit => match overflow {
                Overflow::Abort => return Err(ProcessError::OutputLimit { limit }),
                Overflow::Truncate => {
                    let room = limit - captured.len();
                    captured.extend_from_slice(&chunk[..room]);
                }
            },
            _ => captured.extend_from_slice(&chunk),
        }
        buf.reserve(CHUNK_SIZE);
    }
    Ok(captured.freeze())
}
