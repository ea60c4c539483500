use std::{fmt, io};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::clock::Clock;
use crate::prefix::LinePrefixer;

/// Which child stream a pump is draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// Drains `prefixer` into `sink`, flushing after every chunk.
///
/// Stops at end of stream or at the first read/write error. The prefixer is
/// consumed so its source is dropped on every exit path. Returns the number of
/// bytes written to `sink`.
pub async fn pump<R, C, W>(
    mut prefixer: LinePrefixer<R, C>,
    mut sink: W,
    kind: StreamKind,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    C: Clock,
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = prefixer.next_chunk().await? {
        if chunk.is_empty() {
            continue;
        }
        sink.write_all(chunk).await?;
        sink.flush().await?;
        written += chunk.len() as u64;
    }
    debug!(stream = %kind, bytes = written, "stream drained");
    Ok(written)
}
