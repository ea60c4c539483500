use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::clock::Clock;
use crate::defaults::READ_BUFFER_CAPACITY;

/// Tracks whether the next byte of a stream begins a new line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCursor {
    at_line_start: bool,
}

impl Default for LineCursor {
    fn default() -> Self {
        Self {
            at_line_start: true,
        }
    }
}

impl LineCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// Appends `chunk` to `out`, inserting `prefix` before every line start
    /// inside the chunk.
    ///
    /// A newline in the chunk's final position is emitted as-is; the prefix
    /// for the line it opens belongs to the next chunk. Empty chunks leave
    /// both `out` and the cursor untouched.
    pub fn push(&mut self, chunk: &[u8], prefix: &[u8], out: &mut Vec<u8>) {
        let Some((&last, body)) = chunk.split_last() else {
            return;
        };

        out.reserve(chunk.len() + prefix.len());
        if self.at_line_start {
            out.extend_from_slice(prefix);
        }
        for &byte in body {
            out.push(byte);
            if byte == b'\n' {
                out.extend_from_slice(prefix);
            }
        }
        out.push(last);

        self.at_line_start = last == b'\n';
    }
}

/// Reads raw chunks from an async source and yields them with an elapsed-time
/// prefix at every line start.
///
/// The timestamp is sampled once per read, so every line start within one
/// chunk carries the same stamp.
pub struct LinePrefixer<R, C> {
    reader: R,
    clock: C,
    cursor: LineCursor,
    read_buf: Vec<u8>,
    out: Vec<u8>,
}

impl<R, C> LinePrefixer<R, C>
where
    R: AsyncRead + Unpin,
    C: Clock,
{
    pub fn new(reader: R, clock: C) -> Self {
        Self::with_capacity(reader, clock, READ_BUFFER_CAPACITY)
    }

    /// Uses a read buffer of `capacity` bytes (clamped to at least one).
    pub fn with_capacity(reader: R, clock: C, capacity: usize) -> Self {
        Self {
            reader,
            clock,
            cursor: LineCursor::new(),
            read_buf: vec![0u8; capacity.max(1)],
            out: Vec::new(),
        }
    }

    pub fn at_line_start(&self) -> bool {
        self.cursor.at_line_start()
    }

    /// Returns the next transformed chunk, or `None` once the source is
    /// exhausted. Read errors surface unchanged.
    pub async fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        let n = self.reader.read(&mut self.read_buf).await?;
        if n == 0 {
            return Ok(None);
        }

        let prefix = self.clock.stamp().to_string();
        self.out.clear();
        self.cursor
            .push(&self.read_buf[..n], prefix.as_bytes(), &mut self.out);
        Ok(Some(self.out.as_slice()))
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
