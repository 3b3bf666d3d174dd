//! One-shot body stream handed to the transport

use bytes::Bytes;
use std::fmt;
use std::io::Cursor;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Forward-only body of a full response
///
/// The stream is consumed exactly once; it is neither replayable nor
/// cancelled from this side.
pub struct BodyStream {
    reader: Pin<Box<dyn AsyncRead + Send>>,
    length: Option<u64>,
}

impl BodyStream {
    /// Wrap a reader whose length may or may not be known
    pub fn new<R>(reader: R, length: Option<u64>) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        BodyStream {
            reader: Box::pin(reader),
            length,
        }
    }

    /// Body backed by an in-memory buffer
    pub fn from_bytes(data: Bytes) -> Self {
        let length = data.len() as u64;
        BodyStream::new(Cursor::new(data), Some(length))
    }

    /// Byte count reported when the stream was opened
    pub fn len(&self) -> Option<u64> {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == Some(0)
    }

    /// Hand the underlying reader to the transport
    pub fn into_reader(self) -> Pin<Box<dyn AsyncRead + Send>> {
        self.reader
    }

    /// Drain the stream into memory
    pub async fn into_bytes(mut self) -> std::io::Result<Bytes> {
        let capacity = self.length.unwrap_or(0) as usize;
        let mut buffer = Vec::with_capacity(capacity);
        self.reader.read_to_end(&mut buffer).await?;
        Ok(Bytes::from(buffer))
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
