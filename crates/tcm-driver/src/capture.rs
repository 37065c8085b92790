//! Decoding recorded module output.
//!
//! A capture is whatever bytes were sniffed off the module's TX line, for
//! example interval-mode data saved to a file. It has no request/response
//! structure and may start or end in the middle of a frame, so it is decoded
//! with [`FrameCodec`] rather than the exact-length reads [`crate::Tcm`] uses.

use std::io::{ErrorKind, Read};

use tcm_protocol::{FrameCodec, Response};
use tracing::{trace, warn};

use crate::error::{DriverError, DriverResult};

const READ_CHUNK: usize = 256;

/// Iterator over the responses found in a byte stream.
///
/// Corrupt frames, garbage and undecodable payloads are yielded as errors
/// and decoding carries on behind them. The iterator ends when the source
/// reaches end-of-file or fails.
#[derive(Debug)]
pub struct CaptureReader<R> {
    source: R,
    codec: FrameCodec,
    finished: bool,
}

impl<R: Read> CaptureReader<R> {
    pub fn new(source: R) -> Self {
        CaptureReader {
            source,
            codec: FrameCodec::new(),
            finished: false,
        }
    }

    /// Bytes read from the source but not yet decoded.
    pub fn buffered_len(&self) -> usize {
        self.codec.buffered_len()
    }

    fn fill(&mut self) -> DriverResult<()> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.source.read(&mut chunk) {
                Ok(0) => {
                    self.finished = true;
                    return Ok(());
                }
                Ok(n) => {
                    trace!("CaptureReader: read {} bytes", n);
                    self.codec.push(&chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Err(DriverError::Io(e));
                }
            }
        }
    }
}

impl<R: Read> Iterator for CaptureReader<R> {
    type Item = DriverResult<Response>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.codec.decode() {
                Ok(Some(frame)) => return Some(Response::decode(&frame).map_err(Into::into)),
                Ok(None) => {}
                Err(e) => return Some(Err(e.into())),
            }

            if self.finished {
                if self.codec.buffered_len() > 0 {
                    warn!(
                        "CaptureReader: {} trailing bytes do not form a frame",
                        self.codec.buffered_len()
                    );
                    self.codec.clear();
                }
                return None;
            }

            if let Err(e) = self.fill() {
                return Some(Err(e));
            }
        }
    }
}
