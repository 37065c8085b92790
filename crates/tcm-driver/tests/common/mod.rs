//! Scripted in-memory channel shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;

use tcm_driver::{Channel, DriverError, DriverResult};
use tcm_protocol::{encode_frame, Frame, FrameCodec};

/// What a read does once the scripted bytes run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenEmpty {
    /// The stream ended.
    Closed,
    /// The port timed out.
    TimedOut,
}

/// Channel that replays scripted module output and records what the host
/// wrote.
#[derive(Debug)]
pub struct MockChannel {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    when_empty: WhenEmpty,
    discards: usize,
}

impl MockChannel {
    pub fn new() -> Self {
        MockChannel {
            rx: VecDeque::new(),
            tx: Vec::new(),
            when_empty: WhenEmpty::Closed,
            discards: 0,
        }
    }

    /// Reads past the end of the script time out instead of hitting EOF.
    pub fn timing_out(mut self) -> Self {
        self.when_empty = WhenEmpty::TimedOut;
        self
    }

    /// Queue a well-formed frame from the module.
    pub fn reply(mut self, frame_id: u8, payload: &[u8]) -> Self {
        self.queue_frame(frame_id, payload);
        self
    }

    /// Queue raw bytes from the module.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.rx.extend(bytes);
        self
    }

    pub fn queue_frame(&mut self, frame_id: u8, payload: &[u8]) {
        self.rx
            .extend(encode_frame(frame_id, payload).expect("scripted frame too long"));
    }

    /// Everything the host wrote.
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// The host's writes parsed back into frames.
    pub fn sent_frames(&self) -> Vec<Frame> {
        let mut codec = FrameCodec::new();
        codec.push(&self.tx);
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode().expect("host wrote a corrupt frame") {
            frames.push(frame);
        }
        assert_eq!(codec.buffered_len(), 0, "host wrote a partial frame");
        frames
    }

    /// Scripted bytes not yet read.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Number of `discard_buffered` calls.
    pub fn discards(&self) -> usize {
        self.discards
    }
}

impl Channel for MockChannel {
    fn write_all(&mut self, data: &[u8]) -> DriverResult<()> {
        self.tx.extend_from_slice(data);
        Ok(())
    }

    fn read_exact(&mut self, len: usize) -> DriverResult<Vec<u8>> {
        if self.rx.len() < len {
            return match self.when_empty {
                WhenEmpty::Closed => {
                    let actual = self.rx.len();
                    self.rx.clear();
                    Err(DriverError::ShortRead {
                        expected: len,
                        actual,
                    })
                }
                WhenEmpty::TimedOut => Err(DriverError::Timeout),
            };
        }
        Ok(self.rx.drain(..len).collect())
    }

    fn discard_buffered(&mut self) -> DriverResult<()> {
        self.rx.clear();
        self.discards += 1;
        Ok(())
    }
}

/// Install a test log subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("tcm_driver=trace")
        .try_init();
}

/// `DataResp` payload for `(component id, value bytes)` pairs.
pub fn data_payload(components: &[(u8, &[u8])]) -> Vec<u8> {
    let mut payload = vec![components.len() as u8];
    for (id, value) in components {
        payload.push(*id);
        payload.extend_from_slice(value);
    }
    payload
}
