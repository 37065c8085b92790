//! Frame encoding/decoding utilities.
//!
//! Every TCM message travels in a frame with a big-endian length prefix and a
//! trailing CRC-16. The length counts the whole frame, itself included.
//!
//! ```text
//! +--------+--------+----------+-------------------+--------+--------+
//! | len_hi | len_lo | frame_id | payload[0..n]     | crc_hi | crc_lo |
//! +--------+--------+----------+-------------------+--------+--------+
//!   len = n + 5, crc covers len, frame_id and payload
//! ```

use bytes::{Buf, BufMut, BytesMut};
use log::trace;

use crate::checksum::checksum;
use crate::constants::{FRAME_OVERHEAD, MAX_FRAME_SIZE};
use crate::error::ProtocolError;

/// A verified frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame identifier.
    pub frame_id: u8,
    /// Payload bytes, without framing.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a frame.
    pub fn new(frame_id: u8, payload: impl Into<Vec<u8>>) -> Self {
        Frame {
            frame_id,
            payload: payload.into(),
        }
    }

    /// Value of the length field for this frame.
    pub fn length(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    /// Encode this frame for transmission.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode_frame(self.frame_id, &self.payload)
    }

    /// Rebuild a frame from its received fields and verify the CRC.
    pub fn from_parts(
        length: u16,
        frame_id: u8,
        payload: Vec<u8>,
        crc: u16,
    ) -> Result<Self, ProtocolError> {
        let expected = frame_crc(length, frame_id, &payload);
        if expected != crc {
            return Err(ProtocolError::ChecksumMismatch {
                expected,
                actual: crc,
            });
        }

        Ok(Frame { frame_id, payload })
    }

    /// Decode exactly one frame occupying the whole of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < FRAME_OVERHEAD {
            return Err(ProtocolError::too_short(FRAME_OVERHEAD, data.len()));
        }

        let length = u16::from_be_bytes([data[0], data[1]]);
        let payload_len = payload_len(length)?;
        if data.len() < length as usize {
            return Err(ProtocolError::too_short(length as usize, data.len()));
        }
        if data.len() > length as usize {
            return Err(ProtocolError::invalid_argument(format!(
                "frame length field says {} bytes, buffer holds {}",
                length,
                data.len()
            )));
        }

        let payload = data[3..3 + payload_len].to_vec();
        let crc = u16::from_be_bytes([data[3 + payload_len], data[4 + payload_len]]);
        Frame::from_parts(length, data[2], payload, crc)
    }
}

/// Encode a frame: length + frame id + payload + CRC.
///
/// Fails with [`ProtocolError::FrameTooLong`] when the frame would not fit in
/// [`MAX_FRAME_SIZE`], the same bound the decoders enforce.
pub fn encode_frame(frame_id: u8, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let total = payload.len() + FRAME_OVERHEAD;
    if total > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLong {
            max: MAX_FRAME_SIZE,
            actual: total,
        });
    }

    let mut buf = Vec::with_capacity(total);
    buf.put_u16(total as u16);
    buf.put_u8(frame_id);
    buf.extend_from_slice(payload);
    let crc = checksum(&buf);
    buf.put_u16(crc);
    Ok(buf)
}

/// Number of payload bytes announced by a length field.
///
/// Rejects lengths that cannot hold the framing itself or exceed
/// [`MAX_FRAME_SIZE`].
pub fn payload_len(length: u16) -> Result<usize, ProtocolError> {
    let length = length as usize;
    if length < FRAME_OVERHEAD {
        return Err(ProtocolError::too_short(FRAME_OVERHEAD, length));
    }
    if length > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLong {
            max: MAX_FRAME_SIZE,
            actual: length,
        });
    }
    Ok(length - FRAME_OVERHEAD)
}

fn frame_crc(length: u16, frame_id: u8, payload: &[u8]) -> u16 {
    let mut head = Vec::with_capacity(3 + payload.len());
    head.put_u16(length);
    head.put_u8(frame_id);
    head.extend_from_slice(payload);
    checksum(&head)
}

/// Incremental decoder for frames arriving in arbitrary chunks.
///
/// Blocking readers that can ask the channel for an exact byte count do not
/// need this. It serves consumers that only get whatever bytes happen to be
/// available, such as recorded interval-mode output.
#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Bytes received but not yet part of a decoded frame.
    buffer: BytesMut,
}

impl FrameCodec {
    /// Empty decoder with room for one maximum-size frame.
    pub fn new() -> Self {
        FrameCodec {
            buffer: BytesMut::with_capacity(MAX_FRAME_SIZE),
        }
    }

    /// Append `data` behind whatever is already pending.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Pull the next frame out of the pending bytes.
    ///
    /// `Ok(None)` means the next frame is not complete yet. A frame with a
    /// bad CRC is consumed and reported. An impossible length field drops
    /// one byte, so repeated calls walk past garbage.
    pub fn decode(&mut self) -> Result<Option<Frame>, ProtocolError> {
        if self.buffer.len() < 2 {
            return Ok(None);
        }

        let length = u16::from_be_bytes([self.buffer[0], self.buffer[1]]);
        if let Err(e) = payload_len(length) {
            trace!("dropping byte 0x{:02X}: {}", self.buffer[0], e);
            self.buffer.advance(1);
            return Err(e);
        }

        if self.buffer.len() < length as usize {
            return Ok(None);
        }

        let raw = self.buffer.split_to(length as usize);
        Frame::decode(&raw).map(Some)
    }

    /// Bytes pending in front of the next decode.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Forget every pending byte.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn encoded(frame_id: u8, payload: &[u8]) -> Vec<u8> {
        encode_frame(frame_id, payload).unwrap()
    }

    #[test]
    fn test_encode_get_mod_info() {
        assert_eq!(encoded(FRAME_GET_MOD_INFO, &[]), vec![0x00, 0x05, 0x01, 0xEF, 0xD4]);
    }

    #[test]
    fn test_frame_roundtrip() {
        let payloads: [&[u8]; 3] = [&[], &[0x00], b"TCM6\x00\x00\x00\x01"];
        for (frame_id, payload) in [FRAME_GET_DATA, FRAME_DATA_RESP, FRAME_MOD_INFO_RESP]
            .into_iter()
            .zip(payloads)
        {
            let bytes = encoded(frame_id, payload);
            assert_eq!(bytes.len(), payload.len() + FRAME_OVERHEAD);

            let decoded = Frame::decode(&bytes).unwrap();
            assert_eq!(decoded, Frame::new(frame_id, payload));
        }
    }

    #[test]
    fn test_encode_largest_frame() {
        let payload = vec![0xA5; MAX_FRAME_SIZE - FRAME_OVERHEAD];
        let bytes = encoded(FRAME_DATA_RESP, &payload);
        assert_eq!(&bytes[..2], &(MAX_FRAME_SIZE as u16).to_be_bytes());
        assert_eq!(Frame::decode(&bytes).unwrap().payload, payload);
    }

    #[test]
    fn test_encode_oversize_payload_rejected() {
        let payload = vec![0; MAX_FRAME_SIZE - FRAME_OVERHEAD + 1];
        assert_eq!(
            encode_frame(FRAME_DATA_RESP, &payload),
            Err(ProtocolError::FrameTooLong {
                max: MAX_FRAME_SIZE,
                actual: MAX_FRAME_SIZE + 1
            })
        );

        // Would wrap to a length field of 4 if narrowed to u16.
        let wrapping = vec![0; usize::from(u16::MAX)];
        assert!(matches!(
            Frame::new(FRAME_DATA_RESP, wrapping).encode(),
            Err(ProtocolError::FrameTooLong { actual: 65540, .. })
        ));
    }

    #[test]
    fn test_single_byte_corruption_detected() {
        let bytes = encoded(FRAME_CONFIG_RESP, &[CONFIG_DECLINATION, 0x41, 0x20, 0x00, 0x00]);

        for index in 0..bytes.len() {
            let mut corrupted = bytes.clone();
            corrupted[index] ^= 0x5A;
            assert!(
                Frame::decode(&corrupted).is_err(),
                "corruption at byte {} not detected",
                index
            );
        }
        for index in 2..bytes.len() {
            let mut corrupted = bytes.clone();
            corrupted[index] ^= 0x5A;
            assert!(
                matches!(
                    Frame::decode(&corrupted),
                    Err(ProtocolError::ChecksumMismatch { .. })
                ),
                "corruption at byte {} not reported as a checksum failure",
                index
            );
        }
    }

    #[test]
    fn test_corrupted_length_field() {
        // 10-byte frame, length field 0x000A.
        let bytes = encoded(FRAME_CONFIG_RESP, &[CONFIG_DECLINATION, 0x41, 0x20, 0x00, 0x00]);

        let mut longer = bytes.clone();
        longer[1] = 0x0B;
        assert_eq!(
            Frame::decode(&longer),
            Err(ProtocolError::FrameTooShort {
                expected: 11,
                actual: 10
            })
        );

        let mut shorter = bytes.clone();
        shorter[1] = 0x09;
        assert!(matches!(
            Frame::decode(&shorter),
            Err(ProtocolError::InvalidArgument(_))
        ));

        let mut impossible = bytes.clone();
        impossible[1] = 0x02;
        assert_eq!(
            Frame::decode(&impossible),
            Err(ProtocolError::FrameTooShort {
                expected: 5,
                actual: 2
            })
        );

        let mut huge = bytes;
        huge[0] ^= 0x80;
        assert_eq!(
            Frame::decode(&huge),
            Err(ProtocolError::FrameTooLong {
                max: MAX_FRAME_SIZE,
                actual: 0x800A
            })
        );
    }

    #[test]
    fn test_corrupted_crc_reports_both_values() {
        let mut bytes = encoded(FRAME_GET_MOD_INFO, &[]);
        bytes[4] = 0xD5;
        assert_eq!(
            Frame::decode(&bytes),
            Err(ProtocolError::ChecksumMismatch {
                expected: 0xEFD4,
                actual: 0xEFD5
            })
        );
    }

    #[test]
    fn test_length_field_too_small() {
        assert_eq!(payload_len(4), Err(ProtocolError::FrameTooShort { expected: 5, actual: 4 }));
        assert_eq!(payload_len(5), Ok(0));
        assert!(matches!(payload_len(u16::MAX), Err(ProtocolError::FrameTooLong { .. })));
    }

    #[test]
    fn test_frame_codec_partial() {
        let mut codec = FrameCodec::new();
        let bytes = encoded(FRAME_SAVE_DONE, &[0x00, 0x00]);

        codec.push(&bytes[..4]);
        assert_eq!(codec.decode(), Ok(None));

        codec.push(&bytes[4..]);
        let frame = codec.decode().unwrap().expect("should decode frame");
        assert_eq!(frame, Frame::new(FRAME_SAVE_DONE, vec![0x00, 0x00]));
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn test_frame_codec_multiple() {
        let mut codec = FrameCodec::new();
        codec.push(&encoded(FRAME_USER_CAL_SAMP_COUNT, &1u32.to_be_bytes()));
        codec.push(&encoded(FRAME_USER_CAL_SAMP_COUNT, &2u32.to_be_bytes()));

        let first = codec.decode().unwrap().expect("first frame");
        let second = codec.decode().unwrap().expect("second frame");
        assert_eq!(first.payload, vec![0, 0, 0, 1]);
        assert_eq!(second.payload, vec![0, 0, 0, 2]);
        assert_eq!(codec.decode(), Ok(None));
    }

    #[test]
    fn test_frame_codec_resyncs_after_garbage() {
        let mut codec = FrameCodec::new();
        // 0x00 0x00 announces an empty frame, which is impossible.
        codec.push(&[0x00]);
        codec.push(&encoded(FRAME_POWER_DOWN_DONE, &[]));

        assert!(matches!(codec.decode(), Err(ProtocolError::FrameTooShort { .. })));
        let frame = codec.decode().unwrap().expect("frame after garbage");
        assert_eq!(frame.frame_id, FRAME_POWER_DOWN_DONE);
    }

    #[test]
    fn test_frame_codec_bad_crc_consumed() {
        let mut codec = FrameCodec::new();
        let mut bad = encoded(FRAME_DATA_RESP, &[0x00]);
        bad[3] = 0x01;
        codec.push(&bad);
        codec.push(&encoded(FRAME_DATA_RESP, &[0x00]));

        assert!(matches!(codec.decode(), Err(ProtocolError::ChecksumMismatch { .. })));
        assert!(codec.decode().unwrap().is_some());

        codec.push(&[0x00]);
        codec.clear();
        assert_eq!(codec.buffered_len(), 0);
    }
}
