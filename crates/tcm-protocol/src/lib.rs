//! Fieldforce TCM Binary Protocol
//!
//! This crate provides types and utilities for talking to a PNI Fieldforce TCM
//! compass module over its binary serial protocol. It performs no I/O; the
//! `tcm-driver` crate pairs it with a byte channel.
//!
//! # Protocol Overview
//!
//! Every message is a frame carrying a one-byte frame id and a payload,
//! wrapped in a big-endian length prefix and a CRC-16 trailer (see [`frame`]).
//!
//! - **Commands** (host → module): [`Command`], most answered by exactly one
//!   response frame.
//! - **Responses** (module → host): [`Response`].
//! - **Components**: sensor outputs and configuration values are addressed by
//!   one-byte ids whose value types come from the [`registry`] tables.
//!
//! # Example
//!
//! ```rust
//! use tcm_protocol::{Command, Frame, Response};
//!
//! let request = Command::GetModInfo.encode()?;
//! assert_eq!(request, [0x00, 0x05, 0x01, 0xEF, 0xD4]);
//!
//! let reply = Frame::new(tcm_protocol::FRAME_MOD_INFO_RESP, b"TCM6C016".to_vec());
//! let response = Response::decode(&Frame::decode(&reply.encode()?)?)?;
//! assert!(matches!(response, Response::ModInfo(_)));
//! # Ok::<(), tcm_protocol::ProtocolError>(())
//! ```

pub mod calibration;
pub mod checksum;
mod commands;
mod constants;
mod error;
pub mod frame;
pub mod registry;
mod responses;
mod types;

pub use calibration::*;
pub use checksum::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use registry::*;
pub use responses::*;
pub use types::*;
