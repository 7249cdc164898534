//! MCS wire framing, tag dispatch, and protobuf schema for FCM push delivery.
//!
//! This crate implements the binary framing Google's Mobile Client Service
//! (MCS) speaks on `mtalk.google.com:5228`: a one-byte protocol version
//! exchanged once per direction, then a stream of tagged, varint-sized
//! protobuf messages.
//!
//! ## Wire format
//!
//! ```text
//! +----------------------+------------------------------------+
//! | u8 version (= 41)    | first frame of each direction only |
//! +----------------------+------------------------------------+
//! | u8 tag               | message type (see `Tag`)           |
//! +----------------------+------------------------------------+
//! | varint size          | LEB128, 1..=5 bytes                |
//! +----------------------+------------------------------------+
//! | protobuf body        | exactly `size` bytes               |
//! +----------------------+------------------------------------+
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod framing;
pub mod proto;
pub mod tag;

// Re-export main types
pub use error::WireError;
pub use framing::{
    FrameReader, FrameWriter, McsPacket, MAX_PACKET_SIZE, MCS_VERSION, SIZE_PACKET_LEN_MAX,
};
pub use tag::Tag;
