//! Wire protocol error types.

use thiserror::Error;

use crate::tag::Tag;

/// Errors produced while framing or parsing the MCS byte stream.
#[derive(Error, Debug)]
pub enum WireError {
    /// I/O failure on the underlying stream
    #[error("stream i/o: {0}")]
    Io(#[from] std::io::Error),

    /// First received byte did not carry the expected protocol version
    #[error("protocol version mismatch: received {received}, expecting {expected}")]
    Version {
        /// Version byte the peer sent
        received: u8,
        /// Version this implementation speaks
        expected: u8,
    },

    /// Size varint did not terminate within the allowed bytes
    #[error("malformed size varint")]
    MalformedSize,

    /// Declared body size exceeds the sanity cap
    #[error("size limit exceeded: {0}")]
    Size(usize),

    /// Tag byte without a decodable message type
    #[error("unknown tag: {0:#04x}")]
    UnknownTag(u8),

    /// Protobuf body failed to decode
    #[error("decode {tag} body: {source}")]
    Decode {
        /// Tag the body was declared under
        tag: Tag,
        /// Underlying protobuf error
        #[source]
        source: prost::DecodeError,
    },

    /// Protobuf body failed to encode
    #[error("encode frame: {0}")]
    Encode(#[from] prost::EncodeError),
}
