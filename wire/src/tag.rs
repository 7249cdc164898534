//! MCS frame tag enumeration.

use std::fmt;

/// Tag byte prefixed to every MCS frame.
///
/// The full enumeration is part of the protocol; only a subset of tags is
/// ever carried on a client connection (see [`McsPacket`](crate::McsPacket)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Tag {
    HeartbeatPing = 0,
    HeartbeatAck = 1,
    LoginRequest = 2,
    LoginResponse = 3,
    Close = 4,
    MessageStanza = 5,
    PresenceStanza = 6,
    IqStanza = 7,
    DataMessageStanza = 8,
    BatchPresenceStanza = 9,
    StreamErrorStanza = 10,
    HttpRequest = 11,
    HttpResponse = 12,
    BindAccountRequest = 13,
    BindAccountResponse = 14,
    TalkMetadata = 15,
    NumProtoTypes = 16,
}

impl Tag {
    /// Map a wire byte onto its tag, if the value is defined.
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Tag::HeartbeatPing,
            1 => Tag::HeartbeatAck,
            2 => Tag::LoginRequest,
            3 => Tag::LoginResponse,
            4 => Tag::Close,
            5 => Tag::MessageStanza,
            6 => Tag::PresenceStanza,
            7 => Tag::IqStanza,
            8 => Tag::DataMessageStanza,
            9 => Tag::BatchPresenceStanza,
            10 => Tag::StreamErrorStanza,
            11 => Tag::HttpRequest,
            12 => Tag::HttpResponse,
            13 => Tag::BindAccountRequest,
            14 => Tag::BindAccountResponse,
            15 => Tag::TalkMetadata,
            16 => Tag::NumProtoTypes,
            _ => return None,
        })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, *self as u8)
    }
}
