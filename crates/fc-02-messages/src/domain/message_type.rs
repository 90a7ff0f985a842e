//! Message type tags.

use shared_types::DecodeError;
use std::fmt;

/// One-byte discriminant leading every encoded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MessageType {
    Ack = 1,
    Heartbeat = 10,
    MissingMsgResponse = 19,
    AddLeaderInternal = 29,
    RemoveLeaderInternal = 30,
    AddAuditInternal = 31,
    RemoveAuditInternal = 32,
    TimeoutInternal = 33,
    EomSigInternal = 34,
    VolunteerInternal = 36,
    VoteInternal = 37,
    DbSigSigInternal = 38,
}

impl MessageType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Election-internal messages are never relayed to peers.
    pub fn is_internal(self) -> bool {
        self.as_u8() >= Self::AddLeaderInternal.as_u8()
    }
}

impl TryFrom<u8> for MessageType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Ack,
            10 => Self::Heartbeat,
            19 => Self::MissingMsgResponse,
            29 => Self::AddLeaderInternal,
            30 => Self::RemoveLeaderInternal,
            31 => Self::AddAuditInternal,
            32 => Self::RemoveAuditInternal,
            33 => Self::TimeoutInternal,
            34 => Self::EomSigInternal,
            36 => Self::VolunteerInternal,
            37 => Self::VoteInternal,
            38 => Self::DbSigSigInternal,
            other => return Err(DecodeError::UnknownType(other)),
        })
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ack => "Ack",
            Self::Heartbeat => "HeartBeat",
            Self::MissingMsgResponse => "MissingMsgResponse",
            Self::AddLeaderInternal => "AddLeaderInternal",
            Self::RemoveLeaderInternal => "RemoveLeaderInternal",
            Self::AddAuditInternal => "AddAuditInternal",
            Self::RemoveAuditInternal => "RemoveAuditInternal",
            Self::TimeoutInternal => "TimeoutInternal",
            Self::EomSigInternal => "EomSigInternal",
            Self::VolunteerInternal => "VolunteerInternal",
            Self::VoteInternal => "VoteInternal",
            Self::DbSigSigInternal => "DBSigSigInternal",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip_through_u8() {
        for byte in 0..=u8::MAX {
            if let Ok(kind) = MessageType::try_from(byte) {
                assert_eq!(kind.as_u8(), byte);
            }
        }
        assert_eq!(
            MessageType::try_from(35),
            Err(DecodeError::UnknownType(35))
        );
    }

    #[test]
    fn test_internal_family() {
        assert!(!MessageType::Heartbeat.is_internal());
        assert!(!MessageType::MissingMsgResponse.is_internal());
        assert!(MessageType::AddLeaderInternal.is_internal());
        assert!(MessageType::DbSigSigInternal.is_internal());
    }
}
