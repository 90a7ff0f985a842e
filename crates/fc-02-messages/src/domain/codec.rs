//! Encoding helpers shared by message variants.

use crate::domain::{Message, MessageType};
use shared_crypto::FullSignature;
use shared_types::{ByteReader, ByteWriter, DecodeError};

/// Trailing signature block: absent when the buffer is exhausted.
pub(crate) fn pop_optional_signature(
    r: &mut ByteReader<'_>,
) -> Result<Option<FullSignature>, DecodeError> {
    if r.is_empty() {
        return Ok(None);
    }
    FullSignature::read(r).map(Some)
}

pub(crate) fn push_nested(w: &mut ByteWriter, msg: &Message) {
    w.push_bytes(&msg.marshal_binary());
}

/// Length-prefixed inner message that must fill its prefix exactly.
///
/// Missing-message responses do not nest, which bounds decode recursion.
pub(crate) fn pop_nested(r: &mut ByteReader<'_>) -> Result<Message, DecodeError> {
    let bytes = r.pop_bytes()?;
    if bytes.first() == Some(&MessageType::MissingMsgResponse.as_u8()) {
        return Err(DecodeError::Malformed {
            field: "nested message",
            reason: "missing-message responses cannot be nested".into(),
        });
    }
    let (msg, rest) = Message::unmarshal_binary_data(bytes)?;
    if !rest.is_empty() {
        return Err(DecodeError::Malformed {
            field: "nested message",
            reason: format!("{} trailing bytes", rest.len()),
        });
    }
    Ok(msg)
}
