//! The `LDAPMessage` envelope
//!
//! ```text
//! LDAPMessage ::= SEQUENCE {
//!      messageID       MessageID,
//!      protocolOp      CHOICE { ... },
//!      controls       [0] Controls OPTIONAL }
//! ```

use crate::control::{decode_controls, encode_controls_with_type, Control, MESSAGE_CONTROLS_TYPE};
use crate::op::{ProtocolOp, ProtocolOpType};
use ldap_asn1::ber::types::UNIVERSAL_SEQUENCE_TYPE;
use ldap_asn1::{BerDecoder, BerElement, BerEncoder};
use ldap_core::{DecodeContext, LdapError, LdapResult};
use std::fmt;

/// A protocol operation with its message ID and controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapMessage {
    message_id: i32,
    op: ProtocolOp,
    controls: Vec<Control>,
}

impl LdapMessage {
    pub fn new(message_id: i32, op: impl Into<ProtocolOp>, controls: Vec<Control>) -> Self {
        Self {
            message_id,
            op: op.into(),
            controls,
        }
    }

    pub fn message_id(&self) -> i32 {
        self.message_id
    }

    pub fn op(&self) -> &ProtocolOp {
        &self.op
    }

    pub fn op_type(&self) -> ProtocolOpType {
        self.op.op_type()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Split the message into its parts
    pub fn into_parts(self) -> (i32, ProtocolOp, Vec<Control>) {
        (self.message_id, self.op, self.controls)
    }

    pub fn encode(&self) -> BerElement {
        let mut elements = vec![
            BerElement::universal_integer(i64::from(self.message_id)),
            self.op.encode(),
        ];
        if !self.controls.is_empty() {
            elements.push(encode_controls_with_type(MESSAGE_CONTROLS_TYPE, &self.controls));
        }
        BerElement::universal_sequence(&elements)
    }

    pub fn write_to(&self, encoder: &mut BerEncoder) {
        let sequence = encoder.begin_sequence(UNIVERSAL_SEQUENCE_TYPE);
        encoder.add_universal_integer(i64::from(self.message_id));
        self.op.write_to(encoder);
        if !self.controls.is_empty() {
            encoder.add_element(&encode_controls_with_type(MESSAGE_CONTROLS_TYPE, &self.controls));
        }
        encoder.end_sequence(sequence);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode().encode()
    }

    /// Decode a message from its SEQUENCE element
    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        let elements = element
            .decode_as_sequence()
            .decoding_context(|| "LDAP message is not a valid sequence")?;
        if elements.len() != 2 && elements.len() != 3 {
            return Err(LdapError::decoding(format!(
                "LDAP message must have 2 or 3 elements, got {}",
                elements.len()
            )));
        }

        let message_id = elements[0]
            .decode_as_integer()
            .decoding_context(|| "cannot decode the message ID")
            .and_then(check_message_id)?;
        let op = ProtocolOp::decode(&elements[1])
            .decoding_context(|| format!("cannot decode the operation of message {}", message_id))?;
        let controls = match elements.get(2) {
            Some(e) if e.tag() == MESSAGE_CONTROLS_TYPE => decode_controls(e)?,
            Some(e) => {
                return Err(LdapError::decoding(format!(
                    "unexpected element type 0x{:02x} after the operation of message {}",
                    e.tag(),
                    message_id
                )));
            }
            None => Vec::new(),
        };

        Ok(Self::new(message_id, op, controls))
    }

    /// Read a message from a decoder positioned at its SEQUENCE element
    pub fn read_from(decoder: &mut BerDecoder<'_>) -> LdapResult<Self> {
        let sequence = decoder
            .begin_sequence()
            .decoding_context(|| "cannot read the LDAP message sequence")?;
        let message_id = decoder
            .read_integer()
            .decoding_context(|| "cannot decode the message ID")
            .and_then(check_message_id)?;
        let op = ProtocolOp::read_from(decoder)
            .decoding_context(|| format!("cannot decode the operation of message {}", message_id))?;

        let mut controls = Vec::new();
        if decoder.has_more_elements(&sequence) {
            let element = decoder
                .read_element()
                .decoding_context(|| "cannot read the message controls")?;
            if element.tag() != MESSAGE_CONTROLS_TYPE {
                return Err(LdapError::decoding(format!(
                    "unexpected element type 0x{:02x} after the operation of message {}",
                    element.tag(),
                    message_id
                )));
            }
            controls = decode_controls(&element)?;
        }
        decoder
            .end_sequence(sequence)
            .decoding_context(|| format!("cannot close message {}", message_id))?;

        Ok(Self::new(message_id, op, controls))
    }

    /// Decode exactly one message from `data`
    pub fn from_bytes(data: &[u8]) -> LdapResult<Self> {
        let element = BerElement::decode(data).decoding_context(|| "cannot read the LDAP message")?;
        Self::decode(&element)
    }
}

fn check_message_id(message_id: i32) -> LdapResult<i32> {
    if message_id < 0 {
        Err(LdapError::decoding(format!(
            "message ID must not be negative, got {}",
            message_id
        )))
    } else {
        Ok(message_id)
    }
}

impl fmt::Display for LdapMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LDAPMessage(msgID={}, op={}", self.message_id, self.op.op_type())?;
        if !self.controls.is_empty() {
            f.write_str(", controls={")?;
            for (i, control) in self.controls.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", control)?;
            }
            f.write_str("}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{DeleteRequestProtocolOp, ExtendedRequestProtocolOp, UnbindRequestProtocolOp};
    use bytes::Bytes;
    use ldap_core::Oid;

    #[test]
    fn test_unbind_message_encoding() {
        let message = LdapMessage::new(3, UnbindRequestProtocolOp::new(), Vec::new());
        assert_eq!(message.to_bytes(), vec![0x30, 0x05, 0x02, 0x01, 0x03, 0x42, 0x00]);
    }

    #[test]
    fn test_message_with_controls_round_trip() {
        let message = LdapMessage::new(
            7,
            ExtendedRequestProtocolOp::new(
                Oid::new("1.2.3").unwrap(),
                Some(Bytes::from_static(b"x")),
            ),
            vec![Control::new(Oid::new("1.2.840.113556.1.4.319").unwrap(), true, None)],
        );
        let bytes = message.to_bytes();
        assert_eq!(LdapMessage::from_bytes(&bytes).unwrap(), message);

        let mut decoder = BerDecoder::new(&bytes);
        assert_eq!(LdapMessage::read_from(&mut decoder).unwrap(), message);
        assert!(!decoder.has_remaining());

        let mut encoder = BerEncoder::new();
        message.write_to(&mut encoder);
        assert_eq!(encoder.into_bytes(), bytes);
    }

    #[test]
    fn test_messages_read_back_to_back() {
        let first = LdapMessage::new(1, DeleteRequestProtocolOp::new("cn=a"), Vec::new());
        let second = LdapMessage::new(2, UnbindRequestProtocolOp::new(), Vec::new());
        let mut bytes = first.to_bytes();
        bytes.extend(second.to_bytes());

        let mut decoder = BerDecoder::new(&bytes);
        assert_eq!(LdapMessage::read_from(&mut decoder).unwrap(), first);
        assert_eq!(LdapMessage::read_from(&mut decoder).unwrap(), second);
        assert!(!decoder.has_remaining());
    }

    #[test]
    fn test_negative_message_id_rejected() {
        let bytes = [0x30, 0x05, 0x02, 0x01, 0xFF, 0x42, 0x00];
        assert!(LdapMessage::from_bytes(&bytes).is_err());
        assert!(LdapMessage::read_from(&mut BerDecoder::new(&bytes)).is_err());
    }

    #[test]
    fn test_unexpected_trailing_element_rejected() {
        let bytes = [0x30, 0x07, 0x02, 0x01, 0x01, 0x42, 0x00, 0x04, 0x00];
        assert!(LdapMessage::from_bytes(&bytes).is_err());
        assert!(LdapMessage::read_from(&mut BerDecoder::new(&bytes)).is_err());
    }
}
