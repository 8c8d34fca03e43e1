//! `AbandonRequest ::= [APPLICATION 16] MessageID`

use super::{ProtocolOpCodec, ProtocolOpType};
use ldap_asn1::BerElement;
use ldap_core::{LdapError, LdapResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbandonRequestProtocolOp {
    message_id: i32,
}

impl AbandonRequestProtocolOp {
    pub fn new(message_id: i32) -> Self {
        Self { message_id }
    }

    /// Message ID of the operation to abandon
    pub fn message_id(&self) -> i32 {
        self.message_id
    }
}

impl ProtocolOpCodec for AbandonRequestProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::AbandonRequest;

    fn encode_protocol_op(&self) -> BerElement {
        BerElement::integer(Self::TYPE.tag(), i64::from(self.message_id))
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let message_id = element.decode_as_integer()?;
        if message_id < 0 {
            return Err(LdapError::decoding(format!(
                "message ID to abandon must not be negative, got {}",
                message_id
            )));
        }
        Ok(Self::new(message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abandon_encoding() {
        let op = AbandonRequestProtocolOp::new(5);
        assert_eq!(op.encode_protocol_op().encode(), vec![0x50, 0x01, 0x05]);
        assert_eq!(
            AbandonRequestProtocolOp::decode_protocol_op(&op.encode_protocol_op()).unwrap(),
            op
        );
    }
}
