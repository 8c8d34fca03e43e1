//! `UnbindRequest ::= [APPLICATION 2] NULL`

use super::{ProtocolOpCodec, ProtocolOpType};
use ldap_asn1::BerElement;
use ldap_core::LdapResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnbindRequestProtocolOp;

impl UnbindRequestProtocolOp {
    pub fn new() -> Self {
        Self
    }
}

impl ProtocolOpCodec for UnbindRequestProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::UnbindRequest;

    fn encode_protocol_op(&self) -> BerElement {
        BerElement::null(Self::TYPE.tag())
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        element.decode_as_null().map(|_| Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbind_encoding() {
        assert_eq!(UnbindRequestProtocolOp::new().encode_protocol_op().encode(), vec![0x42, 0x00]);
        let element = BerElement::new(0x42, vec![0x00u8]);
        assert!(UnbindRequestProtocolOp::decode_protocol_op(&element).is_err());
    }
}
