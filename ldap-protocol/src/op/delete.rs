//! `DelRequest ::= [APPLICATION 10] LDAPDN`
//!
//! One of the operations encoded as a primitive element: the value is the DN.

use super::{ProtocolOpCodec, ProtocolOpType};
use ldap_asn1::{BerDecoder, BerElement, BerEncoder};
use ldap_core::{DecodeContext, LdapError, LdapResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequestProtocolOp {
    dn: String,
}

impl DeleteRequestProtocolOp {
    pub fn new(dn: impl Into<String>) -> Self {
        Self { dn: dn.into() }
    }

    pub fn dn(&self) -> &str {
        &self.dn
    }
}

impl ProtocolOpCodec for DeleteRequestProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::DeleteRequest;

    fn encode_protocol_op(&self) -> BerElement {
        BerElement::octet_string(Self::TYPE.tag(), self.dn.clone())
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        element.decode_as_string().map(Self::new)
    }

    fn write_to(&self, encoder: &mut BerEncoder) {
        encoder.add_octet_string(Self::TYPE.tag(), self.dn.as_bytes());
    }

    fn read_from(decoder: &mut BerDecoder<'_>) -> LdapResult<Self> {
        match decoder.peek_type() {
            Some(tag) if tag == Self::TYPE.tag() => decoder
                .read_string()
                .map(Self::new)
                .decoding_context(|| format!("cannot decode {}", Self::TYPE)),
            other => Err(LdapError::decoding(format!(
                "cannot decode {}: unexpected BER type {:?}",
                Self::TYPE,
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_encoding() {
        let op = DeleteRequestProtocolOp::new("cn=x");
        assert_eq!(op.encode_protocol_op().encode(), vec![0x4A, 0x04, b'c', b'n', b'=', b'x']);
    }
}
