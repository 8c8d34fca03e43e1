//! `AddRequest ::= [APPLICATION 8] SEQUENCE { entry LDAPDN, attributes AttributeList }`

use super::{ProtocolOpCodec, ProtocolOpType};
use crate::attribute::{decode_attributes, encode_attributes, Attribute};
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequestProtocolOp {
    dn: String,
    attributes: Vec<Attribute>,
}

impl AddRequestProtocolOp {
    pub fn new(dn: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            dn: dn.into(),
            attributes,
        }
    }

    pub fn dn(&self) -> &str {
        &self.dn
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

impl ProtocolOpCodec for AddRequestProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::AddRequest;

    fn encode_protocol_op(&self) -> BerElement {
        BerElement::sequence(
            Self::TYPE.tag(),
            &[
                BerElement::universal_octet_string(self.dn.clone()),
                encode_attributes(&self.attributes),
            ],
        )
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let elements = element.decode_as_sequence()?;
        if elements.len() != 2 {
            return Err(LdapError::decoding(format!(
                "add request must have 2 elements, got {}",
                elements.len()
            )));
        }
        let dn = elements[0]
            .decode_as_string()
            .decoding_context(|| "cannot decode the entry DN")?;
        let attributes = decode_attributes(&elements[1])?;
        Ok(Self::new(dn, attributes))
    }
}
