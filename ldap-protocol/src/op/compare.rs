//! Compare request
//!
//! ```text
//! CompareRequest ::= [APPLICATION 14] SEQUENCE {
//!      entry           LDAPDN,
//!      ava             AttributeValueAssertion }
//! ```

use super::{ProtocolOpCodec, ProtocolOpType};
use bytes::Bytes;
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequestProtocolOp {
    dn: String,
    attribute: String,
    assertion_value: Bytes,
}

impl CompareRequestProtocolOp {
    pub fn new(
        dn: impl Into<String>,
        attribute: impl Into<String>,
        assertion_value: Bytes,
    ) -> Self {
        Self {
            dn: dn.into(),
            attribute: attribute.into(),
            assertion_value,
        }
    }

    pub fn dn(&self) -> &str {
        &self.dn
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn assertion_value(&self) -> &Bytes {
        &self.assertion_value
    }
}

impl ProtocolOpCodec for CompareRequestProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::CompareRequest;

    fn encode_protocol_op(&self) -> BerElement {
        BerElement::sequence(
            Self::TYPE.tag(),
            &[
                BerElement::universal_octet_string(self.dn.clone()),
                BerElement::universal_sequence(&[
                    BerElement::universal_octet_string(self.attribute.clone()),
                    BerElement::universal_octet_string(self.assertion_value.clone()),
                ]),
            ],
        )
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let elements = element.decode_as_sequence()?;
        if elements.len() != 2 {
            return Err(LdapError::decoding(format!(
                "compare request must have 2 elements, got {}",
                elements.len()
            )));
        }
        let dn = elements[0]
            .decode_as_string()
            .decoding_context(|| "cannot decode the entry DN")?;

        let ava = elements[1]
            .decode_as_sequence()
            .decoding_context(|| "cannot decode the attribute value assertion")?;
        if ava.len() != 2 {
            return Err(LdapError::decoding(format!(
                "attribute value assertion must have 2 elements, got {}",
                ava.len()
            )));
        }
        let attribute = ava[0]
            .decode_as_string()
            .decoding_context(|| "cannot decode the assertion attribute")?;
        Ok(Self::new(dn, attribute, ava[1].decode_as_octet_string()))
    }
}
