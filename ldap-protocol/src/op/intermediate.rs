//! ```text
//! IntermediateResponse ::= [APPLICATION 25] SEQUENCE {
//!     responseName     [0] LDAPOID OPTIONAL,
//!     responseValue    [1] OCTET STRING OPTIONAL }
//! ```

use super::{ProtocolOpCodec, ProtocolOpType};
use bytes::Bytes;
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult};

pub const TYPE_INTERMEDIATE_RESPONSE_OID: u8 = 0x80;
pub const TYPE_INTERMEDIATE_RESPONSE_VALUE: u8 = 0x81;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateResponseProtocolOp {
    oid: Option<String>,
    value: Option<Bytes>,
}

impl IntermediateResponseProtocolOp {
    pub fn new(oid: Option<String>, value: Option<Bytes>) -> Self {
        Self { oid, value }
    }

    pub fn oid(&self) -> Option<&str> {
        self.oid.as_deref()
    }

    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }
}

impl ProtocolOpCodec for IntermediateResponseProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::IntermediateResponse;

    fn encode_protocol_op(&self) -> BerElement {
        let mut elements = Vec::with_capacity(2);
        if let Some(oid) = &self.oid {
            elements.push(BerElement::octet_string(TYPE_INTERMEDIATE_RESPONSE_OID, oid.clone()));
        }
        if let Some(value) = &self.value {
            elements.push(BerElement::octet_string(
                TYPE_INTERMEDIATE_RESPONSE_VALUE,
                value.clone(),
            ));
        }
        BerElement::sequence(Self::TYPE.tag(), &elements)
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let mut oid = None;
        let mut value = None;
        for e in element.decode_as_sequence()? {
            match e.tag() {
                TYPE_INTERMEDIATE_RESPONSE_OID if oid.is_none() && value.is_none() => {
                    oid = Some(
                        e.decode_as_string()
                            .decoding_context(|| "cannot decode the response OID")?,
                    );
                }
                TYPE_INTERMEDIATE_RESPONSE_VALUE if value.is_none() => {
                    value = Some(e.decode_as_octet_string());
                }
                other => {
                    return Err(LdapError::decoding(format!(
                        "unexpected intermediate response element type 0x{:02x}",
                        other
                    )));
                }
            }
        }
        Ok(Self::new(oid, value))
    }
}
