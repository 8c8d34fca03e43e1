//! Extended request and response
//!
//! ```text
//! ExtendedRequest ::= [APPLICATION 23] SEQUENCE {
//!      requestName      [0] LDAPOID,
//!      requestValue     [1] OCTET STRING OPTIONAL }
//!
//! ExtendedResponse ::= [APPLICATION 24] SEQUENCE {
//!      COMPONENTS OF LDAPResult,
//!      responseName     [10] LDAPOID OPTIONAL,
//!      responseValue    [11] OCTET STRING OPTIONAL }
//! ```

use super::{ProtocolOpCodec, ProtocolOpType};
use crate::result::LdapResultComponents;
use bytes::Bytes;
use ldap_asn1::{BerDecoder, BerElement, BerEncoder};
use ldap_core::{DecodeContext, LdapError, LdapResult, Oid};
use std::fmt;

pub const TYPE_EXTENDED_REQUEST_OID: u8 = 0x80;
pub const TYPE_EXTENDED_REQUEST_VALUE: u8 = 0x81;
pub const TYPE_EXTENDED_RESPONSE_OID: u8 = 0x8A;
pub const TYPE_EXTENDED_RESPONSE_VALUE: u8 = 0x8B;

/// Request names are kept as sent; descriptors are only noted
fn request_oid(oid: String) -> LdapResult<Oid> {
    let oid = Oid::new(oid)?;
    if !oid.is_numeric() {
        log::debug!("extended request named by non-numeric OID '{}'", oid);
    }
    Ok(oid)
}

/// The extended request operation: an OID and an optional opaque value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedRequestProtocolOp {
    oid: Oid,
    value: Option<Bytes>,
}

impl ExtendedRequestProtocolOp {
    pub fn new(oid: Oid, value: Option<Bytes>) -> Self {
        Self { oid, value }
    }

    /// Create an extended request from an OID string
    ///
    /// # Errors
    /// Returns [`LdapError::InvalidData`] if the OID is empty
    pub fn with_oid(oid: &str, value: Option<Bytes>) -> LdapResult<Self> {
        Ok(Self::new(Oid::new(oid)?, value))
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }

    fn read_content(decoder: &mut BerDecoder<'_>) -> LdapResult<Self> {
        let sequence = decoder.begin_sequence()?;
        let oid = decoder
            .read_string()
            .and_then(request_oid)
            .decoding_context(|| "cannot decode the request OID")?;

        let value = if decoder.has_more_elements(&sequence) {
            Some(
                decoder
                    .read_bytes()
                    .decoding_context(|| "cannot decode the request value")?,
            )
        } else {
            None
        };

        if decoder.has_more_elements(&sequence) {
            return Err(LdapError::decoding(
                "extended request must have 1 or 2 elements, got more than 2",
            ));
        }
        decoder.end_sequence(sequence)?;
        Ok(Self::new(oid, value))
    }
}

impl ProtocolOpCodec for ExtendedRequestProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::ExtendedRequest;

    fn encode_protocol_op(&self) -> BerElement {
        let mut elements = Vec::with_capacity(2);
        elements.push(BerElement::octet_string(
            TYPE_EXTENDED_REQUEST_OID,
            self.oid.as_str().to_string(),
        ));
        if let Some(value) = &self.value {
            elements.push(BerElement::octet_string(TYPE_EXTENDED_REQUEST_VALUE, value.clone()));
        }
        BerElement::sequence(Self::TYPE.tag(), &elements)
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let elements = element.decode_as_sequence()?;
        let (oid_element, value) = match elements.as_slice() {
            [oid] => (oid, None),
            [oid, value] => (oid, Some(value.decode_as_octet_string())),
            other => {
                return Err(LdapError::decoding(format!(
                    "extended request must have 1 or 2 elements, got {}",
                    other.len()
                )));
            }
        };
        let oid = oid_element
            .decode_as_string()
            .and_then(request_oid)
            .decoding_context(|| "cannot decode the request OID")?;
        Ok(Self::new(oid, value))
    }

    fn write_to(&self, encoder: &mut BerEncoder) {
        let sequence = encoder.begin_sequence(Self::TYPE.tag());
        encoder.add_octet_string(TYPE_EXTENDED_REQUEST_OID, self.oid.as_str().as_bytes());
        if let Some(value) = &self.value {
            encoder.add_octet_string(TYPE_EXTENDED_REQUEST_VALUE, value);
        }
        encoder.end_sequence(sequence);
    }

    fn read_from(decoder: &mut BerDecoder<'_>) -> LdapResult<Self> {
        match decoder.peek_type() {
            Some(tag) if tag == Self::TYPE.tag() => {
                Self::read_content(decoder)
                    .decoding_context(|| format!("cannot decode {}", Self::TYPE))
            }
            other => Err(LdapError::decoding(format!(
                "cannot decode {}: unexpected BER type {:?}",
                Self::TYPE,
                other
            ))),
        }
    }
}

impl fmt::Display for ExtendedRequestProtocolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtendedRequestProtocolOp(oid='{}'", self.oid)?;
        if let Some(value) = &self.value {
            write!(f, ", valueLength={}", value.len())?;
        }
        f.write_str(")")
    }
}

/// The extended response operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedResponseProtocolOp {
    result: LdapResultComponents,
    oid: Option<String>,
    value: Option<Bytes>,
}

impl ExtendedResponseProtocolOp {
    pub fn new(result: LdapResultComponents, oid: Option<String>, value: Option<Bytes>) -> Self {
        Self { result, oid, value }
    }

    pub fn result(&self) -> &LdapResultComponents {
        &self.result
    }

    pub fn oid(&self) -> Option<&str> {
        self.oid.as_deref()
    }

    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }
}

impl ProtocolOpCodec for ExtendedResponseProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::ExtendedResponse;

    fn encode_protocol_op(&self) -> BerElement {
        let mut elements = Vec::with_capacity(6);
        self.result.encode_into(&mut elements);
        if let Some(oid) = &self.oid {
            elements.push(BerElement::octet_string(TYPE_EXTENDED_RESPONSE_OID, oid.clone()));
        }
        if let Some(value) = &self.value {
            elements.push(BerElement::octet_string(TYPE_EXTENDED_RESPONSE_VALUE, value.clone()));
        }
        BerElement::sequence(Self::TYPE.tag(), &elements)
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let elements = element.decode_as_sequence()?;
        let (result, consumed) = LdapResultComponents::decode_from(&elements)?;

        let mut oid = None;
        let mut value = None;
        for e in &elements[consumed..] {
            match e.tag() {
                TYPE_EXTENDED_RESPONSE_OID if oid.is_none() && value.is_none() => {
                    oid = Some(
                        e.decode_as_string()
                            .decoding_context(|| "cannot decode the response OID")?,
                    );
                }
                TYPE_EXTENDED_RESPONSE_VALUE if value.is_none() => {
                    value = Some(e.decode_as_octet_string());
                }
                other => {
                    return Err(LdapError::decoding(format!(
                        "unexpected extended response element type 0x{:02x}",
                        other
                    )));
                }
            }
        }

        Ok(Self::new(result, oid, value))
    }
}
