//! LDAP protocol operations
//!
//! Every operation type implements [`ProtocolOpCodec`], which ties it to its
//! fixed application type byte and provides both decode paths: from an
//! element that has already been read and from a [`BerDecoder`] positioned at
//! the start of the element.
//!
//! [`ProtocolOp`] is the closed set of all operations, used where the
//! operation type is only known once the type byte has been seen.

mod abandon;
mod add;
mod bind;
mod compare;
mod delete;
mod extended;
mod intermediate;
mod modify;
mod modify_dn;
mod response;
mod search;
mod unbind;

pub use abandon::AbandonRequestProtocolOp;
pub use add::AddRequestProtocolOp;
pub use bind::{BindCredentials, BindRequestProtocolOp, BindResponseProtocolOp};
pub use compare::CompareRequestProtocolOp;
pub use delete::DeleteRequestProtocolOp;
pub use extended::{
    ExtendedRequestProtocolOp, ExtendedResponseProtocolOp, TYPE_EXTENDED_REQUEST_OID,
    TYPE_EXTENDED_REQUEST_VALUE, TYPE_EXTENDED_RESPONSE_OID, TYPE_EXTENDED_RESPONSE_VALUE,
};
pub use intermediate::IntermediateResponseProtocolOp;
pub use modify::ModifyRequestProtocolOp;
pub use modify_dn::ModifyDNRequestProtocolOp;
pub use response::{
    AddResponseProtocolOp, CompareResponseProtocolOp, DeleteResponseProtocolOp,
    ModifyDNResponseProtocolOp, ModifyResponseProtocolOp, SearchResultDoneProtocolOp,
};
pub use search::{
    DereferencePolicy, SearchRequestProtocolOp, SearchResultEntryProtocolOp,
    SearchResultReferenceProtocolOp, SearchScope,
};
pub use unbind::UnbindRequestProtocolOp;

use ldap_asn1::{BerDecoder, BerElement, BerEncoder};
use ldap_core::{DecodeContext, LdapError, LdapResult};
use std::fmt;

/// Application type byte of each LDAP operation (RFC 4511 section 4.2-4.14)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ProtocolOpType {
    BindRequest = 0x60,
    BindResponse = 0x61,
    UnbindRequest = 0x42,
    SearchRequest = 0x63,
    SearchResultEntry = 0x64,
    SearchResultDone = 0x65,
    ModifyRequest = 0x66,
    ModifyResponse = 0x67,
    AddRequest = 0x68,
    AddResponse = 0x69,
    DeleteRequest = 0x4A,
    DeleteResponse = 0x6B,
    ModifyDNRequest = 0x6C,
    ModifyDNResponse = 0x6D,
    CompareRequest = 0x6E,
    CompareResponse = 0x6F,
    AbandonRequest = 0x50,
    SearchResultReference = 0x73,
    ExtendedRequest = 0x77,
    ExtendedResponse = 0x78,
    IntermediateResponse = 0x79,
}

impl ProtocolOpType {
    /// Look up the operation type for a type byte
    ///
    /// # Returns
    /// `None` if the byte is not the type of any LDAP operation
    pub fn from_tag(tag: u8) -> Option<Self> {
        let op_type = match tag {
            0x60 => ProtocolOpType::BindRequest,
            0x61 => ProtocolOpType::BindResponse,
            0x42 => ProtocolOpType::UnbindRequest,
            0x63 => ProtocolOpType::SearchRequest,
            0x64 => ProtocolOpType::SearchResultEntry,
            0x65 => ProtocolOpType::SearchResultDone,
            0x66 => ProtocolOpType::ModifyRequest,
            0x67 => ProtocolOpType::ModifyResponse,
            0x68 => ProtocolOpType::AddRequest,
            0x69 => ProtocolOpType::AddResponse,
            0x4A => ProtocolOpType::DeleteRequest,
            0x6B => ProtocolOpType::DeleteResponse,
            0x6C => ProtocolOpType::ModifyDNRequest,
            0x6D => ProtocolOpType::ModifyDNResponse,
            0x6E => ProtocolOpType::CompareRequest,
            0x6F => ProtocolOpType::CompareResponse,
            0x50 => ProtocolOpType::AbandonRequest,
            0x73 => ProtocolOpType::SearchResultReference,
            0x77 => ProtocolOpType::ExtendedRequest,
            0x78 => ProtocolOpType::ExtendedResponse,
            0x79 => ProtocolOpType::IntermediateResponse,
            _ => return None,
        };
        Some(op_type)
    }

    /// The type byte
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Human-readable name used in messages
    pub fn name(self) -> &'static str {
        match self {
            ProtocolOpType::BindRequest => "bind request",
            ProtocolOpType::BindResponse => "bind response",
            ProtocolOpType::UnbindRequest => "unbind request",
            ProtocolOpType::SearchRequest => "search request",
            ProtocolOpType::SearchResultEntry => "search result entry",
            ProtocolOpType::SearchResultDone => "search result done",
            ProtocolOpType::ModifyRequest => "modify request",
            ProtocolOpType::ModifyResponse => "modify response",
            ProtocolOpType::AddRequest => "add request",
            ProtocolOpType::AddResponse => "add response",
            ProtocolOpType::DeleteRequest => "delete request",
            ProtocolOpType::DeleteResponse => "delete response",
            ProtocolOpType::ModifyDNRequest => "modify DN request",
            ProtocolOpType::ModifyDNResponse => "modify DN response",
            ProtocolOpType::CompareRequest => "compare request",
            ProtocolOpType::CompareResponse => "compare response",
            ProtocolOpType::AbandonRequest => "abandon request",
            ProtocolOpType::SearchResultReference => "search result reference",
            ProtocolOpType::ExtendedRequest => "extended request",
            ProtocolOpType::ExtendedResponse => "extended response",
            ProtocolOpType::IntermediateResponse => "intermediate response",
        }
    }
}

impl fmt::Display for ProtocolOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoding and decoding of one protocol operation type
///
/// Implementors provide the element form ([`encode_protocol_op`] and
/// [`decode_content`]); the tag check, error wrapping and stream forms are
/// derived from it. Operations that can read their fields straight from the
/// stream override [`read_from`] and [`write_to`].
///
/// [`encode_protocol_op`]: ProtocolOpCodec::encode_protocol_op
/// [`decode_content`]: ProtocolOpCodec::decode_content
/// [`read_from`]: ProtocolOpCodec::read_from
/// [`write_to`]: ProtocolOpCodec::write_to
pub trait ProtocolOpCodec: Sized {
    /// The operation's fixed application type
    const TYPE: ProtocolOpType;

    /// Encode this operation as an element of type [`Self::TYPE`]
    fn encode_protocol_op(&self) -> BerElement;

    /// Decode the fields of an element whose type was already checked
    fn decode_content(element: &BerElement) -> LdapResult<Self>;

    /// Decode an operation from an element that was already read
    ///
    /// # Errors
    /// Returns [`LdapError::Decoding`] naming the operation if the type byte
    /// is not [`Self::TYPE`] or the content is malformed
    fn decode_protocol_op(element: &BerElement) -> LdapResult<Self> {
        if element.tag() != Self::TYPE.tag() {
            return Err(LdapError::decoding(format!(
                "cannot decode {}: expected BER type 0x{:02x}, got 0x{:02x}",
                Self::TYPE,
                Self::TYPE.tag(),
                element.tag()
            )));
        }
        Self::decode_content(element).decoding_context(|| format!("cannot decode {}", Self::TYPE))
    }

    /// Write this operation to an encoder
    fn write_to(&self, encoder: &mut BerEncoder) {
        encoder.add_element(&self.encode_protocol_op());
    }

    /// Read this operation from a decoder positioned at its element
    fn read_from(decoder: &mut BerDecoder<'_>) -> LdapResult<Self> {
        let element = decoder
            .read_element()
            .decoding_context(|| format!("cannot read {}", Self::TYPE))?;
        Self::decode_protocol_op(&element)
    }
}

macro_rules! protocol_ops {
    ($($variant:ident($op:ty)),* $(,)?) => {
        /// Any LDAP protocol operation
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum ProtocolOp {
            $($variant($op),)*
        }

        impl ProtocolOp {
            /// The operation's application type
            pub fn op_type(&self) -> ProtocolOpType {
                match self {
                    $(ProtocolOp::$variant(_) => ProtocolOpType::$variant,)*
                }
            }

            /// Encode the operation as an element
            pub fn encode(&self) -> BerElement {
                match self {
                    $(ProtocolOp::$variant(op) => op.encode_protocol_op(),)*
                }
            }

            /// Write the operation to an encoder
            pub fn write_to(&self, encoder: &mut BerEncoder) {
                match self {
                    $(ProtocolOp::$variant(op) => op.write_to(encoder),)*
                }
            }

            /// Decode any operation, selecting the type from the type byte
            ///
            /// # Errors
            /// Returns [`LdapError::Decoding`] if the type byte is not an LDAP
            /// operation type or the operation is malformed
            pub fn decode(element: &BerElement) -> LdapResult<Self> {
                let op_type = ProtocolOpType::from_tag(element.tag()).ok_or_else(|| {
                    LdapError::decoding(format!(
                        "unknown protocol operation type 0x{:02x}",
                        element.tag()
                    ))
                })?;
                log::trace!("decoding {} from element", op_type);
                match op_type {
                    $(ProtocolOpType::$variant => {
                        <$op>::decode_protocol_op(element).map(ProtocolOp::$variant)
                    })*
                }
            }

            /// Read any operation from a decoder positioned at its element
            pub fn read_from(decoder: &mut BerDecoder<'_>) -> LdapResult<Self> {
                let tag = decoder
                    .peek_type()
                    .ok_or_else(|| LdapError::decoding("no protocol operation to read"))?;
                let op_type = ProtocolOpType::from_tag(tag).ok_or_else(|| {
                    LdapError::decoding(format!("unknown protocol operation type 0x{:02x}", tag))
                })?;
                log::trace!("reading {} from stream", op_type);
                match op_type {
                    $(ProtocolOpType::$variant => {
                        <$op>::read_from(decoder).map(ProtocolOp::$variant)
                    })*
                }
            }
        }

        $(
            impl From<$op> for ProtocolOp {
                fn from(op: $op) -> Self {
                    ProtocolOp::$variant(op)
                }
            }
        )*
    };
}

protocol_ops! {
    BindRequest(BindRequestProtocolOp),
    BindResponse(BindResponseProtocolOp),
    UnbindRequest(UnbindRequestProtocolOp),
    SearchRequest(SearchRequestProtocolOp),
    SearchResultEntry(SearchResultEntryProtocolOp),
    SearchResultDone(SearchResultDoneProtocolOp),
    SearchResultReference(SearchResultReferenceProtocolOp),
    ModifyRequest(ModifyRequestProtocolOp),
    ModifyResponse(ModifyResponseProtocolOp),
    AddRequest(AddRequestProtocolOp),
    AddResponse(AddResponseProtocolOp),
    DeleteRequest(DeleteRequestProtocolOp),
    DeleteResponse(DeleteResponseProtocolOp),
    ModifyDNRequest(ModifyDNRequestProtocolOp),
    ModifyDNResponse(ModifyDNResponseProtocolOp),
    CompareRequest(CompareRequestProtocolOp),
    CompareResponse(CompareResponseProtocolOp),
    AbandonRequest(AbandonRequestProtocolOp),
    ExtendedRequest(ExtendedRequestProtocolOp),
    ExtendedResponse(ExtendedResponseProtocolOp),
    IntermediateResponse(IntermediateResponseProtocolOp),
}

impl ProtocolOp {
    /// Decode an operation from exactly one encoded element
    pub fn from_bytes(data: &[u8]) -> LdapResult<Self> {
        let element = BerElement::decode(data)
            .decoding_context(|| "cannot read the protocol operation element")?;
        Self::decode(&element)
    }

    /// Encode the operation to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode().encode()
    }

    /// Whether this operation is sent by clients
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            ProtocolOp::BindRequest(_)
                | ProtocolOp::UnbindRequest(_)
                | ProtocolOp::SearchRequest(_)
                | ProtocolOp::ModifyRequest(_)
                | ProtocolOp::AddRequest(_)
                | ProtocolOp::DeleteRequest(_)
                | ProtocolOp::ModifyDNRequest(_)
                | ProtocolOp::CompareRequest(_)
                | ProtocolOp::AbandonRequest(_)
                | ProtocolOp::ExtendedRequest(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{Attribute, Modification, ModificationType};
    use crate::filter::Filter;
    use crate::result::LdapResultComponents;
    use bytes::Bytes;
    use ldap_core::{Oid, ResultCode};

    fn all_ops() -> Vec<ProtocolOp> {
        let success = LdapResultComponents::from_result_code(ResultCode::SUCCESS);
        let referral = LdapResultComponents::new(
            ResultCode::REFERRAL,
            Some("dc=example,dc=com".to_string()),
            Some("see elsewhere".to_string()),
            vec!["ldap://ds.example.com/".to_string()],
        );

        vec![
            BindRequestProtocolOp::simple("cn=admin", Bytes::from_static(b"secret")).into(),
            BindRequestProtocolOp::sasl("", "EXTERNAL", None).into(),
            BindRequestProtocolOp::sasl("", "PLAIN", Some(Bytes::from_static(b"\0u\0p"))).into(),
            BindResponseProtocolOp::new(success.clone(), None).into(),
            BindResponseProtocolOp::new(
                LdapResultComponents::from_result_code(ResultCode::SASL_BIND_IN_PROGRESS),
                Some(Bytes::from_static(b"challenge")),
            )
            .into(),
            UnbindRequestProtocolOp::new().into(),
            SearchRequestProtocolOp::new(
                "dc=example,dc=com",
                SearchScope::Subtree,
                DereferencePolicy::Never,
                100,
                30,
                false,
                Filter::equality("uid", "jdoe"),
                vec!["cn".to_string(), "mail".to_string()],
            )
            .into(),
            SearchResultEntryProtocolOp::new(
                "uid=jdoe,dc=example,dc=com",
                vec![Attribute::from_strings("cn", ["John Doe"])],
            )
            .into(),
            SearchResultReferenceProtocolOp::new(vec!["ldap://other.example.com/".to_string()])
                .into(),
            SearchResultDoneProtocolOp::new(referral.clone()).into(),
            ModifyRequestProtocolOp::new(
                "uid=jdoe,dc=example,dc=com",
                vec![Modification::new(
                    ModificationType::Replace,
                    Attribute::from_strings("mail", ["jdoe@example.com"]),
                )],
            )
            .into(),
            ModifyResponseProtocolOp::new(success.clone()).into(),
            AddRequestProtocolOp::new(
                "ou=people,dc=example,dc=com",
                vec![Attribute::from_strings("objectClass", ["top", "organizationalUnit"])],
            )
            .into(),
            AddResponseProtocolOp::new(success.clone()).into(),
            DeleteRequestProtocolOp::new("uid=jdoe,dc=example,dc=com").into(),
            DeleteResponseProtocolOp::new(success.clone()).into(),
            ModifyDNRequestProtocolOp::new("uid=jdoe,dc=example,dc=com", "uid=john", true, None)
                .into(),
            ModifyDNRequestProtocolOp::new(
                "uid=jdoe,dc=example,dc=com",
                "uid=jdoe",
                false,
                Some("ou=archive,dc=example,dc=com".to_string()),
            )
            .into(),
            ModifyDNResponseProtocolOp::new(success.clone()).into(),
            CompareRequestProtocolOp::new(
                "uid=jdoe,dc=example,dc=com",
                "cn",
                Bytes::from_static(b"John"),
            )
            .into(),
            CompareResponseProtocolOp::new(LdapResultComponents::from_result_code(
                ResultCode::COMPARE_TRUE,
            ))
            .into(),
            AbandonRequestProtocolOp::new(42).into(),
            ExtendedRequestProtocolOp::new(Oid::new("1.3.6.1.4.1.1466.20037").unwrap(), None)
                .into(),
            ExtendedRequestProtocolOp::new(
                Oid::new("1.3.6.1.4.1.30221.2.5.2").unwrap(),
                Some(Bytes::from_static(b"\x30\x03\x04\x01\x41")),
            )
            .into(),
            ExtendedResponseProtocolOp::new(success.clone(), None, None).into(),
            ExtendedResponseProtocolOp::new(
                referral,
                Some("1.3.6.1.4.1.30221.2.5.1".to_string()),
                Some(Bytes::from_static(b"txn")),
            )
            .into(),
            IntermediateResponseProtocolOp::new(None, None).into(),
            IntermediateResponseProtocolOp::new(
                Some("1.3.6.1.4.1.4203.1.9.1.4".to_string()),
                Some(Bytes::from_static(b"\x00")),
            )
            .into(),
        ]
    }

    #[test]
    fn test_every_operation_round_trips() {
        for op in all_ops() {
            let element = op.encode();
            assert_eq!(element.tag(), op.op_type().tag(), "{}", op.op_type());

            let decoded = ProtocolOp::decode(&element).unwrap();
            assert_eq!(decoded, op);

            let bytes = op.to_bytes();
            assert_eq!(ProtocolOp::from_bytes(&bytes).unwrap(), op);
        }
    }

    #[test]
    fn test_element_and_stream_paths_agree() {
        for op in all_ops() {
            let mut encoder = BerEncoder::new();
            op.write_to(&mut encoder);
            let bytes = encoder.into_bytes();
            assert_eq!(bytes, op.to_bytes());

            let mut decoder = BerDecoder::new(&bytes);
            let streamed = ProtocolOp::read_from(&mut decoder).unwrap();
            assert!(!decoder.has_remaining());
            assert_eq!(streamed, ProtocolOp::from_bytes(&bytes).unwrap());
        }
    }

    #[test]
    fn test_every_type_is_covered() {
        let mut seen: Vec<ProtocolOpType> = all_ops().iter().map(ProtocolOp::op_type).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 21);
    }

    #[test]
    fn test_from_tag_is_total() {
        let mut known = 0;
        for tag in 0..=u8::MAX {
            if let Some(op_type) = ProtocolOpType::from_tag(tag) {
                assert_eq!(op_type.tag(), tag);
                known += 1;
            }
        }
        assert_eq!(known, 21);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let element = BerElement::universal_sequence(&[]);
        assert!(ProtocolOp::decode(&element).unwrap_err().is_decoding_error());

        let bytes = [0x7A, 0x00];
        let mut decoder = BerDecoder::new(&bytes);
        assert!(ProtocolOp::read_from(&mut decoder).is_err());
    }

    #[test]
    fn test_wrong_type_for_specific_decoder() {
        let success = LdapResultComponents::from_result_code(ResultCode::SUCCESS);
        let element = AddResponseProtocolOp::new(success).encode_protocol_op();
        let error = DeleteResponseProtocolOp::decode_protocol_op(&element).unwrap_err();
        assert!(error.is_decoding_error());
    }

    #[test]
    fn test_truncated_input_rejected() {
        let op = ExtendedRequestProtocolOp::new(
            Oid::new("1.2.3").unwrap(),
            Some(Bytes::from_static(b"v")),
        );
        let bytes = op.encode_protocol_op().encode();
        for len in 0..bytes.len() {
            assert!(ProtocolOp::from_bytes(&bytes[..len]).is_err());
            let mut decoder = BerDecoder::new(&bytes[..len]);
            assert!(ProtocolOp::read_from(&mut decoder).is_err());
        }
    }

    #[test]
    fn test_request_classification() {
        assert!(ProtocolOp::from(UnbindRequestProtocolOp::new()).is_request());
        assert!(!ProtocolOp::from(DeleteResponseProtocolOp::new(
            LdapResultComponents::from_result_code(ResultCode::SUCCESS)
        ))
        .is_request());
    }
}
