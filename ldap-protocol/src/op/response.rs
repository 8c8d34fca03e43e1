//! Responses that carry nothing but the `LDAPResult` components

use super::{ProtocolOpCodec, ProtocolOpType};
use crate::result::LdapResultComponents;
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult, ResultCode};
use std::fmt;

macro_rules! result_only_response {
    ($(#[$meta:meta])* $name:ident, $op_type:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            result: LdapResultComponents,
        }

        impl $name {
            pub fn new(result: LdapResultComponents) -> Self {
                Self { result }
            }

            pub fn result(&self) -> &LdapResultComponents {
                &self.result
            }

            pub fn result_code(&self) -> ResultCode {
                self.result.result_code()
            }
        }

        impl ProtocolOpCodec for $name {
            const TYPE: ProtocolOpType = ProtocolOpType::$op_type;

            fn encode_protocol_op(&self) -> BerElement {
                let mut elements = Vec::with_capacity(4);
                self.result.encode_into(&mut elements);
                BerElement::sequence(Self::TYPE.tag(), &elements)
            }

            fn decode_content(element: &BerElement) -> LdapResult<Self> {
                decode_result_only(element).map(Self::new)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.result)
            }
        }
    };
}

fn decode_result_only(element: &BerElement) -> LdapResult<LdapResultComponents> {
    let elements = element
        .decode_as_sequence()
        .decoding_context(|| "response is not a valid sequence")?;
    let (result, consumed) = LdapResultComponents::decode_from(&elements)?;
    if consumed != elements.len() {
        return Err(LdapError::decoding(format!(
            "unexpected element type 0x{:02x} after the result components",
            elements[consumed].tag()
        )));
    }
    Ok(result)
}

result_only_response!(
    /// `AddResponse ::= [APPLICATION 9] LDAPResult`
    AddResponseProtocolOp,
    AddResponse
);

result_only_response!(
    /// `DelResponse ::= [APPLICATION 11] LDAPResult`
    DeleteResponseProtocolOp,
    DeleteResponse
);

result_only_response!(
    /// `ModifyResponse ::= [APPLICATION 7] LDAPResult`
    ModifyResponseProtocolOp,
    ModifyResponse
);

result_only_response!(
    /// `ModifyDNResponse ::= [APPLICATION 13] LDAPResult`
    ModifyDNResponseProtocolOp,
    ModifyDNResponse
);

result_only_response!(
    /// `CompareResponse ::= [APPLICATION 15] LDAPResult`
    ///
    /// The outcome of the comparison is the result code
    /// (`compareTrue` or `compareFalse`).
    CompareResponseProtocolOp,
    CompareResponse
);

result_only_response!(
    /// `SearchResultDone ::= [APPLICATION 5] LDAPResult`
    SearchResultDoneProtocolOp,
    SearchResultDone
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_response_encoding() {
        let op = DeleteResponseProtocolOp::new(LdapResultComponents::from_result_code(
            ResultCode::NO_SUCH_OBJECT,
        ));
        assert_eq!(
            op.encode_protocol_op().encode(),
            vec![0x6B, 0x07, 0x0A, 0x01, 0x20, 0x04, 0x00, 0x04, 0x00]
        );
    }

    #[test]
    fn test_trailing_element_rejected() {
        let element = BerElement::sequence(
            0x69,
            &[
                BerElement::universal_enumerated(0),
                BerElement::universal_octet_string(""),
                BerElement::universal_octet_string(""),
                BerElement::universal_integer(1),
            ],
        );
        assert!(AddResponseProtocolOp::decode_protocol_op(&element).is_err());
    }

    #[test]
    fn test_display() {
        let op = CompareResponseProtocolOp::new(LdapResultComponents::from_result_code(
            ResultCode::COMPARE_TRUE,
        ));
        assert_eq!(op.to_string(), "CompareResponseProtocolOp(resultCode=6 (compare true))");
    }
}
