//! `ModifyRequest ::= [APPLICATION 6] SEQUENCE { object LDAPDN, changes SEQUENCE OF change }`

use super::{ProtocolOpCodec, ProtocolOpType};
use crate::attribute::Modification;
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyRequestProtocolOp {
    dn: String,
    modifications: Vec<Modification>,
}

impl ModifyRequestProtocolOp {
    pub fn new(dn: impl Into<String>, modifications: Vec<Modification>) -> Self {
        Self {
            dn: dn.into(),
            modifications,
        }
    }

    pub fn dn(&self) -> &str {
        &self.dn
    }

    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }
}

impl ProtocolOpCodec for ModifyRequestProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::ModifyRequest;

    fn encode_protocol_op(&self) -> BerElement {
        let changes: Vec<BerElement> =
            self.modifications.iter().map(Modification::encode).collect();
        BerElement::sequence(
            Self::TYPE.tag(),
            &[
                BerElement::universal_octet_string(self.dn.clone()),
                BerElement::universal_sequence(&changes),
            ],
        )
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let elements = element.decode_as_sequence()?;
        if elements.len() != 2 {
            return Err(LdapError::decoding(format!(
                "modify request must have 2 elements, got {}",
                elements.len()
            )));
        }
        let dn = elements[0]
            .decode_as_string()
            .decoding_context(|| "cannot decode the target DN")?;
        let modifications = elements[1]
            .decode_as_sequence()
            .decoding_context(|| "cannot decode the list of changes")?
            .iter()
            .map(Modification::decode)
            .collect::<LdapResult<Vec<_>>>()?;
        Ok(Self::new(dn, modifications))
    }
}
