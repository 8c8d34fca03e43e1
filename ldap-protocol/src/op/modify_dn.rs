//! Modify DN request
//!
//! ```text
//! ModifyDNRequest ::= [APPLICATION 12] SEQUENCE {
//!      entry           LDAPDN,
//!      newrdn          RelativeLDAPDN,
//!      deleteoldrdn    BOOLEAN,
//!      newSuperior     [0] LDAPDN OPTIONAL }
//! ```

use super::{ProtocolOpCodec, ProtocolOpType};
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult};

pub const TYPE_NEW_SUPERIOR: u8 = 0x80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyDNRequestProtocolOp {
    dn: String,
    new_rdn: String,
    delete_old_rdn: bool,
    new_superior_dn: Option<String>,
}

impl ModifyDNRequestProtocolOp {
    pub fn new(
        dn: impl Into<String>,
        new_rdn: impl Into<String>,
        delete_old_rdn: bool,
        new_superior_dn: Option<String>,
    ) -> Self {
        Self {
            dn: dn.into(),
            new_rdn: new_rdn.into(),
            delete_old_rdn,
            new_superior_dn,
        }
    }

    pub fn dn(&self) -> &str {
        &self.dn
    }

    pub fn new_rdn(&self) -> &str {
        &self.new_rdn
    }

    pub fn delete_old_rdn(&self) -> bool {
        self.delete_old_rdn
    }

    /// The new parent, if the entry moves
    pub fn new_superior_dn(&self) -> Option<&str> {
        self.new_superior_dn.as_deref()
    }
}

impl ProtocolOpCodec for ModifyDNRequestProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::ModifyDNRequest;

    fn encode_protocol_op(&self) -> BerElement {
        let mut elements = vec![
            BerElement::universal_octet_string(self.dn.clone()),
            BerElement::universal_octet_string(self.new_rdn.clone()),
            BerElement::universal_boolean(self.delete_old_rdn),
        ];
        if let Some(superior) = &self.new_superior_dn {
            elements.push(BerElement::octet_string(TYPE_NEW_SUPERIOR, superior.clone()));
        }
        BerElement::sequence(Self::TYPE.tag(), &elements)
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let elements = element.decode_as_sequence()?;
        if elements.len() != 3 && elements.len() != 4 {
            return Err(LdapError::decoding(format!(
                "modify DN request must have 3 or 4 elements, got {}",
                elements.len()
            )));
        }

        let dn = elements[0]
            .decode_as_string()
            .decoding_context(|| "cannot decode the entry DN")?;
        let new_rdn = elements[1]
            .decode_as_string()
            .decoding_context(|| "cannot decode the new RDN")?;
        let delete_old_rdn = elements[2]
            .decode_as_boolean()
            .decoding_context(|| "cannot decode the deleteOldRDN flag")?;
        let new_superior_dn = elements
            .get(3)
            .map(|e| {
                e.expect_tag(TYPE_NEW_SUPERIOR)
                    .and_then(|_| e.decode_as_string())
                    .decoding_context(|| "cannot decode the new superior DN")
            })
            .transpose()?;

        Ok(Self::new(dn, new_rdn, delete_old_rdn, new_superior_dn))
    }
}
