//! Search request, result entry and result reference
//!
//! ```text
//! SearchRequest ::= [APPLICATION 3] SEQUENCE {
//!      baseObject      LDAPDN,
//!      scope           ENUMERATED,
//!      derefAliases    ENUMERATED,
//!      sizeLimit       INTEGER (0 ..  maxInt),
//!      timeLimit       INTEGER (0 ..  maxInt),
//!      typesOnly       BOOLEAN,
//!      filter          Filter,
//!      attributes      AttributeSelection }
//!
//! SearchResultEntry ::= [APPLICATION 4] SEQUENCE {
//!      objectName      LDAPDN,
//!      attributes      PartialAttributeList }
//!
//! SearchResultReference ::= [APPLICATION 19] SEQUENCE SIZE (1..MAX) OF uri URI
//! ```

use super::{ProtocolOpCodec, ProtocolOpType};
use crate::attribute::{decode_attributes, encode_attributes, Attribute};
use crate::filter::Filter;
use crate::result::{decode_string_sequence, encode_string_sequence};
use ldap_asn1::ber::types::UNIVERSAL_SEQUENCE_TYPE;
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult};
use serde::{Deserialize, Serialize};

/// Portion of the tree a search examines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchScope {
    BaseObject = 0,
    SingleLevel = 1,
    Subtree = 2,
    /// draft-sermersheim-ldap-subordinate-scope
    Subordinates = 3,
}

impl SearchScope {
    pub fn from_i32(value: i32) -> LdapResult<Self> {
        match value {
            0 => Ok(SearchScope::BaseObject),
            1 => Ok(SearchScope::SingleLevel),
            2 => Ok(SearchScope::Subtree),
            3 => Ok(SearchScope::Subordinates),
            _ => Err(LdapError::decoding(format!("invalid search scope {}", value))),
        }
    }
}

/// Alias dereferencing behavior of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DereferencePolicy {
    Never = 0,
    InSearching = 1,
    FindingBaseObject = 2,
    Always = 3,
}

impl DereferencePolicy {
    pub fn from_i32(value: i32) -> LdapResult<Self> {
        match value {
            0 => Ok(DereferencePolicy::Never),
            1 => Ok(DereferencePolicy::InSearching),
            2 => Ok(DereferencePolicy::FindingBaseObject),
            3 => Ok(DereferencePolicy::Always),
            _ => Err(LdapError::decoding(format!("invalid dereference policy {}", value))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequestProtocolOp {
    base_dn: String,
    scope: SearchScope,
    deref_policy: DereferencePolicy,
    size_limit: i32,
    time_limit: i32,
    types_only: bool,
    filter: Filter,
    attributes: Vec<String>,
}

impl SearchRequestProtocolOp {
    /// Create a search request
    ///
    /// Negative limits are stored as 0 (no limit).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_dn: impl Into<String>,
        scope: SearchScope,
        deref_policy: DereferencePolicy,
        size_limit: i32,
        time_limit: i32,
        types_only: bool,
        filter: Filter,
        attributes: Vec<String>,
    ) -> Self {
        Self {
            base_dn: base_dn.into(),
            scope,
            deref_policy,
            size_limit: size_limit.max(0),
            time_limit: time_limit.max(0),
            types_only,
            filter,
            attributes,
        }
    }

    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    pub fn deref_policy(&self) -> DereferencePolicy {
        self.deref_policy
    }

    pub fn size_limit(&self) -> i32 {
        self.size_limit
    }

    pub fn time_limit(&self) -> i32 {
        self.time_limit
    }

    pub fn types_only(&self) -> bool {
        self.types_only
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

impl ProtocolOpCodec for SearchRequestProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::SearchRequest;

    fn encode_protocol_op(&self) -> BerElement {
        BerElement::sequence(
            Self::TYPE.tag(),
            &[
                BerElement::universal_octet_string(self.base_dn.clone()),
                BerElement::universal_enumerated(self.scope as i32),
                BerElement::universal_enumerated(self.deref_policy as i32),
                BerElement::universal_integer(i64::from(self.size_limit)),
                BerElement::universal_integer(i64::from(self.time_limit)),
                BerElement::universal_boolean(self.types_only),
                self.filter.encode(),
                encode_string_sequence(UNIVERSAL_SEQUENCE_TYPE, &self.attributes),
            ],
        )
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        let elements = element.decode_as_sequence()?;
        if elements.len() != 8 {
            return Err(LdapError::decoding(format!(
                "search request must have 8 elements, got {}",
                elements.len()
            )));
        }

        let base_dn = elements[0]
            .decode_as_string()
            .decoding_context(|| "cannot decode the base DN")?;
        let scope = elements[1]
            .decode_as_enumerated()
            .and_then(SearchScope::from_i32)
            .decoding_context(|| "cannot decode the search scope")?;
        let deref_policy = elements[2]
            .decode_as_enumerated()
            .and_then(DereferencePolicy::from_i32)
            .decoding_context(|| "cannot decode the dereference policy")?;
        let size_limit = elements[3]
            .decode_as_integer()
            .decoding_context(|| "cannot decode the size limit")?;
        let time_limit = elements[4]
            .decode_as_integer()
            .decoding_context(|| "cannot decode the time limit")?;
        let types_only = elements[5]
            .decode_as_boolean()
            .decoding_context(|| "cannot decode the typesOnly flag")?;
        let filter = Filter::decode(&elements[6])
            .decoding_context(|| "cannot decode the search filter")?;
        let attributes = decode_string_sequence(&elements[7])
            .decoding_context(|| "cannot decode the requested attributes")?;

        Ok(Self::new(
            base_dn,
            scope,
            deref_policy,
            size_limit,
            time_limit,
            types_only,
            filter,
            attributes,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultEntryProtocolOp {
    dn: String,
    attributes: Vec<Attribute>,
}

impl SearchResultEntryProtocolOp {
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

    /// The attribute with the given name, ignoring case
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name().eq_ignore_ascii_case(name))
    }
}

impl ProtocolOpCodec for SearchResultEntryProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::SearchResultEntry;

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
                "search result entry must have 2 elements, got {}",
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultReferenceProtocolOp {
    referral_urls: Vec<String>,
}

impl SearchResultReferenceProtocolOp {
    pub fn new(referral_urls: Vec<String>) -> Self {
        Self { referral_urls }
    }

    pub fn referral_urls(&self) -> &[String] {
        &self.referral_urls
    }
}

impl ProtocolOpCodec for SearchResultReferenceProtocolOp {
    const TYPE: ProtocolOpType = ProtocolOpType::SearchResultReference;

    fn encode_protocol_op(&self) -> BerElement {
        encode_string_sequence(Self::TYPE.tag(), &self.referral_urls)
    }

    fn decode_content(element: &BerElement) -> LdapResult<Self> {
        decode_string_sequence(element)
            .decoding_context(|| "cannot decode the referral URLs")
            .map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_limits_are_clamped() {
        let op = SearchRequestProtocolOp::new(
            "",
            SearchScope::BaseObject,
            DereferencePolicy::Always,
            -1,
            -5,
            true,
            Filter::presence("objectClass"),
            Vec::new(),
        );
        assert_eq!(op.size_limit(), 0);
        assert_eq!(op.time_limit(), 0);
    }

    #[test]
    fn test_invalid_scope_rejected() {
        let op = SearchRequestProtocolOp::new(
            "dc=example,dc=com",
            SearchScope::Subtree,
            DereferencePolicy::Never,
            0,
            0,
            false,
            Filter::presence("objectClass"),
            Vec::new(),
        );
        let mut elements = op.encode_protocol_op().decode_as_sequence().unwrap();
        elements[1] = BerElement::universal_enumerated(9);
        let element = BerElement::sequence(0x63, &elements);
        let error = SearchRequestProtocolOp::decode_protocol_op(&element).unwrap_err();
        assert!(error.to_string().contains("search request"));
    }

    #[test]
    fn test_entry_attribute_lookup() {
        let entry = SearchResultEntryProtocolOp::new(
            "cn=test",
            vec![Attribute::from_strings("objectClass", ["top"])],
        );
        assert!(entry.attribute("objectclass").is_some());
        assert!(entry.attribute("cn").is_none());
    }
}
