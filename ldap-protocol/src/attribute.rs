//! Attributes and modifications carried by add, modify and search operations

use bytes::Bytes;
use ldap_asn1::ber::types::{UNIVERSAL_OCTET_STRING_TYPE, UNIVERSAL_SET_TYPE};
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult};
use serde::{Deserialize, Serialize};

/// An attribute description with its values
///
/// ```text
/// Attribute ::= SEQUENCE {
///      type       AttributeDescription,
///      vals       SET OF value AttributeValue }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    name: String,
    values: Vec<Bytes>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, values: Vec<Bytes>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Create an attribute from string values
    pub fn from_strings<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|v| Bytes::from(v.into().into_bytes()))
            .collect();
        Self::new(name, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Bytes] {
        &self.values
    }

    pub fn encode(&self) -> BerElement {
        let values: Vec<BerElement> = self
            .values
            .iter()
            .map(|v| BerElement::octet_string(UNIVERSAL_OCTET_STRING_TYPE, v.clone()))
            .collect();
        BerElement::universal_sequence(&[
            BerElement::universal_octet_string(self.name.clone()),
            BerElement::sequence(UNIVERSAL_SET_TYPE, &values),
        ])
    }

    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        let elements = element
            .decode_as_sequence()
            .decoding_context(|| "attribute is not a valid sequence")?;
        if elements.len() != 2 {
            return Err(LdapError::decoding(format!(
                "attribute sequence must have 2 elements, got {}",
                elements.len()
            )));
        }

        let name = elements[0]
            .decode_as_string()
            .decoding_context(|| "cannot decode the attribute description")?;
        let values = elements[1]
            .decode_as_sequence()
            .decoding_context(|| format!("cannot decode the values of attribute {}", name))?
            .iter()
            .map(BerElement::decode_as_octet_string)
            .collect();
        Ok(Self { name, values })
    }
}

/// Operation applied by a modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModificationType {
    Add = 0,
    Delete = 1,
    Replace = 2,
    /// RFC 4525
    Increment = 3,
}

impl ModificationType {
    pub fn from_i32(value: i32) -> LdapResult<Self> {
        match value {
            0 => Ok(ModificationType::Add),
            1 => Ok(ModificationType::Delete),
            2 => Ok(ModificationType::Replace),
            3 => Ok(ModificationType::Increment),
            _ => Err(LdapError::decoding(format!("invalid modification type {}", value))),
        }
    }
}

/// A single change of a modify request
///
/// ```text
/// change ::= SEQUENCE {
///      operation       ENUMERATED { add (0), delete (1), replace (2), ... },
///      modification    PartialAttribute }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Modification {
    mod_type: ModificationType,
    attribute: Attribute,
}

impl Modification {
    pub fn new(mod_type: ModificationType, attribute: Attribute) -> Self {
        Self {
            mod_type,
            attribute,
        }
    }

    pub fn mod_type(&self) -> ModificationType {
        self.mod_type
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn encode(&self) -> BerElement {
        BerElement::universal_sequence(&[
            BerElement::universal_enumerated(self.mod_type as i32),
            self.attribute.encode(),
        ])
    }

    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        let elements = element
            .decode_as_sequence()
            .decoding_context(|| "modification is not a valid sequence")?;
        if elements.len() != 2 {
            return Err(LdapError::decoding(format!(
                "modification sequence must have 2 elements, got {}",
                elements.len()
            )));
        }

        let mod_type = elements[0]
            .decode_as_enumerated()
            .and_then(ModificationType::from_i32)
            .decoding_context(|| "cannot decode the modification type")?;
        let attribute = Attribute::decode(&elements[1])?;
        Ok(Self::new(mod_type, attribute))
    }
}

/// Encode attributes as a universal SEQUENCE OF Attribute
pub(crate) fn encode_attributes(attributes: &[Attribute]) -> BerElement {
    let elements: Vec<BerElement> = attributes.iter().map(Attribute::encode).collect();
    BerElement::universal_sequence(&elements)
}

/// Decode a SEQUENCE OF Attribute
pub(crate) fn decode_attributes(element: &BerElement) -> LdapResult<Vec<Attribute>> {
    element
        .decode_as_sequence()
        .decoding_context(|| "attribute list is not a valid sequence")?
        .iter()
        .map(Attribute::decode)
        .collect()
}
