//! Search filters (RFC 4511 section 4.5.1) and their string form (RFC 4515)

use bytes::Bytes;
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult};
use std::fmt;

pub const FILTER_TYPE_AND: u8 = 0xA0;
pub const FILTER_TYPE_OR: u8 = 0xA1;
pub const FILTER_TYPE_NOT: u8 = 0xA2;
pub const FILTER_TYPE_EQUALITY: u8 = 0xA3;
pub const FILTER_TYPE_SUBSTRING: u8 = 0xA4;
pub const FILTER_TYPE_GREATER_OR_EQUAL: u8 = 0xA5;
pub const FILTER_TYPE_LESS_OR_EQUAL: u8 = 0xA6;
pub const FILTER_TYPE_PRESENCE: u8 = 0x87;
pub const FILTER_TYPE_APPROXIMATE_MATCH: u8 = 0xA8;
pub const FILTER_TYPE_EXTENSIBLE_MATCH: u8 = 0xA9;

const SUBSTRING_TYPE_INITIAL: u8 = 0x80;
const SUBSTRING_TYPE_ANY: u8 = 0x81;
const SUBSTRING_TYPE_FINAL: u8 = 0x82;

const EXTENSIBLE_TYPE_MATCHING_RULE: u8 = 0x81;
const EXTENSIBLE_TYPE_ATTRIBUTE: u8 = 0x82;
const EXTENSIBLE_TYPE_VALUE: u8 = 0x83;
const EXTENSIBLE_TYPE_DN_ATTRIBUTES: u8 = 0x84;

/// Maximum nesting of AND/OR/NOT accepted when decoding
pub const MAX_FILTER_DEPTH: usize = 100;

/// A search filter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Equality {
        attribute: String,
        value: Bytes,
    },
    /// At least one of `initial`, `any` or `final_value` is present
    Substring {
        attribute: String,
        initial: Option<Bytes>,
        any: Vec<Bytes>,
        final_value: Option<Bytes>,
    },
    GreaterOrEqual {
        attribute: String,
        value: Bytes,
    },
    LessOrEqual {
        attribute: String,
        value: Bytes,
    },
    Presence(String),
    ApproximateMatch {
        attribute: String,
        value: Bytes,
    },
    /// At least one of `matching_rule` or `attribute` is present
    ExtensibleMatch {
        matching_rule: Option<String>,
        attribute: Option<String>,
        value: Bytes,
        dn_attributes: bool,
    },
}

impl Filter {
    /// Equality filter with a string value
    pub fn equality(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Equality {
            attribute: attribute.into(),
            value: Bytes::from(value.into().into_bytes()),
        }
    }

    /// Presence filter `(attribute=*)`
    pub fn presence(attribute: impl Into<String>) -> Self {
        Filter::Presence(attribute.into())
    }

    /// Substring filter
    ///
    /// # Errors
    /// Returns error if no component is given
    pub fn substring(
        attribute: impl Into<String>,
        initial: Option<Bytes>,
        any: Vec<Bytes>,
        final_value: Option<Bytes>,
    ) -> LdapResult<Self> {
        if initial.is_none() && any.is_empty() && final_value.is_none() {
            return Err(LdapError::InvalidData(
                "substring filter needs at least one component".to_string(),
            ));
        }
        Ok(Filter::Substring {
            attribute: attribute.into(),
            initial,
            any,
            final_value,
        })
    }

    /// Extensible match filter
    ///
    /// # Errors
    /// Returns error if neither a matching rule nor an attribute is given
    pub fn extensible_match(
        matching_rule: Option<String>,
        attribute: Option<String>,
        value: Bytes,
        dn_attributes: bool,
    ) -> LdapResult<Self> {
        if matching_rule.is_none() && attribute.is_none() {
            return Err(LdapError::InvalidData(
                "extensible match filter needs a matching rule or an attribute".to_string(),
            ));
        }
        Ok(Filter::ExtensibleMatch {
            matching_rule,
            attribute,
            value,
            dn_attributes,
        })
    }

    /// BER type of this filter's element
    pub fn filter_type(&self) -> u8 {
        match self {
            Filter::And(_) => FILTER_TYPE_AND,
            Filter::Or(_) => FILTER_TYPE_OR,
            Filter::Not(_) => FILTER_TYPE_NOT,
            Filter::Equality { .. } => FILTER_TYPE_EQUALITY,
            Filter::Substring { .. } => FILTER_TYPE_SUBSTRING,
            Filter::GreaterOrEqual { .. } => FILTER_TYPE_GREATER_OR_EQUAL,
            Filter::LessOrEqual { .. } => FILTER_TYPE_LESS_OR_EQUAL,
            Filter::Presence(_) => FILTER_TYPE_PRESENCE,
            Filter::ApproximateMatch { .. } => FILTER_TYPE_APPROXIMATE_MATCH,
            Filter::ExtensibleMatch { .. } => FILTER_TYPE_EXTENSIBLE_MATCH,
        }
    }

    pub fn encode(&self) -> BerElement {
        let tag = self.filter_type();
        match self {
            Filter::And(filters) | Filter::Or(filters) => {
                let elements: Vec<BerElement> = filters.iter().map(Filter::encode).collect();
                BerElement::sequence(tag, &elements)
            }
            Filter::Not(filter) => BerElement::new(tag, filter.encode().encode()),
            Filter::Equality { attribute, value }
            | Filter::GreaterOrEqual { attribute, value }
            | Filter::LessOrEqual { attribute, value }
            | Filter::ApproximateMatch { attribute, value } => BerElement::sequence(
                tag,
                &[
                    BerElement::universal_octet_string(attribute.clone()),
                    BerElement::universal_octet_string(value.clone()),
                ],
            ),
            Filter::Substring {
                attribute,
                initial,
                any,
                final_value,
            } => {
                let mut components = Vec::with_capacity(any.len() + 2);
                if let Some(initial) = initial {
                    components.push(BerElement::octet_string(
                        SUBSTRING_TYPE_INITIAL,
                        initial.clone(),
                    ));
                }
                for fragment in any {
                    components.push(BerElement::octet_string(SUBSTRING_TYPE_ANY, fragment.clone()));
                }
                if let Some(final_value) = final_value {
                    components.push(BerElement::octet_string(
                        SUBSTRING_TYPE_FINAL,
                        final_value.clone(),
                    ));
                }
                BerElement::sequence(
                    tag,
                    &[
                        BerElement::universal_octet_string(attribute.clone()),
                        BerElement::universal_sequence(&components),
                    ],
                )
            }
            Filter::Presence(attribute) => BerElement::octet_string(tag, attribute.clone()),
            Filter::ExtensibleMatch {
                matching_rule,
                attribute,
                value,
                dn_attributes,
            } => {
                let mut elements = Vec::with_capacity(4);
                if let Some(rule) = matching_rule {
                    elements.push(BerElement::octet_string(
                        EXTENSIBLE_TYPE_MATCHING_RULE,
                        rule.clone(),
                    ));
                }
                if let Some(attribute) = attribute {
                    elements.push(BerElement::octet_string(
                        EXTENSIBLE_TYPE_ATTRIBUTE,
                        attribute.clone(),
                    ));
                }
                elements.push(BerElement::octet_string(EXTENSIBLE_TYPE_VALUE, value.clone()));
                if *dn_attributes {
                    elements.push(BerElement::boolean(EXTENSIBLE_TYPE_DN_ATTRIBUTES, true));
                }
                BerElement::sequence(tag, &elements)
            }
        }
    }

    /// Decode a filter element
    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        Self::decode_nested(element, 0)
    }

    fn decode_nested(element: &BerElement, depth: usize) -> LdapResult<Self> {
        if depth > MAX_FILTER_DEPTH {
            return Err(LdapError::decoding(format!(
                "filter nesting exceeds the maximum depth {}",
                MAX_FILTER_DEPTH
            )));
        }

        match element.tag() {
            FILTER_TYPE_AND | FILTER_TYPE_OR => {
                let filters = element
                    .decode_as_sequence()
                    .decoding_context(|| "cannot decode the filter set")?
                    .iter()
                    .map(|e| Self::decode_nested(e, depth + 1))
                    .collect::<LdapResult<Vec<_>>>()?;
                if element.tag() == FILTER_TYPE_AND {
                    Ok(Filter::And(filters))
                } else {
                    Ok(Filter::Or(filters))
                }
            }
            FILTER_TYPE_NOT => {
                let inner = BerElement::decode(element.value())
                    .decoding_context(|| "cannot decode the NOT filter component")?;
                Ok(Filter::Not(Box::new(Self::decode_nested(&inner, depth + 1)?)))
            }
            FILTER_TYPE_EQUALITY
            | FILTER_TYPE_GREATER_OR_EQUAL
            | FILTER_TYPE_LESS_OR_EQUAL
            | FILTER_TYPE_APPROXIMATE_MATCH => {
                let (attribute, value) = decode_assertion(element)?;
                Ok(match element.tag() {
                    FILTER_TYPE_EQUALITY => Filter::Equality { attribute, value },
                    FILTER_TYPE_GREATER_OR_EQUAL => Filter::GreaterOrEqual { attribute, value },
                    FILTER_TYPE_LESS_OR_EQUAL => Filter::LessOrEqual { attribute, value },
                    _ => Filter::ApproximateMatch { attribute, value },
                })
            }
            FILTER_TYPE_SUBSTRING => decode_substring(element),
            FILTER_TYPE_PRESENCE => element
                .decode_as_string()
                .map(Filter::Presence)
                .decoding_context(|| "cannot decode the presence filter attribute"),
            FILTER_TYPE_EXTENSIBLE_MATCH => decode_extensible_match(element),
            other => Err(LdapError::decoding(format!(
                "unsupported filter type 0x{:02x}",
                other
            ))),
        }
    }
}

fn decode_assertion(element: &BerElement) -> LdapResult<(String, Bytes)> {
    let elements = element
        .decode_as_sequence()
        .decoding_context(|| "attribute value assertion is not a valid sequence")?;
    if elements.len() != 2 {
        return Err(LdapError::decoding(format!(
            "attribute value assertion must have 2 elements, got {}",
            elements.len()
        )));
    }
    let attribute = elements[0]
        .decode_as_string()
        .decoding_context(|| "cannot decode the assertion attribute")?;
    Ok((attribute, elements[1].decode_as_octet_string()))
}

fn decode_substring(element: &BerElement) -> LdapResult<Filter> {
    let elements = element
        .decode_as_sequence()
        .decoding_context(|| "substring filter is not a valid sequence")?;
    if elements.len() != 2 {
        return Err(LdapError::decoding(format!(
            "substring filter must have 2 elements, got {}",
            elements.len()
        )));
    }
    let attribute = elements[0]
        .decode_as_string()
        .decoding_context(|| "cannot decode the substring filter attribute")?;
    let components = elements[1]
        .decode_as_sequence()
        .decoding_context(|| "cannot decode the substring components")?;

    let mut initial = None;
    let mut any = Vec::new();
    let mut final_value = None;
    for component in &components {
        if final_value.is_some() {
            return Err(LdapError::decoding("substring component after the final component"));
        }
        match component.tag() {
            SUBSTRING_TYPE_INITIAL if initial.is_none() && any.is_empty() => {
                initial = Some(component.decode_as_octet_string());
            }
            SUBSTRING_TYPE_ANY => any.push(component.decode_as_octet_string()),
            SUBSTRING_TYPE_FINAL => final_value = Some(component.decode_as_octet_string()),
            other => {
                return Err(LdapError::decoding(format!(
                    "unexpected substring component type 0x{:02x}",
                    other
                )));
            }
        }
    }

    Filter::substring(attribute, initial, any, final_value)
        .map_err(|e| LdapError::decoding_caused_by("invalid substring filter", e))
}

fn decode_extensible_match(element: &BerElement) -> LdapResult<Filter> {
    let elements = element
        .decode_as_sequence()
        .decoding_context(|| "extensible match filter is not a valid sequence")?;

    let mut matching_rule = None;
    let mut attribute = None;
    let mut value = None;
    let mut dn_attributes = false;
    for e in &elements {
        match e.tag() {
            EXTENSIBLE_TYPE_MATCHING_RULE if matching_rule.is_none() && value.is_none() => {
                matching_rule = Some(
                    e.decode_as_string()
                        .decoding_context(|| "cannot decode the extensible match rule ID")?,
                );
            }
            EXTENSIBLE_TYPE_ATTRIBUTE if attribute.is_none() && value.is_none() => {
                attribute = Some(
                    e.decode_as_string()
                        .decoding_context(|| "cannot decode the extensible match attribute")?,
                );
            }
            EXTENSIBLE_TYPE_VALUE if value.is_none() => value = Some(e.decode_as_octet_string()),
            EXTENSIBLE_TYPE_DN_ATTRIBUTES if value.is_some() => {
                dn_attributes = e
                    .decode_as_boolean()
                    .decoding_context(|| "cannot decode the extensible match dnAttributes flag")?;
            }
            other => {
                return Err(LdapError::decoding(format!(
                    "unexpected extensible match element type 0x{:02x}",
                    other
                )));
            }
        }
    }

    let value =
        value.ok_or_else(|| LdapError::decoding("extensible match filter has no assertion value"))?;
    Filter::extensible_match(matching_rule, attribute, value, dn_attributes)
        .map_err(|e| LdapError::decoding_caused_by("invalid extensible match filter", e))
}

/// Write a value with the RFC 4515 escapes
fn write_escaped(f: &mut fmt::Formatter<'_>, value: &[u8]) -> fmt::Result {
    for &b in value {
        match b {
            b'*' | b'(' | b')' | b'\\' | 0x00 | 0x80..=0xFF => write!(f, "\\{:02x}", b)?,
            _ => write!(f, "{}", b as char)?,
        }
    }
    Ok(())
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        match self {
            Filter::And(filters) | Filter::Or(filters) => {
                f.write_str(if matches!(self, Filter::And(_)) { "&" } else { "|" })?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
            }
            Filter::Not(filter) => write!(f, "!{}", filter)?,
            Filter::Equality { attribute, value } => {
                write!(f, "{}=", attribute)?;
                write_escaped(f, value)?;
            }
            Filter::GreaterOrEqual { attribute, value } => {
                write!(f, "{}>=", attribute)?;
                write_escaped(f, value)?;
            }
            Filter::LessOrEqual { attribute, value } => {
                write!(f, "{}<=", attribute)?;
                write_escaped(f, value)?;
            }
            Filter::ApproximateMatch { attribute, value } => {
                write!(f, "{}~=", attribute)?;
                write_escaped(f, value)?;
            }
            Filter::Substring {
                attribute,
                initial,
                any,
                final_value,
            } => {
                write!(f, "{}=", attribute)?;
                if let Some(initial) = initial {
                    write_escaped(f, initial)?;
                }
                f.write_str("*")?;
                for fragment in any {
                    write_escaped(f, fragment)?;
                    f.write_str("*")?;
                }
                if let Some(final_value) = final_value {
                    write_escaped(f, final_value)?;
                }
            }
            Filter::Presence(attribute) => write!(f, "{}=*", attribute)?,
            Filter::ExtensibleMatch {
                matching_rule,
                attribute,
                value,
                dn_attributes,
            } => {
                if let Some(attribute) = attribute {
                    f.write_str(attribute)?;
                }
                if *dn_attributes {
                    f.write_str(":dn")?;
                }
                if let Some(rule) = matching_rule {
                    write!(f, ":{}", rule)?;
                }
                f.write_str(":=")?;
                write_escaped(f, value)?;
            }
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    #[test]
    fn test_presence_encoding() {
        let filter = Filter::presence("objectClass");
        let mut expected = vec![0x87, 0x0B];
        expected.extend_from_slice(b"objectClass");
        assert_eq!(filter.encode().encode(), expected);
        assert_eq!(filter.to_string(), "(objectClass=*)");
    }

    #[test]
    fn test_equality_encoding() {
        let filter = Filter::equality("cn", "a");
        assert_eq!(
            filter.encode().encode(),
            vec![0xA3, 0x07, 0x04, 0x02, b'c', b'n', 0x04, 0x01, b'a']
        );
    }

    #[test]
    fn test_compound_round_trip() {
        let filter = Filter::And(vec![
            Filter::equality("objectClass", "person"),
            Filter::Or(vec![
                Filter::substring("cn", Some(bytes("ab")), vec![bytes("cd")], Some(bytes("ef")))
                    .unwrap(),
                Filter::Not(Box::new(Filter::presence("mail"))),
            ]),
            Filter::GreaterOrEqual {
                attribute: "age".to_string(),
                value: bytes("18"),
            },
            Filter::extensible_match(
                Some("2.5.13.2".to_string()),
                Some("sn".to_string()),
                bytes("x"),
                true,
            )
            .unwrap(),
        ]);
        assert_eq!(Filter::decode(&filter.encode()).unwrap(), filter);
        assert_eq!(
            filter.to_string(),
            "(&(objectClass=person)(|(cn=ab*cd*ef)(!(mail=*)))(age>=18)(sn:dn:2.5.13.2:=x))"
        );
    }

    #[test]
    fn test_display_escapes_special_characters() {
        let filter = Filter::equality("cn", "a*(b)\\");
        assert_eq!(filter.to_string(), "(cn=a\\2a\\28b\\29\\5c)");
    }

    #[test]
    fn test_empty_substring_rejected() {
        assert!(Filter::substring("cn", None, Vec::new(), None).is_err());

        let element = BerElement::sequence(
            FILTER_TYPE_SUBSTRING,
            &[BerElement::universal_octet_string("cn"), BerElement::universal_sequence(&[])],
        );
        assert!(Filter::decode(&element).unwrap_err().is_decoding_error());
    }

    #[test]
    fn test_substring_component_order_enforced() {
        let element = BerElement::sequence(
            FILTER_TYPE_SUBSTRING,
            &[
                BerElement::universal_octet_string("cn"),
                BerElement::universal_sequence(&[
                    BerElement::octet_string(SUBSTRING_TYPE_FINAL, "x"),
                    BerElement::octet_string(SUBSTRING_TYPE_INITIAL, "y"),
                ]),
            ],
        );
        assert!(Filter::decode(&element).is_err());
    }

    #[test]
    fn test_unknown_filter_type() {
        let element = BerElement::new(0xAF, Vec::<u8>::new());
        assert!(Filter::decode(&element).is_err());
    }

    #[test]
    fn test_depth_limit() {
        let mut filter = Filter::presence("cn");
        for _ in 0..(MAX_FILTER_DEPTH + 5) {
            filter = Filter::Not(Box::new(filter));
        }
        assert!(Filter::decode(&filter.encode()).is_err());
    }
}
