//! LDAP controls and the control list codec
//!
//! ```text
//! Control ::= SEQUENCE {
//!      controlType             LDAPOID,
//!      criticality             BOOLEAN DEFAULT FALSE,
//!      controlValue            OCTET STRING OPTIONAL }
//! ```

use bytes::Bytes;
use ldap_asn1::ber::types::{
    UNIVERSAL_BOOLEAN_TYPE, UNIVERSAL_OCTET_STRING_TYPE, UNIVERSAL_SEQUENCE_TYPE,
};
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult, Oid};
use std::fmt;

/// BER type of the controls element inside an `LDAPMessage`
pub const MESSAGE_CONTROLS_TYPE: u8 = 0xA0;

/// A request or response control
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Control {
    oid: Oid,
    critical: bool,
    value: Option<Bytes>,
}

impl Control {
    /// Create a new control
    pub fn new(oid: Oid, critical: bool, value: Option<Bytes>) -> Self {
        Self {
            oid,
            critical,
            value,
        }
    }

    /// Create a non-critical control without a value
    ///
    /// # Errors
    /// Returns error if the OID is empty
    pub fn with_oid(oid: &str) -> LdapResult<Self> {
        Ok(Self::new(Oid::new(oid)?, false, None))
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }

    /// Encode this control as a universal SEQUENCE
    ///
    /// The criticality is omitted when false (its DEFAULT).
    pub fn encode(&self) -> BerElement {
        let mut elements = Vec::with_capacity(3);
        elements.push(BerElement::universal_octet_string(self.oid.as_str().to_string()));
        if self.critical {
            elements.push(BerElement::universal_boolean(true));
        }
        if let Some(value) = &self.value {
            elements.push(BerElement::universal_octet_string(value.clone()));
        }
        BerElement::universal_sequence(&elements)
    }

    /// Decode a control from its SEQUENCE element
    pub fn decode(element: &BerElement) -> LdapResult<Self> {
        let elements = element
            .decode_as_sequence()
            .decoding_context(|| "control is not a valid sequence")?;
        if elements.is_empty() || elements.len() > 3 {
            return Err(LdapError::decoding(format!(
                "control sequence must have between 1 and 3 elements, got {}",
                elements.len()
            )));
        }

        let oid = elements[0]
            .decode_as_string()
            .and_then(Oid::new)
            .decoding_context(|| "cannot decode the control OID")?;

        let mut critical = false;
        let mut value = None;
        for e in &elements[1..] {
            match e.tag() {
                UNIVERSAL_BOOLEAN_TYPE if value.is_none() => {
                    critical = e
                        .decode_as_boolean()
                        .decoding_context(|| {
                            format!("cannot decode the criticality of control {}", oid)
                        })?;
                }
                UNIVERSAL_OCTET_STRING_TYPE if value.is_none() => {
                    value = Some(e.decode_as_octet_string());
                }
                other => {
                    return Err(LdapError::decoding(format!(
                        "unexpected element type 0x{:02x} in control {}",
                        other, oid
                    )));
                }
            }
        }

        Ok(Self::new(oid, critical, value))
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Control(oid={}, isCritical={}", self.oid, self.critical)?;
        if let Some(value) = &self.value {
            write!(f, ", valueLength={}", value.len())?;
        }
        f.write_str(")")
    }
}

/// Encode a list of controls as a universal SEQUENCE
pub fn encode_controls(controls: &[Control]) -> BerElement {
    encode_controls_with_type(UNIVERSAL_SEQUENCE_TYPE, controls)
}

/// Encode a list of controls as a SEQUENCE with the given type
pub fn encode_controls_with_type(tag: u8, controls: &[Control]) -> BerElement {
    let elements: Vec<BerElement> = controls.iter().map(Control::encode).collect();
    BerElement::sequence(tag, &elements)
}

/// Decode a list of controls from a SEQUENCE element of any type
pub fn decode_controls(element: &BerElement) -> LdapResult<Vec<Control>> {
    element
        .decode_as_sequence()
        .decoding_context(|| "controls element is not a valid sequence")?
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Control::decode(e).decoding_context(|| format!("cannot decode control {}", i))
        })
        .collect()
}
