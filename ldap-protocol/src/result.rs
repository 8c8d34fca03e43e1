//! The `LDAPResult` components shared by every response operation
//!
//! ```text
//! LDAPResult ::= SEQUENCE {
//!      resultCode         ENUMERATED,
//!      matchedDN          LDAPDN,
//!      diagnosticMessage  LDAPString,
//!      referral           [3] Referral OPTIONAL }
//! ```

use ldap_asn1::ber::types::UNIVERSAL_OCTET_STRING_TYPE;
use ldap_asn1::BerElement;
use ldap_core::{DecodeContext, LdapError, LdapResult, ResultCode};
use std::fmt;

/// BER type of the referral URL sequence in a response
pub const TYPE_REFERRAL_URLS: u8 = 0xA3;

/// Result code, matched DN, diagnostic message and referrals of a response
///
/// An empty matched DN or diagnostic message is the same as an absent one:
/// both encode as an empty OCTET STRING.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapResultComponents {
    result_code: ResultCode,
    matched_dn: Option<String>,
    diagnostic_message: Option<String>,
    referral_urls: Vec<String>,
}

impl LdapResultComponents {
    /// Create result components
    pub fn new(
        result_code: ResultCode,
        matched_dn: Option<String>,
        diagnostic_message: Option<String>,
        referral_urls: Vec<String>,
    ) -> Self {
        Self {
            result_code,
            matched_dn: matched_dn.filter(|s| !s.is_empty()),
            diagnostic_message: diagnostic_message.filter(|s| !s.is_empty()),
            referral_urls,
        }
    }

    /// Result components carrying only a result code
    pub fn from_result_code(result_code: ResultCode) -> Self {
        Self::new(result_code, None, None, Vec::new())
    }

    pub fn result_code(&self) -> ResultCode {
        self.result_code
    }

    pub fn matched_dn(&self) -> Option<&str> {
        self.matched_dn.as_deref()
    }

    pub fn diagnostic_message(&self) -> Option<&str> {
        self.diagnostic_message.as_deref()
    }

    pub fn referral_urls(&self) -> &[String] {
        &self.referral_urls
    }

    /// Append the encoded components to `elements`
    pub fn encode_into(&self, elements: &mut Vec<BerElement>) {
        elements.push(BerElement::universal_enumerated(self.result_code.value()));
        elements.push(BerElement::universal_octet_string(
            self.matched_dn.clone().unwrap_or_default(),
        ));
        elements.push(BerElement::universal_octet_string(
            self.diagnostic_message.clone().unwrap_or_default(),
        ));
        if !self.referral_urls.is_empty() {
            let urls: Vec<BerElement> = self
                .referral_urls
                .iter()
                .map(|url| BerElement::universal_octet_string(url.clone()))
                .collect();
            elements.push(BerElement::sequence(TYPE_REFERRAL_URLS, &urls));
        }
    }

    /// Decode the components from the start of a response's elements
    ///
    /// # Returns
    /// The components and the number of elements consumed (3 or 4)
    pub fn decode_from(elements: &[BerElement]) -> LdapResult<(Self, usize)> {
        if elements.len() < 3 {
            return Err(LdapError::decoding(format!(
                "response must have at least 3 elements, got {}",
                elements.len()
            )));
        }

        let result_code = elements[0]
            .decode_as_enumerated()
            .decoding_context(|| "cannot decode the result code")?;
        let matched_dn = elements[1]
            .decode_as_string()
            .decoding_context(|| "cannot decode the matched DN")?;
        let diagnostic_message = elements[2]
            .decode_as_string()
            .decoding_context(|| "cannot decode the diagnostic message")?;

        let mut consumed = 3;
        let mut referral_urls = Vec::new();
        if let Some(referrals) = elements.get(3).filter(|e| e.tag() == TYPE_REFERRAL_URLS) {
            referral_urls = decode_string_sequence(referrals)
                .decoding_context(|| "cannot decode the referral URLs")?;
            consumed = 4;
        }

        Ok((
            Self::new(
                ResultCode::new(result_code),
                Some(matched_dn),
                Some(diagnostic_message),
                referral_urls,
            ),
            consumed,
        ))
    }
}

impl fmt::Display for LdapResultComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resultCode={}", self.result_code)?;
        if let Some(dn) = &self.matched_dn {
            write!(f, ", matchedDN='{}'", dn)?;
        }
        if let Some(message) = &self.diagnostic_message {
            write!(f, ", diagnosticMessage='{}'", message)?;
        }
        if !self.referral_urls.is_empty() {
            write!(f, ", referralURLs={{'{}'}}", self.referral_urls.join("', '"))?;
        }
        Ok(())
    }
}

/// Decode a SEQUENCE (or SET) OF OCTET STRING as UTF-8 strings
pub(crate) fn decode_string_sequence(element: &BerElement) -> LdapResult<Vec<String>> {
    element
        .decode_as_sequence()?
        .iter()
        .map(BerElement::decode_as_string)
        .collect()
}

/// Encode strings as a SEQUENCE OF OCTET STRING with the given type
pub(crate) fn encode_string_sequence(tag: u8, values: &[String]) -> BerElement {
    let elements: Vec<BerElement> = values
        .iter()
        .map(|v| BerElement::octet_string(UNIVERSAL_OCTET_STRING_TYPE, v.clone()))
        .collect();
    BerElement::sequence(tag, &elements)
}
