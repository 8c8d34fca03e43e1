//! The matching rule contract and the comparisons derived from it

use bytes::Bytes;
use ldap_core::LdapResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Position of a substring assertion component within the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubstringPosition {
    SubInitial,
    SubAny,
    SubFinal,
}

/// Canonical form of a value under a matching rule
///
/// Ordered byte-wise with bytes compared as unsigned values; a proper prefix
/// orders before the longer value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NormalizedValue(Bytes);

impl NormalizedValue {
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self(value.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<String> for NormalizedValue {
    fn from(value: String) -> Self {
        Self(Bytes::from(value.into_bytes()))
    }
}

impl From<Vec<u8>> for NormalizedValue {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::from(value))
    }
}

impl fmt::Debug for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NormalizedValue({:?})", String::from_utf8_lossy(&self.0))
    }
}

/// Which kind of comparison a rule name or OID designates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchingRuleKind {
    Equality,
    Ordering,
    Substring,
}

/// Name and OID under which a rule is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchingRuleId {
    pub kind: MatchingRuleKind,
    pub name: &'static str,
    pub oid: &'static str,
}

impl MatchingRuleId {
    pub const fn new(kind: MatchingRuleKind, name: &'static str, oid: &'static str) -> Self {
        Self { kind, name, oid }
    }
}

/// A matching rule defined by its normalization
///
/// Implementors provide [`normalize`](Self::normalize) and
/// [`normalize_substring`](Self::normalize_substring). The comparison
/// methods have default implementations in terms of those two and are not
/// meant to be overridden.
pub trait MatchingRule: Send + Sync {
    /// Names and OIDs of the equality, ordering and substring rules this
    /// implementation provides
    fn ids(&self) -> &'static [MatchingRuleId];

    /// Normalize a complete value
    ///
    /// # Errors
    /// Returns [`ldap_core::LdapError::InvalidAttributeSyntax`] if the value
    /// is not valid for this rule
    fn normalize(&self, value: &[u8]) -> LdapResult<NormalizedValue>;

    /// Normalize one component of a substring assertion
    fn normalize_substring(
        &self,
        value: &[u8],
        position: SubstringPosition,
    ) -> LdapResult<NormalizedValue>;

    /// Whether the two values are equal under this rule
    fn values_match(&self, value1: &[u8], value2: &[u8]) -> LdapResult<bool> {
        Ok(self.normalize(value1)? == self.normalize(value2)?)
    }

    /// Order two values under this rule
    fn compare_values(&self, value1: &[u8], value2: &[u8]) -> LdapResult<Ordering> {
        let normalized1 = self.normalize(value1)?;
        let normalized2 = self.normalize(value2)?;
        Ok(compare_normalized(normalized1.as_bytes(), normalized2.as_bytes()))
    }

    /// Whether `value` matches the substring assertion
    ///
    /// The `sub_any` components must appear in order and may not overlap;
    /// each is matched at its leftmost position after the previous one.
    /// Absent components always match.
    fn matches_substring(
        &self,
        value: &[u8],
        sub_initial: Option<&[u8]>,
        sub_any: &[&[u8]],
        sub_final: Option<&[u8]>,
    ) -> LdapResult<bool> {
        let normalized = self.normalize(value)?;
        let value = normalized.as_bytes();
        let mut pos = 0;

        if let Some(sub_initial) = sub_initial {
            let initial = self.normalize_substring(sub_initial, SubstringPosition::SubInitial)?;
            if !value.starts_with(initial.as_bytes()) {
                return Ok(false);
            }
            pos = initial.len();
        }

        for sub_any in sub_any {
            let fragment = self.normalize_substring(sub_any, SubstringPosition::SubAny)?;
            let fragment = fragment.as_bytes();
            if fragment.is_empty() {
                continue;
            }

            match find_from(value, fragment, pos) {
                Some(start) => pos = start + fragment.len(),
                None => return Ok(false),
            }
        }

        if let Some(sub_final) = sub_final {
            let final_value = self.normalize_substring(sub_final, SubstringPosition::SubFinal)?;
            let Some(final_start) = value.len().checked_sub(final_value.len()) else {
                return Ok(false);
            };
            if final_start < pos || &value[final_start..] != final_value.as_bytes() {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Compare normalized values byte-wise as unsigned; on a common prefix the
/// shorter value orders first
fn compare_normalized(value1: &[u8], value2: &[u8]) -> Ordering {
    for (b1, b2) in value1.iter().zip(value2) {
        match b1.cmp(b2) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    value1.len().cmp(&value2.len())
}

/// Leftmost start of `needle` in `haystack` at or after `from`
fn find_from(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    while pos + needle.len() <= haystack.len() {
        if &haystack[pos..pos + needle.len()] == needle {
            return Some(pos);
        }
        pos += 1;
    }
    None
}
