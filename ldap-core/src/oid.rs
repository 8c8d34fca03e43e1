use crate::error::{LdapError, LdapResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static NUMERIC_OID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))+$").expect("numeric OID pattern")
});

/// Object identifier used to name extended operations and controls
///
/// LDAP carries OIDs as octet strings, so this is the dotted string form.
/// Construction only rejects the empty string: servers in the wild put
/// descriptors where numeric OIDs belong, and the codec must round-trip them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(String);

impl Oid {
    /// Create a new OID
    ///
    /// # Errors
    /// Returns `LdapError::InvalidData` if the OID is empty
    pub fn new(oid: impl Into<String>) -> LdapResult<Self> {
        let oid = oid.into();
        if oid.is_empty() {
            return Err(LdapError::InvalidData("OID must not be empty".to_string()));
        }
        Ok(Self(oid))
    }

    /// Create an OID from a constant known to be non-empty
    pub fn from_static(oid: &'static str) -> Self {
        debug_assert!(!oid.is_empty(), "OID constant must not be empty");
        Self(oid.to_string())
    }

    /// Check whether this OID is in dotted numeric form (e.g. `1.3.6.1.4.1`)
    pub fn is_numeric(&self) -> bool {
        NUMERIC_OID.is_match(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Oid {
    type Error = LdapError;

    fn try_from(value: &str) -> LdapResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for Oid {
    type Error = LdapError;

    fn try_from(value: String) -> LdapResult<Self> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_oid_rejected() {
        assert!(matches!(Oid::new(""), Err(LdapError::InvalidData(_))));
    }

    #[test]
    fn test_numeric_form() {
        assert!(Oid::new("1.3.6.1.4.1.30221.2.5.1").unwrap().is_numeric());
        assert!(Oid::new("2.5.13.2").unwrap().is_numeric());
        assert!(!Oid::new("caseIgnoreMatch").unwrap().is_numeric());
        assert!(!Oid::new("1.").unwrap().is_numeric());
        assert!(!Oid::new("1.02").unwrap().is_numeric());
        assert!(!Oid::new("1").unwrap().is_numeric());
    }
}
