use crate::matching_rule::{
    MatchingRule, MatchingRuleId, MatchingRuleKind, NormalizedValue, SubstringPosition,
};
use ldap_core::{LdapError, LdapResult};

/// `numericStringMatch`: digits and spaces, spaces ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericStringMatchingRule;

pub static NUMERIC_STRING_MATCHING_RULE: NumericStringMatchingRule = NumericStringMatchingRule;

static IDS: [MatchingRuleId; 3] = [
    MatchingRuleId::new(MatchingRuleKind::Equality, "numericStringMatch", "2.5.13.8"),
    MatchingRuleId::new(MatchingRuleKind::Ordering, "numericStringOrderingMatch", "2.5.13.9"),
    MatchingRuleId::new(MatchingRuleKind::Substring, "numericStringSubstringsMatch", "2.5.13.10"),
];

fn strip_spaces(value: &[u8]) -> LdapResult<NormalizedValue> {
    let mut digits = Vec::with_capacity(value.len());
    for (i, &b) in value.iter().enumerate() {
        match b {
            b' ' => {}
            b'0'..=b'9' => digits.push(b),
            _ => {
                return Err(LdapError::InvalidAttributeSyntax(format!(
                    "numeric string has invalid character 0x{:02x} at position {}",
                    b, i
                )));
            }
        }
    }
    Ok(digits.into())
}

impl MatchingRule for NumericStringMatchingRule {
    fn ids(&self) -> &'static [MatchingRuleId] {
        &IDS
    }

    fn normalize(&self, value: &[u8]) -> LdapResult<NormalizedValue> {
        strip_spaces(value)
    }

    fn normalize_substring(
        &self,
        value: &[u8],
        _position: SubstringPosition,
    ) -> LdapResult<NormalizedValue> {
        strip_spaces(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_numeric_string_rule() {
        let rule = NumericStringMatchingRule;
        assert!(rule.values_match(b"123 456", b"123456").unwrap());
        assert_eq!(rule.compare_values(b"12", b"123").unwrap(), Ordering::Less);
        assert!(rule.matches_substring(b"555 1234", Some(b"555"), &[], Some(b"34")).unwrap());
        assert!(matches!(
            rule.normalize(b"12a"),
            Err(LdapError::InvalidAttributeSyntax(_))
        ));
    }
}
