use crate::matching_rule::{
    MatchingRule, MatchingRuleId, MatchingRuleKind, NormalizedValue, SubstringPosition,
};
use ldap_core::{LdapError, LdapResult};

/// `booleanMatch`: `TRUE` or `FALSE`, compared without regard to case
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanMatchingRule;

pub static BOOLEAN_MATCHING_RULE: BooleanMatchingRule = BooleanMatchingRule;

static IDS: [MatchingRuleId; 1] = [MatchingRuleId::new(
    MatchingRuleKind::Equality,
    "booleanMatch",
    "2.5.13.13",
)];

impl MatchingRule for BooleanMatchingRule {
    fn ids(&self) -> &'static [MatchingRuleId] {
        &IDS
    }

    fn normalize(&self, value: &[u8]) -> LdapResult<NormalizedValue> {
        if value.eq_ignore_ascii_case(b"TRUE") {
            Ok(NormalizedValue::new(&b"TRUE"[..]))
        } else if value.eq_ignore_ascii_case(b"FALSE") {
            Ok(NormalizedValue::new(&b"FALSE"[..]))
        } else {
            Err(LdapError::InvalidAttributeSyntax(format!(
                "'{}' is not a boolean value",
                String::from_utf8_lossy(value)
            )))
        }
    }

    fn normalize_substring(
        &self,
        _value: &[u8],
        _position: SubstringPosition,
    ) -> LdapResult<NormalizedValue> {
        Err(LdapError::InvalidAttributeSyntax(
            "substring matching is not supported for boolean values".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_rule() {
        let rule = BooleanMatchingRule;
        assert!(rule.values_match(b"true", b"TRUE").unwrap());
        assert!(!rule.values_match(b"true", b"false").unwrap());
        assert!(rule.values_match(b"yes", b"TRUE").is_err());
        assert!(rule.matches_substring(b"TRUE", Some(b"T"), &[], None).is_err());
    }
}
