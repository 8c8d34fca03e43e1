use super::normalize_spaces;
use crate::matching_rule::{
    MatchingRule, MatchingRuleId, MatchingRuleKind, NormalizedValue, SubstringPosition,
};
use ldap_core::{LdapError, LdapResult};

/// `caseExactMatch`: spaces are insignificant, case is significant
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseExactStringMatchingRule;

pub static CASE_EXACT_STRING_MATCHING_RULE: CaseExactStringMatchingRule =
    CaseExactStringMatchingRule;

static IDS: [MatchingRuleId; 3] = [
    MatchingRuleId::new(MatchingRuleKind::Equality, "caseExactMatch", "2.5.13.5"),
    MatchingRuleId::new(MatchingRuleKind::Ordering, "caseExactOrderingMatch", "2.5.13.6"),
    MatchingRuleId::new(MatchingRuleKind::Substring, "caseExactSubstringsMatch", "2.5.13.7"),
];

pub(crate) fn decode_utf8(value: &[u8]) -> LdapResult<&str> {
    std::str::from_utf8(value)
        .map_err(|e| LdapError::InvalidAttributeSyntax(format!("value is not valid UTF-8: {}", e)))
}

impl MatchingRule for CaseExactStringMatchingRule {
    fn ids(&self) -> &'static [MatchingRuleId] {
        &IDS
    }

    fn normalize(&self, value: &[u8]) -> LdapResult<NormalizedValue> {
        Ok(normalize_spaces(decode_utf8(value)?, None).into())
    }

    fn normalize_substring(
        &self,
        value: &[u8],
        position: SubstringPosition,
    ) -> LdapResult<NormalizedValue> {
        Ok(normalize_spaces(decode_utf8(value)?, Some(position)).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_exact_rule() {
        let rule = CaseExactStringMatchingRule;
        assert!(rule.values_match(b"  John   Doe ", b"John Doe").unwrap());
        assert!(!rule.values_match(b"John Doe", b"john doe").unwrap());
        assert!(rule.matches_substring(b"John Doe", None, &[b" "], None).unwrap());
        assert!(rule.normalize(&[0xFF]).is_err());
    }
}
