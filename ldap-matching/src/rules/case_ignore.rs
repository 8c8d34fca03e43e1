use super::case_exact::decode_utf8;
use super::normalize_spaces;
use crate::matching_rule::{
    MatchingRule, MatchingRuleId, MatchingRuleKind, NormalizedValue, SubstringPosition,
};
use ldap_core::LdapResult;

/// `caseIgnoreMatch`: spaces and case are insignificant
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseIgnoreStringMatchingRule;

pub static CASE_IGNORE_STRING_MATCHING_RULE: CaseIgnoreStringMatchingRule =
    CaseIgnoreStringMatchingRule;

static IDS: [MatchingRuleId; 3] = [
    MatchingRuleId::new(MatchingRuleKind::Equality, "caseIgnoreMatch", "2.5.13.2"),
    MatchingRuleId::new(MatchingRuleKind::Ordering, "caseIgnoreOrderingMatch", "2.5.13.3"),
    MatchingRuleId::new(MatchingRuleKind::Substring, "caseIgnoreSubstringsMatch", "2.5.13.4"),
];

impl MatchingRule for CaseIgnoreStringMatchingRule {
    fn ids(&self) -> &'static [MatchingRuleId] {
        &IDS
    }

    fn normalize(&self, value: &[u8]) -> LdapResult<NormalizedValue> {
        Ok(normalize_spaces(decode_utf8(value)?, None).to_lowercase().into())
    }

    fn normalize_substring(
        &self,
        value: &[u8],
        position: SubstringPosition,
    ) -> LdapResult<NormalizedValue> {
        Ok(normalize_spaces(decode_utf8(value)?, Some(position)).to_lowercase().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_case_ignore_rule() {
        let rule = CaseIgnoreStringMatchingRule;
        assert!(rule.values_match(b"  JOHN   Doe ", b"john doe").unwrap());
        assert_eq!(rule.compare_values(b"ABC", b"abd").unwrap(), Ordering::Less);
        assert_eq!(
            rule.compare_values("Ärger".as_bytes(), "ärger".as_bytes()).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_case_ignore_substring() {
        let rule = CaseIgnoreStringMatchingRule;
        assert!(rule
            .matches_substring(b"Babs Jensen", Some(b"BA"), &[b"S J"], Some(b"SEN"))
            .unwrap());
        assert!(!rule
            .matches_substring(b"Babs Jensen", Some(b"bab"), &[b"jen"], Some(b"babs"))
            .unwrap());
        assert!(!rule.matches_substring(b"Babs", None, &[], Some(b"Babs Jensen")).unwrap());
    }
}
