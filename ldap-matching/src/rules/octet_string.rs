use crate::matching_rule::{
    MatchingRule, MatchingRuleId, MatchingRuleKind, NormalizedValue, SubstringPosition,
};
use ldap_core::LdapResult;

/// `octetStringMatch`: values compare as raw bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct OctetStringMatchingRule;

pub static OCTET_STRING_MATCHING_RULE: OctetStringMatchingRule = OctetStringMatchingRule;

static IDS: [MatchingRuleId; 3] = [
    MatchingRuleId::new(MatchingRuleKind::Equality, "octetStringMatch", "2.5.13.17"),
    MatchingRuleId::new(MatchingRuleKind::Ordering, "octetStringOrderingMatch", "2.5.13.18"),
    MatchingRuleId::new(MatchingRuleKind::Substring, "octetStringSubstringsMatch", "2.5.13.19"),
];

impl MatchingRule for OctetStringMatchingRule {
    fn ids(&self) -> &'static [MatchingRuleId] {
        &IDS
    }

    fn normalize(&self, value: &[u8]) -> LdapResult<NormalizedValue> {
        Ok(NormalizedValue::new(value.to_vec()))
    }

    fn normalize_substring(
        &self,
        value: &[u8],
        _position: SubstringPosition,
    ) -> LdapResult<NormalizedValue> {
        self.normalize(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_octet_string_rule() {
        let rule = OctetStringMatchingRule;
        assert!(!rule.values_match(b"a ", b"a").unwrap());
        assert_eq!(rule.compare_values(b"abc", b"abcd").unwrap(), Ordering::Less);
        assert!(rule
            .matches_substring(b"abcdefgh", Some(b"ab"), &[b"cd", b"ef"], Some(b"gh"))
            .unwrap());
        assert!(!rule
            .matches_substring(b"abcdefgh", Some(b"ab"), &[b"ef", b"cd"], Some(b"gh"))
            .unwrap());
    }
}
