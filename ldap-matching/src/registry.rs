//! Lookup of matching rules by name or OID

use crate::matching_rule::MatchingRule;
use crate::rules::{
    BOOLEAN_MATCHING_RULE, CASE_EXACT_STRING_MATCHING_RULE, CASE_IGNORE_STRING_MATCHING_RULE,
    NUMERIC_STRING_MATCHING_RULE, OCTET_STRING_MATCHING_RULE,
};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static RULES: [&'static dyn MatchingRule; 5] = [
    &CASE_IGNORE_STRING_MATCHING_RULE,
    &CASE_EXACT_STRING_MATCHING_RULE,
    &OCTET_STRING_MATCHING_RULE,
    &NUMERIC_STRING_MATCHING_RULE,
    &BOOLEAN_MATCHING_RULE,
];

/// Rules keyed by lowercase name and by OID
static REGISTRY: Lazy<HashMap<String, &'static dyn MatchingRule>> = Lazy::new(|| {
    let mut registry = HashMap::new();
    for rule in RULES {
        for id in rule.ids() {
            registry.insert(id.name.to_ascii_lowercase(), rule);
            registry.insert(id.oid.to_string(), rule);
        }
    }
    log::debug!("registered {} matching rule names and OIDs", registry.len());
    registry
});

/// Find the rule registered under `name_or_oid`
///
/// Names are matched without regard to case. Any of the equality, ordering
/// or substring identifiers of a rule selects the same implementation.
pub fn select_matching_rule(name_or_oid: &str) -> Option<&'static dyn MatchingRule> {
    let key = name_or_oid.trim().to_ascii_lowercase();
    let rule = REGISTRY.get(&key).copied();
    if rule.is_none() {
        log::trace!("no matching rule registered for '{}'", name_or_oid);
    }
    rule
}

/// The rule used when an attribute type names none
pub fn default_matching_rule() -> &'static dyn MatchingRule {
    &CASE_IGNORE_STRING_MATCHING_RULE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching_rule::MatchingRuleKind;

    #[test]
    fn test_select_by_name_and_oid() {
        let by_name = select_matching_rule("caseExactMatch").unwrap();
        let by_oid = select_matching_rule("2.5.13.5").unwrap();
        assert_eq!(by_name.ids()[0].name, "caseExactMatch");
        assert_eq!(by_oid.ids()[0].name, "caseExactMatch");
    }

    #[test]
    fn test_select_ignores_case() {
        let rule = select_matching_rule("CASEIGNORESUBSTRINGSMATCH").unwrap();
        assert_eq!(rule.ids()[0].oid, "2.5.13.2");
        assert!(select_matching_rule("numericstringorderingmatch").is_some());
    }

    #[test]
    fn test_unknown_rule() {
        assert!(select_matching_rule("telephoneNumberMatch").is_none());
        assert!(select_matching_rule("").is_none());
    }

    #[test]
    fn test_every_identifier_is_registered() {
        for rule in RULES {
            for id in rule.ids() {
                let selected = select_matching_rule(id.oid).unwrap();
                assert_eq!(selected.ids(), rule.ids());
            }
        }
    }

    #[test]
    fn test_default_rule_is_case_ignore() {
        let rule = default_matching_rule();
        assert_eq!(rule.ids()[0].kind, MatchingRuleKind::Equality);
        assert_eq!(rule.ids()[0].name, "caseIgnoreMatch");
        assert!(rule.values_match(b"A", b"a").unwrap());
    }
}
