//! LDAP matching rules
//!
//! A matching rule only has to say how to normalize a value (and a substring
//! assertion component); [`MatchingRule`] derives equality, ordering and
//! substring matching from that. The concrete rules in [`rules`] are
//! stateless singletons looked up by name or OID through
//! [`select_matching_rule`].
//!
//! ```
//! use ldap_matching::{select_matching_rule, MatchingRule};
//! use std::cmp::Ordering;
//!
//! let rule = select_matching_rule("caseIgnoreMatch").unwrap();
//! assert!(rule.values_match(b"John  Doe", b"john doe").unwrap());
//! assert_eq!(rule.compare_values(b"abc", b"ABCD").unwrap(), Ordering::Less);
//! ```

pub mod matching_rule;
pub mod registry;
pub mod rules;

pub use matching_rule::{
    MatchingRule, MatchingRuleId, MatchingRuleKind, NormalizedValue, SubstringPosition,
};
pub use registry::{default_matching_rule, select_matching_rule};
