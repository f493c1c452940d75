//! Hierarchy ranks used by the renderer's layered layout
//!
//! Levels, top to bottom:
//!
//! | Level | Entities                                  |
//! |-------|-------------------------------------------|
//! | 0     | system actors (`contact`, `systemuser`)   |
//! | 1     | `account`                                 |
//! | 2     | portfolio / project                       |
//! | 3     | named child-domain entities               |
//! | 4     | everything else                           |

/// System actors
pub const LEVEL_0: &[&str] = &["contact", "systemuser"];

/// Top-level business entity
pub const LEVEL_1: &str = "account";

/// Portfolio and project
pub const LEVEL_2: &[&str] = &["qrt_portfolio", "msdyn_project"];

/// Child-domain entities hanging off a portfolio or project
pub const LEVEL_3: &[&str] = &[
    "qrt_agreements",
    "qrt_bonds",
    "qrt_designrequests",
    "qrt_epca",
    // Catalog spelling, not a typo here
    "qrt_estimateresquests",
    "qrt_financerequests",
    "qrt_icrequest",
    "qrt_incentives",
    "qrt_interconnectionagreementsandpayments",
    "qrt_interconnectionapplicationsstudies",
    "qrt_permits",
    "qrt_procurementrequests",
    "qrt_sitecontrol",
    "qrt_studies",
    "qrt_titleandalta",
];

/// Level of every entity not named above
pub const DEFAULT_LEVEL: u8 = 4;

/// Rank of an entity, a pure function of its logical name
///
/// First matching rule wins.
pub fn level(logical_name: &str) -> u8 {
    let name = logical_name.to_lowercase();
    let name = name.as_str();

    if LEVEL_0.contains(&name) {
        0
    } else if name == LEVEL_1 {
        1
    } else if LEVEL_2.contains(&name) {
        2
    } else if LEVEL_3.contains(&name) {
        3
    } else {
        DEFAULT_LEVEL
    }
}

/// Whether entities at `level` carry required-field detail
///
/// Fetching required attributes is expensive, so only the account,
/// portfolio/project and child tiers get them.
pub fn needs_required_fields(level: u8) -> bool {
    (1..=3).contains(&level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_levels() {
        assert_eq!(level("contact"), 0);
        assert_eq!(level("systemuser"), 0);
        assert_eq!(level("account"), 1);
        assert_eq!(level("qrt_portfolio"), 2);
        assert_eq!(level("msdyn_project"), 2);
        assert_eq!(level("qrt_permits"), 3);
        assert_eq!(level("qrt_estimateresquests"), 3);
        assert_eq!(level("qrt_foo"), 4);
        assert_eq!(level("lead"), 4);
    }

    #[test]
    fn test_level_case_insensitive() {
        assert_eq!(level("Account"), 1);
        assert_eq!(level("QRT_Bonds"), 3);
    }

    #[test]
    fn test_needs_required_fields() {
        assert!(!needs_required_fields(0));
        assert!(needs_required_fields(1));
        assert!(needs_required_fields(2));
        assert!(needs_required_fields(3));
        assert!(!needs_required_fields(4));
    }

    proptest! {
        #[test]
        fn prop_level_is_stable_and_bounded(name in "[a-zA-Z_]{0,32}") {
            let first = level(&name);
            prop_assert_eq!(first, level(&name));
            prop_assert!(first <= DEFAULT_LEVEL);
        }
    }
}
