//! Entity classification predicates

use crate::catalog::CatalogLists;
use crate::filter::FilterPolicy;

/// Pure inclusion predicates over (logical name, is-custom flag)
///
/// All name comparisons are case-insensitive.
#[derive(Debug, Clone)]
pub struct Classifier {
    lists: CatalogLists,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(CatalogLists::default())
    }
}

impl Classifier {
    pub fn new(lists: CatalogLists) -> Self {
        Self {
            lists: lists.normalized(),
        }
    }

    pub fn lists(&self) -> &CatalogLists {
        &self.lists
    }

    /// Custom entities are always business entities; everything else is
    /// unless the denylist names it.
    pub fn is_business_entity(&self, name: &str, is_custom: bool) -> bool {
        if is_custom {
            return true;
        }
        !self.lists.system_entities.contains(&name.to_lowercase())
    }

    /// Core entities, plus custom entities matching one of `include_prefixes`
    /// (any custom entity when no prefixes are given)
    pub fn core_and_custom_included(
        &self,
        name: &str,
        is_custom: bool,
        include_prefixes: &[String],
    ) -> bool {
        let name = name.to_lowercase();
        if self.lists.core_entities.contains(&name) {
            return true;
        }
        if !is_custom {
            return false;
        }
        include_prefixes.is_empty()
            || include_prefixes
                .iter()
                .any(|prefix| name.starts_with(&prefix.to_lowercase()))
    }

    pub fn custom_only_included(&self, is_custom: bool) -> bool {
        is_custom
    }

    /// Curated allow/deny path used when fetching full entity detail
    ///
    /// Exclusions win over every later rule.
    pub fn should_include_entity(&self, name: &str, _is_custom: bool) -> bool {
        let name = name.to_lowercase();

        if self.lists.curated_excluded.contains(&name) {
            return false;
        }
        if self.lists.curated_required.contains(&name) {
            return true;
        }
        !self.lists.team_prefix.is_empty() && name.starts_with(&self.lists.team_prefix)
    }

    /// Dispatch to the predicate for `policy`
    pub fn accepts(&self, policy: &FilterPolicy, name: &str, is_custom: bool) -> bool {
        match policy {
            FilterPolicy::All => true,
            FilterPolicy::Business => self.is_business_entity(name, is_custom),
            FilterPolicy::CoreAndCustom { include_prefixes } => {
                self.core_and_custom_included(name, is_custom, include_prefixes)
            }
            FilterPolicy::CustomOnly => self.custom_only_included(is_custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn prefixes(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_business_entity() {
        let c = Classifier::default();

        assert!(c.is_business_entity("account", false));
        assert!(c.is_business_entity("opportunity", false));
        assert!(!c.is_business_entity("asyncoperation", false));
        assert!(!c.is_business_entity("AsyncOperation", false));
        // Custom wins over the denylist
        assert!(c.is_business_entity("workflow", true));
    }

    #[test]
    fn test_core_and_custom() {
        let c = Classifier::default();

        assert!(c.core_and_custom_included("account", false, &[]));
        assert!(c.core_and_custom_included("fax", false, &prefixes(&["qrt_"])));
        assert!(!c.core_and_custom_included("lead", false, &[]));
        assert!(c.core_and_custom_included("new_widget", true, &[]));
        assert!(!c.core_and_custom_included("new_widget", true, &prefixes(&["qrt_"])));
        assert!(c.core_and_custom_included("QRT_Permits", true, &prefixes(&["qrt_"])));
        assert!(c.core_and_custom_included("qrt_permits", true, &prefixes(&["QRT_"])));
    }

    #[test]
    fn test_curated_path() {
        let c = Classifier::default();

        assert!(c.should_include_entity("account", false));
        assert!(c.should_include_entity("msdyn_project", true));
        assert!(c.should_include_entity("qrt_portfolio", true));
        assert!(!c.should_include_entity("qrt_taskrules", true));
        assert!(!c.should_include_entity("task", false));
        assert!(!c.should_include_entity("lead", false));
        assert!(!c.should_include_entity("msdyn_resource", true));
    }

    #[test]
    fn test_custom_lists() {
        let lists = CatalogLists {
            team_prefix: "ABC_".to_string(),
            ..CatalogLists::default()
        };
        let c = Classifier::new(lists);

        assert!(c.should_include_entity("abc_thing", true));
        assert!(!c.should_include_entity("qrt_portfolio", true));
    }

    #[test]
    fn test_accepts_dispatch() {
        let c = Classifier::default();

        assert!(c.accepts(&FilterPolicy::All, "asyncoperation", false));
        assert!(!c.accepts(&FilterPolicy::Business, "asyncoperation", false));
        assert!(!c.accepts(&FilterPolicy::CustomOnly, "account", false));
        assert!(c.accepts(&FilterPolicy::default(), "account", false));
    }

    fn entity_name() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z_]{1,24}",
            proptest::sample::select(crate::catalog::CURATED_EXCLUDED).prop_map(String::from),
            proptest::sample::select(crate::catalog::CORE_ENTITIES).prop_map(String::from),
            "(qrt_|QRT_|msdyn_)[a-z]{1,12}",
        ]
    }

    proptest! {
        #[test]
        fn prop_custom_only_tracks_flag(name in entity_name(), is_custom in any::<bool>()) {
            let c = Classifier::default();
            prop_assert_eq!(c.accepts(&FilterPolicy::CustomOnly, &name, is_custom), is_custom);
        }

        #[test]
        fn prop_custom_is_always_business(name in entity_name()) {
            let c = Classifier::default();
            prop_assert!(c.is_business_entity(&name, true));
        }

        #[test]
        fn prop_core_custom_without_prefixes_keeps_custom(name in entity_name()) {
            let c = Classifier::default();
            prop_assert!(c.core_and_custom_included(&name, true, &[]));
        }

        #[test]
        fn prop_core_custom_prefix_rule(name in entity_name(), is_custom in any::<bool>()) {
            let c = Classifier::default();
            let restrict = prefixes(&["qrt_"]);
            let core = crate::catalog::CORE_ENTITIES.contains(&name.to_lowercase().as_str());
            let expected = core || (is_custom && name.to_lowercase().starts_with("qrt_"));
            prop_assert_eq!(c.core_and_custom_included(&name, is_custom, &restrict), expected);
        }

        #[test]
        fn prop_curated_exclusions_never_pass(
            name in proptest::sample::select(crate::catalog::CURATED_EXCLUDED),
            is_custom in any::<bool>(),
        ) {
            let c = Classifier::default();
            prop_assert!(!c.should_include_entity(name, is_custom));
            prop_assert!(!c.should_include_entity(&name.to_uppercase(), is_custom));
        }
    }
}
