//! Property-based tests for environment set derivation.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    use proptest::prelude::*;

    use crate::config::Settings;
    use crate::inventory::StaticInventory;
    use crate::reconcile::Context;

    fn env_set() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set("[a-z][a-z0-9_]{0,7}", 0..6)
    }

    fn context(control: &BTreeSet<String>, others: &[BTreeSet<String>]) -> Context {
        let mut inventory = StaticInventory::new("/envs").with_source("control", "/envs", control.clone());
        for (i, envs) in others.iter().enumerate() {
            let name = format!("module{}", i);
            inventory = inventory.with_source(&name, format!("/modules/{}", name), envs.clone());
        }
        let settings = Settings::new(PathBuf::from("/bin/false"), PathBuf::from("/bin/false"), "control");
        Context::load(settings, &inventory).unwrap()
    }

    proptest! {
        /// Property: needed environments are exactly the union minus control's own
        #[test]
        fn needed_is_union_minus_control(
            control in env_set(),
            others in prop::collection::vec(env_set(), 0..4),
        ) {
            let ctx = context(&control, &others);
            let needed = ctx.needed_environments().unwrap();

            let mut expected: BTreeSet<String> = others.iter().flatten().cloned().collect();
            expected.retain(|e| !control.contains(e));
            prop_assert_eq!(needed, expected);
        }

        /// Property: every known environment is either deployed by control or needed
        #[test]
        fn control_and_needed_cover_all(
            control in env_set(),
            others in prop::collection::vec(env_set(), 0..4),
        ) {
            let ctx = context(&control, &others);
            let needed = ctx.needed_environments().unwrap();

            prop_assert!(needed.is_disjoint(&control));
            let covered: BTreeSet<String> = needed.union(&control).cloned().collect();
            prop_assert_eq!(covered, ctx.all_environments());
        }
    }
}
