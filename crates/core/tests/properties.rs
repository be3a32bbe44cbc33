//! Property tests for filtering and rendering.

use proptest::prelude::*;
use runtime_env_core::{
    render_runtime_script, render_type_declaration, BaseEnvironment, EnvironmentMap, FilterSpec,
};
use runtime_env_test_utils::script_json;
use std::collections::HashMap;

fn env_strategy() -> impl Strategy<Value = HashMap<String, String>> {
    prop::collection::hash_map("(APP_|VITE_)?[A-Z][A-Z0-9_]{0,8}", "\\PC{0,12}", 0..16)
}

proptest! {
    /// Property: a prefix keeps exactly the names that start with it.
    #[test]
    fn prefix_filter_is_exact_subset(vars in env_strategy()) {
        let base: BaseEnvironment = vars.clone().into_iter().collect();
        let map = FilterSpec::prefixed("APP_").filter(&base);

        prop_assert!(map.len() <= vars.len());
        for (key, value) in &vars {
            if key.starts_with("APP_") {
                prop_assert_eq!(map.get(key), Some(value.as_str()));
            } else {
                prop_assert!(!map.contains_key(key));
            }
        }
    }

    /// Property: prefix + stripped name reconstructs an original name.
    #[test]
    fn stripped_names_reconstruct_originals(vars in env_strategy()) {
        let base: BaseEnvironment = vars.clone().into_iter().collect();
        let map = FilterSpec::prefixed("VITE_").with_remove_prefix(true).filter(&base);

        for (key, value) in map.iter() {
            let original = format!("VITE_{key}");
            prop_assert_eq!(vars.get(&original), Some(value));
        }
    }

    /// Property: the script's JSON parses back to the input map.
    #[test]
    fn runtime_script_round_trips(vars in env_strategy()) {
        let env = EnvironmentMap::from(vars);
        let js = render_runtime_script(&env, "__RUNTIME_CONFIG__").unwrap();
        let json = script_json(&js, "__RUNTIME_CONFIG__").expect("assignment prefix");
        let back: EnvironmentMap = serde_json::from_str(json).unwrap();
        prop_assert_eq!(back, env);
    }

    /// Property: declaration fields are strictly ascending.
    #[test]
    fn declaration_fields_strictly_ascending(vars in env_strategy()) {
        let env = EnvironmentMap::from(vars);
        let ts = render_type_declaration(&env);
        let fields: Vec<&str> = ts
            .lines()
            .filter_map(|l| l.strip_prefix("\t\t\t")?.strip_suffix(": string;"))
            .collect();

        prop_assert_eq!(fields.len(), env.len());
        prop_assert!(fields.windows(2).all(|w| w[0] < w[1]));
    }
}
