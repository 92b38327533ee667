//! Change-set computation between a submitted form and the stored job.

use serde_json::Value;

pub type FieldMap = serde_json::Map<String, Value>;

/// Split a comma-joined token string. An empty string is the empty set.
pub fn split_tokens(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tokens with `,`, trimming each and skipping blanks.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Comparable string form of a field value.
///
/// Sequences become their trimmed comma-joined form, so `["a", "b"]` and `"a,b"` compare equal.
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let tokens: Vec<String> = items.iter().map(normalize_value).collect();
            join_tokens(&tokens)
        }
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Keys of `submitted` whose effective value differs from `previous`.
///
/// Keys listed in `excluded` never appear. A key missing from `previous` always counts as
/// changed, so diffing against an empty map yields every non-excluded field (job creation).
/// The submitted value is carried over untouched.
pub fn build_change_set(submitted: &FieldMap, previous: &FieldMap, excluded: &[&str]) -> FieldMap {
    submitted
        .iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .filter(|(key, value)| match previous.get(key.as_str()) {
            Some(old) => normalize_value(value) != normalize_value(old),
            None => true,
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn map(value: Value) -> FieldMap {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_only_changed_scalars() {
        let changes = build_change_set(
            &map(json!({"enabled": true, "delay": 10})),
            &map(json!({"enabled": true, "delay": 5})),
            &[],
        );
        assert_eq!(Value::Object(changes), json!({"delay": 10}));
    }

    #[test]
    fn test_array_equals_joined_string() {
        let changes = build_change_set(
            &map(json!({"exclude": ["a", "b"]})),
            &map(json!({"exclude": "a,b"})),
            &[],
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_array_whitespace_ignored() {
        let changes = build_change_set(
            &map(json!({"include": [" a ", "b  "]})),
            &map(json!({"include": "a,b"})),
            &[],
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_excluded_keys_dropped() {
        let changes = build_change_set(
            &map(json!({"name": "sync_a_b", "safesync": true, "delay": 3})),
            &FieldMap::new(),
            &["name", "safesync"],
        );
        assert_eq!(Value::Object(changes), json!({"delay": 3}));
    }

    #[test]
    fn test_missing_previous_key_is_change() {
        let changes = build_change_set(
            &map(json!({"retry": false, "delay": 10})),
            &map(json!({"delay": 10})),
            &[],
        );
        assert_eq!(Value::Object(changes), json!({"retry": false}));
    }

    #[test]
    fn test_scalar_string_conversion() {
        // the daemon may hand back "10" where the form holds 10
        let changes = build_change_set(
            &map(json!({"delay": 10, "delete": true})),
            &map(json!({"delay": "10", "delete": "true"})),
            &[],
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_identical_state_is_noop() {
        let state = map(json!({
            "enabled": true, "source": "/a", "destination": "/b", "delay": 10,
            "exclude": "x,y", "options": ""
        }));
        assert!(build_change_set(&state, &state, &[]).is_empty());
    }

    #[test]
    fn test_raw_value_kept() {
        let changes = build_change_set(
            &map(json!({"exclude": ["a", "c"]})),
            &map(json!({"exclude": "a,b"})),
            &[],
        );
        assert_eq!(changes.get("exclude"), Some(&json!(["a", "c"])));
    }

    #[test]
    fn test_split_tokens() {
        assert!(split_tokens("").is_empty());
        assert_eq!(split_tokens("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_tokens("a,,b"), vec!["a", "b"]);
    }

    #[test]
    fn test_tokens_survive_join_and_split() {
        let tokens = vec!["*.tmp".to_string(), " .cache".to_string(), "node_modules ".to_string()];
        let joined = join_tokens(&tokens);
        assert_eq!(joined, "*.tmp,.cache,node_modules");
        assert_eq!(split_tokens(&joined), vec!["*.tmp", ".cache", "node_modules"]);
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(&json!(true)), "true");
        assert_eq!(normalize_value(&json!(42)), "42");
        assert_eq!(normalize_value(&json!(null)), "");
        assert_eq!(normalize_value(&json!([])), "");
        assert_eq!(normalize_value(&json!(["x"])), "x");
    }

    fn field_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "(?s).{0,16}".prop_map(Value::String),
            proptest::collection::vec("[^,]{0,8}", 0..4).prop_map(|tokens| json!(tokens)),
            Just(Value::Null),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            .. ProptestConfig::default()
        })]

        #[test]
        fn comma_free_tokens_survive_join_and_split(
            tokens in proptest::collection::vec("[A-Za-z0-9._*-]{1,12}", 0..8)
        ) {
            prop_assert_eq!(split_tokens(&join_tokens(&tokens)), tokens);
        }

        #[test]
        fn state_diffed_against_itself_is_empty(
            state in proptest::collection::btree_map("[a-z]{1,8}", field_value(), 0..8)
        ) {
            let state: FieldMap = state.into_iter().collect();
            prop_assert!(build_change_set(&state, &state, &[]).is_empty());
        }
    }
}
