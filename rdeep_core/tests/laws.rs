use proptest::prelude::*;
use rdeep_common::{Key, KeyPath, Object, ObjectRef, PlainObject, Value};
use rdeep_core::convert::{from_json, to_json};
use rdeep_core::{deep_equal, deep_equal_except, deep_omit, OmitOptions};
use serde_json::Value as JsonValue;

fn arb_json() -> impl Strategy<Value = JsonValue> {
    let leaf = prop_oneof![
        Just(JsonValue::Null),
        any::<bool>().prop_map(JsonValue::Bool),
        (-1000i64..1000).prop_map(JsonValue::from),
        "[a-z]{0,6}".prop_map(JsonValue::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(JsonValue::Array),
            prop::collection::btree_map("[a-e]", inner, 0..6)
                .prop_map(|map| JsonValue::Object(map.into_iter().collect())),
        ]
    })
}

fn strip_key(json: &JsonValue, key: &str) -> JsonValue {
    match json {
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(|v| strip_key(v, key)).collect()),
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| (k.clone(), strip_key(v, key)))
                .collect(),
        ),
        other => other.clone(),
    }
}

proptest! {
    #[test]
    fn reflexive(doc in arb_json()) {
        let value = from_json(&doc);
        prop_assert!(deep_equal(&value, &value));
    }

    #[test]
    fn independent_builds_are_equal(doc in arb_json()) {
        prop_assert!(deep_equal(&from_json(&doc), &from_json(&doc)));
    }

    #[test]
    fn agrees_with_json_equality(a in arb_json(), b in arb_json()) {
        prop_assert_eq!(deep_equal(&from_json(&a), &from_json(&b)), a == b);
    }

    #[test]
    fn equal_except_with_empty_options_is_deep_equal(a in arb_json(), b in arb_json()) {
        let (a, b) = (from_json(&a), from_json(&b));
        prop_assert_eq!(deep_equal_except(&a, &b, &OmitOptions::new()), deep_equal(&a, &b));
    }

    #[test]
    fn omit_never_mutates_input(doc in arb_json()) {
        let value = from_json(&doc);
        let snapshot = from_json(&doc);
        let _ = deep_omit(&value, &OmitOptions::new().ignore_key("a").ignore_key_predicate(
            |key, path| key.as_str() == Some("b") && path.len() > 1,
        ));
        prop_assert!(deep_equal(&value, &snapshot));
    }

    #[test]
    fn omit_removes_key_everywhere(doc in arb_json()) {
        let pruned = deep_omit(&from_json(&doc), &OmitOptions::new().ignore_key("c"));
        prop_assert_eq!(to_json(&pruned).unwrap(), strip_key(&doc, "c"));
    }

    #[test]
    fn equal_except_ignores_only_listed_key(doc in arb_json(), replacement in arb_json()) {
        let mut changed = doc.clone();
        if let JsonValue::Object(map) = &mut changed {
            map.insert("d".to_string(), replacement);
        }
        let options = OmitOptions::new().ignore_key("d");
        prop_assert!(deep_equal_except(&from_json(&doc), &from_json(&changed), &options));
    }
}

#[test]
fn cyclic_graph_round_trip_through_omit() {
    // a = { v: 1, child: { up: a } }
    let a = ObjectRef::new(Object::Plain(PlainObject::new()));
    let child = ObjectRef::new(Object::Plain(PlainObject::new()));
    a.set_property("v", 1);
    a.set_property("child", &child);
    child.set_property("up", &a);

    let pruned = deep_omit(&Value::from(&a), &OmitOptions::new().ignore_key("v"));
    let copy = pruned.as_object().unwrap().clone();
    let copied_child = copy.property("child").unwrap().as_object().unwrap().clone();
    assert!(copied_child.property("up").unwrap().as_object().unwrap().ptr_eq(&copy));
    assert!(copy.property(Key::from("v")).is_none());
    assert!(deep_equal(&pruned, &pruned.clone()));

    a.clear();
    child.clear();
    copy.clear();
}

#[test]
fn predicate_receives_dotted_paths() {
    let doc = serde_json::json!({"a": {"b": [{"c": 1}]}});
    let seen = std::cell::RefCell::new(Vec::new());
    let options = OmitOptions::new().ignore_key_predicate(|key: &Key, path: &KeyPath| {
        seen.borrow_mut().push(path.display_with(key));
        false
    });
    let _ = deep_omit(&from_json(&doc), &options);
    assert_eq!(*seen.borrow(), vec!["a", "a.b", "a.b.0.c"]);
}
