//! Deep, cycle-safe structural equality.

use crate::classifier::{classify, is_atomic, Kind};
use crate::visited::IdentityMap;
use rdeep_common::{Object, PlainObject, TypedArray, Value};
use tracing::trace;

/// Compare two values for deep equality.
///
/// Arrays compare in order, plain objects by their own enumerable string and
/// symbol keys regardless of insertion order. Map keys and set elements keep
/// host identity semantics: two distinct objects with equal contents are
/// different keys. Scalar `NaN` equals `NaN`.
///
/// Cycles are handled by pairing each left-hand object with the first
/// right-hand object it was compared against; meeting the left object again
/// is only equal if it is paired with the same right object. Extremely deep
/// acyclic graphs are bounded by the call stack.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    let mut visited = IdentityMap::new();
    let equal = equal_values(a, b, &mut visited);
    trace!(paired = visited.len(), equal, "deep_equal finished");
    equal
}

fn equal_values(a: &Value, b: &Value, visited: &mut IdentityMap) -> bool {
    let (left, right) = match (a, b) {
        (Value::Object(left), Value::Object(right)) => (left, right),
        _ => return a.strict_equals(b) || (a.is_nan() && b.is_nan()),
    };

    if left.ptr_eq(right) {
        return true;
    }

    if let Some(paired) = visited.get(left) {
        return paired.ptr_eq(right);
    }
    visited.record(left, right);

    let lhs = left.borrow();
    let rhs = right.borrow();
    equal_objects(&lhs, &rhs, visited)
}

fn equal_objects(lhs: &Object, rhs: &Object, visited: &mut IdentityMap) -> bool {
    let left_kind = classify(lhs);
    let right_kind = classify(rhs);

    if left_kind == Kind::ByteView || right_kind == Kind::ByteView {
        return lhs.tag() == rhs.tag() && equal_views(lhs, rhs);
    }

    if lhs.tag() != rhs.tag() {
        return false;
    }

    match (lhs, rhs) {
        (Object::Array(a), Object::Array(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| equal_values(x, y, visited))
        }
        (Object::Map(a), Object::Map(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, value)| match b.get(key) {
                    Some(other) => equal_values(value, other, visited),
                    None => false,
                })
        }
        (Object::Set(a), Object::Set(b)) => {
            a.len() == b.len() && a.iter().all(|item| b.contains(item))
        }
        (Object::Date(a), Object::Date(b)) => {
            match (a.timestamp_millis(), b.timestamp_millis()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Object::Pattern(a), Object::Pattern(b)) => {
            a.source() == b.source() && a.flags() == b.flags()
        }
        (Object::Boxed(a), Object::Boxed(b)) => a.primitive().strict_equals(&b.primitive()),
        (Object::Plain(a), Object::Plain(b)) => {
            if is_atomic(lhs, left_kind) || is_atomic(rhs, right_kind) {
                // Distinct built-in instances: identity already failed
                return false;
            }
            equal_plain(a, b, visited)
        }
        // Atomic kinds without a dedicated rule compare by reference, and
        // the references are known to differ here.
        _ => false,
    }
}

fn equal_plain(a: &PlainObject, b: &PlainObject, visited: &mut IdentityMap) -> bool {
    if a.string_key_count() != b.string_key_count()
        || a.symbol_key_count() != b.symbol_key_count()
    {
        return false;
    }

    a.entries().all(|(key, value)| {
        if !b.has_enumerable(key) {
            return false;
        }
        match b.get(key) {
            Some(other) => equal_values(value, other, visited),
            None => false,
        }
    })
}

fn equal_views(lhs: &Object, rhs: &Object) -> bool {
    match (lhs, rhs) {
        (Object::DataView(a), Object::DataView(b)) => a.bytes() == b.bytes(),
        (Object::TypedArray(a), Object::TypedArray(b)) => equal_typed_arrays(a, b),
        _ => false,
    }
}

/// Element-wise strict equality; `NaN` elements never match
fn equal_typed_arrays(a: &TypedArray, b: &TypedArray) -> bool {
    match (a, b) {
        (TypedArray::Int8(x), TypedArray::Int8(y)) => x == y,
        (TypedArray::Uint8(x), TypedArray::Uint8(y)) => x == y,
        (TypedArray::Uint8Clamped(x), TypedArray::Uint8Clamped(y)) => x == y,
        (TypedArray::Int16(x), TypedArray::Int16(y)) => x == y,
        (TypedArray::Uint16(x), TypedArray::Uint16(y)) => x == y,
        (TypedArray::Int32(x), TypedArray::Int32(y)) => x == y,
        (TypedArray::Uint32(x), TypedArray::Uint32(y)) => x == y,
        (TypedArray::Float32(x), TypedArray::Float32(y)) => x == y,
        (TypedArray::Float64(x), TypedArray::Float64(y)) => x == y,
        (TypedArray::BigInt64(x), TypedArray::BigInt64(y)) => x == y,
        (TypedArray::BigUint64(x), TypedArray::BigUint64(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdeep_common::{
        ArrayBuffer, Boxed, Class, DataView, Date, ErrorObject, Function, HostObject, Key,
        ObjectRef, OrderedMap, OrderedSet, Pattern, Prototype, Symbol,
    };
    use std::rc::Rc;

    fn obj(entries: Vec<(&str, Value)>) -> Value {
        Value::plain(entries)
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_primitives() {
        assert!(deep_equal(&num(1.0), &num(1.0)));
        assert!(!deep_equal(&num(1.0), &num(2.0)));
        assert!(deep_equal(&Value::from("a"), &Value::from("a")));
        assert!(!deep_equal(&Value::Null, &Value::Undefined));
        assert!(!deep_equal(&Value::from("1"), &num(1.0)));
        assert!(deep_equal(&num(0.0), &num(-0.0)));
    }

    #[test]
    fn test_nan_equality() {
        assert!(deep_equal(&num(f64::NAN), &num(f64::NAN)));
        assert!(!deep_equal(&num(f64::NAN), &num(1.0)));
        let a = Value::array([num(f64::NAN)]);
        let b = Value::array([num(f64::NAN)]);
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn test_primitive_against_object() {
        assert!(!deep_equal(&Value::array(Vec::new()), &Value::Null));
        assert!(!deep_equal(&Value::Undefined, &obj(vec![])));
    }

    #[test]
    fn test_functions_compare_by_reference() {
        let f = Function::new("run");
        assert!(deep_equal(&Value::from(f.clone()), &Value::from(f)));
        assert!(!deep_equal(
            &Value::from(Function::new("run")),
            &Value::from(Function::new("run"))
        ));
    }

    #[test]
    fn test_plain_objects_ignore_key_order() {
        let a = obj(vec![("a", num(1.0)), ("b", num(2.0))]);
        let b = obj(vec![("b", num(2.0)), ("a", num(1.0))]);
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn test_plain_objects_key_sets_must_match() {
        let a = obj(vec![("a", num(1.0))]);
        let b = obj(vec![("a", num(1.0)), ("b", num(2.0))]);
        assert!(!deep_equal(&a, &b));
        assert!(!deep_equal(&b, &a));

        let c = obj(vec![("x", num(1.0))]);
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn test_undefined_property_is_not_a_missing_property() {
        let a = obj(vec![("a", Value::Undefined)]);
        let b = obj(vec![("b", Value::Undefined)]);
        assert!(!deep_equal(&a, &b));
    }

    #[test]
    fn test_non_enumerable_properties_are_ignored() {
        let mut plain = PlainObject::new();
        plain.insert("a", 1);
        plain.define("hidden", 99, false);
        let a = Value::object(Object::Plain(plain));
        let b = obj(vec![("a", num(1.0))]);
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn test_symbol_keys_participate() {
        let sym = Symbol::new("meta");
        let a = Value::plain([(Key::from(&sym), num(1.0))]);
        let b = Value::plain([(Key::from(&sym), num(1.0))]);
        let c = Value::plain([(Key::from(&sym), num(2.0))]);
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));

        let other = Value::plain([(Key::from(Symbol::new("meta")), num(1.0))]);
        assert!(!deep_equal(&a, &other));
    }

    #[test]
    fn test_arrays_are_order_sensitive() {
        let a = Value::array([num(1.0), num(2.0)]);
        let b = Value::array([num(2.0), num(1.0)]);
        let c = Value::array([num(1.0), num(2.0)]);
        assert!(!deep_equal(&a, &b));
        assert!(deep_equal(&a, &c));
        assert!(!deep_equal(&a, &Value::array([num(1.0)])));
    }

    #[test]
    fn test_nested_difference() {
        let a = Value::array([obj(vec![("id", num(1.0)), ("x", "a".into())])]);
        let b = Value::array([obj(vec![("id", num(2.0)), ("x", "a".into())])]);
        assert!(!deep_equal(&a, &b));
    }

    #[test]
    fn test_array_is_not_plain_object() {
        let arr = Value::array([num(1.0)]);
        let plain = obj(vec![("0", num(1.0))]);
        assert!(!deep_equal(&arr, &plain));
    }

    #[test]
    fn test_set_is_not_plain_object() {
        let set = Value::object(Object::Set(OrderedSet::new()));
        assert!(!deep_equal(&set, &obj(vec![])));
    }

    #[test]
    fn test_map_keys_compare_by_reference() {
        let k1 = obj(vec![("k", num(1.0))]);
        let k2 = obj(vec![("k", num(1.0))]);
        let a = Value::object(Object::Map([(k1.clone(), num(1.0))].into_iter().collect()));
        let b = Value::object(Object::Map([(k2, num(1.0))].into_iter().collect()));
        let c = Value::object(Object::Map([(k1, num(1.0))].into_iter().collect()));
        assert!(!deep_equal(&a, &b));
        assert!(deep_equal(&a, &c));
    }

    #[test]
    fn test_map_values_compare_deeply() {
        let a: OrderedMap = [("x", obj(vec![("n", num(1.0))]))].into_iter().collect();
        let b: OrderedMap = [("x", obj(vec![("n", num(1.0))]))].into_iter().collect();
        let c: OrderedMap = [("x", obj(vec![("n", num(2.0))]))].into_iter().collect();
        assert!(deep_equal(&Value::object(Object::Map(a.clone())), &Value::object(Object::Map(b))));
        assert!(!deep_equal(&Value::object(Object::Map(a)), &Value::object(Object::Map(c))));
    }

    #[test]
    fn test_map_size_mismatch() {
        let a: OrderedMap = [("x", 1), ("y", 2)].into_iter().collect();
        let b: OrderedMap = [("x", 1)].into_iter().collect();
        assert!(!deep_equal(&Value::object(Object::Map(a)), &Value::object(Object::Map(b))));
    }

    #[test]
    fn test_set_membership_by_reference() {
        let e1 = obj(vec![]);
        let e2 = obj(vec![]);
        let a: OrderedSet = [e1.clone(), num(1.0)].into_iter().collect();
        let b: OrderedSet = [num(1.0), e1].into_iter().collect();
        let c: OrderedSet = [e2, num(1.0)].into_iter().collect();
        let a = Value::object(Object::Set(a));
        assert!(deep_equal(&a, &Value::object(Object::Set(b))));
        assert!(!deep_equal(&a, &Value::object(Object::Set(c))));
    }

    #[test]
    fn test_dates_compare_by_instant() {
        let a = Value::object(Object::Date(Date::from_millis(1_700_000_000_000)));
        let b = Value::object(Object::Date(Date::from_millis(1_700_000_000_000)));
        let c = Value::object(Object::Date(Date::from_millis(0)));
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));

        let invalid = Value::object(Object::Date(Date::invalid()));
        let invalid_too = Value::object(Object::Date(Date::invalid()));
        assert!(!deep_equal(&invalid, &invalid_too));
        assert!(deep_equal(&invalid, &invalid));
    }

    #[test]
    fn test_patterns_compare_by_source_and_flags() {
        let pattern = |src: &str, flags: &str| {
            Value::object(Object::Pattern(Pattern::new(src, flags).unwrap()))
        };
        assert!(deep_equal(&pattern("a+b", "gi"), &pattern("a+b", "ig")));
        assert!(!deep_equal(&pattern("a+b", "g"), &pattern("a+b", "i")));
        assert!(!deep_equal(&pattern("a+b", "g"), &pattern("a+c", "g")));
    }

    #[test]
    fn test_boxed_primitives_compare_by_value() {
        let boxed = |b: Boxed| Value::object(Object::Boxed(b));
        assert!(deep_equal(&boxed(Boxed::String("x".into())), &boxed(Boxed::String("x".into()))));
        assert!(!deep_equal(&boxed(Boxed::Number(1.0)), &boxed(Boxed::Number(2.0))));
        assert!(!deep_equal(&boxed(Boxed::Number(1.0)), &boxed(Boxed::String("1".into()))));
        assert!(!deep_equal(&boxed(Boxed::Bool(true)), &Value::Bool(true)));
    }

    #[test]
    fn test_typed_arrays_compare_elementwise() {
        let view = |t: TypedArray| Value::object(Object::TypedArray(t));
        assert!(deep_equal(&view(TypedArray::Int32(vec![1, 2])), &view(TypedArray::Int32(vec![1, 2]))));
        assert!(!deep_equal(&view(TypedArray::Int32(vec![1, 2])), &view(TypedArray::Int32(vec![2, 1]))));
        assert!(!deep_equal(&view(TypedArray::Int32(vec![1])), &view(TypedArray::Uint32(vec![1]))));
        assert!(!deep_equal(&view(TypedArray::Uint8(vec![1])), &view(TypedArray::Uint8Clamped(vec![1]))));
    }

    #[test]
    fn test_typed_array_nan_elements_are_unequal() {
        let a = Value::object(Object::TypedArray(TypedArray::Float64(vec![f64::NAN])));
        let b = Value::object(Object::TypedArray(TypedArray::Float64(vec![f64::NAN])));
        assert!(!deep_equal(&a, &b));
    }

    #[test]
    fn test_data_views_compare_bytes() {
        let a = Value::object(Object::DataView(DataView::new(vec![1, 2, 3])));
        let b = Value::object(Object::DataView(DataView::new(vec![1, 2, 3])));
        let c = Value::object(Object::DataView(DataView::new(vec![1, 2, 4])));
        let d = Value::object(Object::DataView(DataView::new(vec![1, 2])));
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
        assert!(!deep_equal(&a, &d));
    }

    #[test]
    fn test_view_against_array() {
        let view = Value::object(Object::TypedArray(TypedArray::Uint8(vec![1])));
        let arr = Value::array([num(1.0)]);
        assert!(!deep_equal(&view, &arr));
        assert!(!deep_equal(&arr, &view));
    }

    #[test]
    fn test_other_atomics_compare_by_reference() {
        let buffer = Value::object(Object::ArrayBuffer(ArrayBuffer::new(vec![1])));
        let same_bytes = Value::object(Object::ArrayBuffer(ArrayBuffer::new(vec![1])));
        assert!(deep_equal(&buffer, &buffer.clone()));
        assert!(!deep_equal(&buffer, &same_bytes));

        let err = Value::object(Object::Error(ErrorObject::new("Error", "x")));
        let err_too = Value::object(Object::Error(ErrorObject::new("Error", "x")));
        assert!(!deep_equal(&err, &err_too));

        assert!(!deep_equal(&Value::object(Object::Promise), &Value::object(Object::Promise)));
    }

    #[test]
    fn test_builtin_class_instances_compare_by_reference() {
        let url = Class::builtin("URL");
        let make = || {
            let mut plain = PlainObject::with_prototype(Prototype::Class(url.clone()));
            plain.insert("href", "https://example.com");
            Value::object(Object::Plain(plain))
        };
        let a = make();
        assert!(deep_equal(&a, &a.clone()));
        assert!(!deep_equal(&a, &make()));
    }

    #[test]
    fn test_user_class_identity_is_not_checked() {
        let point = PlainObject::with_prototype(Prototype::Class(Class::user("Point")));
        let vector = PlainObject::with_prototype(Prototype::Class(Class::user("Vector")));
        let mut a = point;
        a.insert("x", 1);
        let mut b = vector;
        b.insert("x", 1);
        assert!(deep_equal(&Value::object(Object::Plain(a)), &Value::object(Object::Plain(b))));
    }

    #[derive(Debug)]
    struct Handle;

    impl HostObject for Handle {
        fn type_tag(&self) -> &str {
            "Handle"
        }
    }

    #[test]
    fn test_host_objects_compare_by_reference() {
        let handle: Rc<dyn HostObject> = Rc::new(Handle);
        let a = Value::object(Object::Host(handle.clone()));
        let b = Value::object(Object::Host(handle));
        assert!(deep_equal(&a, &a.clone()));
        assert!(!deep_equal(&a, &b));
    }

    #[test]
    fn test_self_reference_is_reflexive() {
        let a = ObjectRef::new(Object::Plain(PlainObject::new()));
        a.set_property("v", 1);
        a.set_property("self", &a);
        let value = Value::from(&a);
        assert!(deep_equal(&value, &value));
        a.clear();
    }

    #[test]
    fn test_isomorphic_cycles_are_equal() {
        let a = ObjectRef::new(Object::Plain(PlainObject::new()));
        a.set_property("v", 1);
        a.set_property("self", &a);
        let b = ObjectRef::new(Object::Plain(PlainObject::new()));
        b.set_property("v", 1);
        b.set_property("self", &b);
        assert!(deep_equal(&Value::from(&a), &Value::from(&b)));
        a.clear();
        b.clear();
    }

    #[test]
    fn test_divergent_cycle_shapes_are_unequal() {
        // a -> a (period 1) versus b1 -> b2 -> b1 (period 2)
        let a = ObjectRef::new(Object::Plain(PlainObject::new()));
        a.set_property("next", &a);
        let b1 = ObjectRef::new(Object::Plain(PlainObject::new()));
        let b2 = ObjectRef::new(Object::Plain(PlainObject::new()));
        b1.set_property("next", &b2);
        b2.set_property("next", &b1);

        assert!(!deep_equal(&Value::from(&a), &Value::from(&b1)));
        a.clear();
        b1.clear();
        b2.clear();
    }

    #[test]
    fn test_cyclic_arrays() {
        let a = ObjectRef::new(Object::Array(vec![]));
        a.push(1);
        a.push(&a);
        let b = ObjectRef::new(Object::Array(vec![]));
        b.push(1);
        b.push(&b);
        let c = ObjectRef::new(Object::Array(vec![]));
        c.push(2);
        c.push(&c);
        assert!(deep_equal(&Value::from(&a), &Value::from(&b)));
        assert!(!deep_equal(&Value::from(&a), &Value::from(&c)));
        a.clear();
        b.clear();
        c.clear();
    }
}
