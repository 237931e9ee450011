//! Structural kind classification.
//!
//! Every object node is classified once into a [`Kind`]; the comparison and
//! omission engines dispatch on that kind and ask [`is_atomic`] whether the
//! node is an opaque unit or something to recurse into.

use rdeep_common::{Object, Prototype};

/// Closed set of structural kinds the engines dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Array,
    OrderedMap,
    Set,
    Date,
    Pattern,
    BoxedPrimitive,
    /// Typed numeric arrays and byte-level views
    ByteView,
    Plain,
    /// Built-ins without a dedicated comparison rule
    OtherAtomic,
}

/// Type tags that are always atomic
const ATOMIC_TAGS: &[&str] = &[
    "Date", "RegExp", "Map", "Set", "WeakMap", "WeakSet", "Promise", "Error", "Boolean",
    "Number", "String",
];

pub fn classify(object: &Object) -> Kind {
    match object {
        Object::Array(_) => Kind::Array,
        Object::Plain(_) => Kind::Plain,
        Object::Map(_) => Kind::OrderedMap,
        Object::Set(_) => Kind::Set,
        Object::Date(_) => Kind::Date,
        Object::Pattern(_) => Kind::Pattern,
        Object::Boxed(_) => Kind::BoxedPrimitive,
        Object::TypedArray(_) | Object::DataView(_) => Kind::ByteView,
        Object::ArrayBuffer(_)
        | Object::WeakMap
        | Object::WeakSet
        | Object::Promise
        | Object::Error(_)
        | Object::Host(_) => Kind::OtherAtomic,
    }
}

/// Decide whether `object` (already classified as `kind`) is copied and
/// compared as an opaque unit.
///
/// Three tiers, checked in order: memory shape (views and raw buffers),
/// host-provided constructors (built-in classes and host objects), then the
/// fixed tag allow-list. Arrays and plain objects of user classes fall
/// through and are recursed into.
pub fn is_atomic(object: &Object, kind: Kind) -> bool {
    if kind == Kind::ByteView || matches!(object, Object::ArrayBuffer(_)) {
        return true;
    }

    match object {
        Object::Host(_) => return true,
        Object::Plain(plain) => {
            if let Prototype::Class(class) = plain.prototype() {
                if class.is_builtin() {
                    return true;
                }
            }
        }
        _ => {}
    }

    kind != Kind::Array && kind != Kind::Plain && ATOMIC_TAGS.contains(&object.tag())
}
