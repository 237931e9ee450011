//! Deep key omission: structural copies with selected keys removed.

use crate::classifier::{classify, is_atomic};
use crate::visited::IdentityMap;
use rdeep_common::{Key, KeyPath, Object, ObjectRef, PathSegment, PlainObject, Prototype, Value};
use std::collections::HashSet;
use std::fmt;
use tracing::trace;

/// Path-aware exclusion rule: `(key, parent path) -> exclude?`
pub type KeyPredicate<'a> = dyn Fn(&Key, &KeyPath) -> bool + 'a;

/// Which keys to drop during [`deep_omit`].
///
/// A key is dropped when it is in the flat ignore set, or when the
/// predicate returns true for it. The predicate receives the path of the
/// object that owns the key; the key itself is not on the path yet.
#[derive(Default)]
pub struct OmitOptions<'a> {
    ignore_keys: HashSet<Key>,
    ignore_key_predicate: Option<Box<KeyPredicate<'a>>>,
}

impl<'a> OmitOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_key(mut self, key: impl Into<Key>) -> Self {
        self.ignore_keys.insert(key.into());
        self
    }

    pub fn ignore_keys<K: Into<Key>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.ignore_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Replace the path-aware predicate
    pub fn ignore_key_predicate(
        mut self,
        predicate: impl Fn(&Key, &KeyPath) -> bool + 'a,
    ) -> Self {
        self.ignore_key_predicate = Some(Box::new(predicate));
        self
    }

    /// True when no exclusion rule is configured
    pub fn is_empty(&self) -> bool {
        self.ignore_keys.is_empty() && self.ignore_key_predicate.is_none()
    }

    pub fn excludes(&self, key: &Key, parent: &KeyPath) -> bool {
        if self.ignore_keys.contains(key) {
            return true;
        }
        match &self.ignore_key_predicate {
            Some(predicate) => predicate(key, parent),
            None => false,
        }
    }
}

impl fmt::Debug for OmitOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OmitOptions")
            .field("ignore_keys", &self.ignore_keys)
            .field("ignore_key_predicate", &self.ignore_key_predicate.is_some())
            .finish()
    }
}

/// Copy `value`, dropping every plain-object key the options exclude.
///
/// The input is never mutated. Arrays and plain objects are rebuilt (plain
/// objects keep their prototype); atomic values such as dates, maps, sets and
/// typed arrays are shared by reference and never looked into. An object
/// reached twice yields the same copy both times, so cycles in the input are
/// reproduced in the output.
///
/// A panicking predicate unwinds out of this call unchanged.
pub fn deep_omit(value: &Value, options: &OmitOptions<'_>) -> Value {
    let (copy, _) = omit_tracked(value, options);
    copy
}

/// Like [`deep_omit`], also returning every container the copy allocated
pub(crate) fn omit_tracked(value: &Value, options: &OmitOptions<'_>) -> (Value, Vec<ObjectRef>) {
    let mut omitter = Omitter {
        options,
        copies: IdentityMap::new(),
        path: KeyPath::new(),
    };
    let copy = omitter.copy_value(value);
    trace!(copied = omitter.copies.len(), "deep_omit finished");
    let copies = std::mem::replace(&mut omitter.copies, IdentityMap::new());
    (copy, copies.into_associated())
}

struct Omitter<'o, 'a> {
    options: &'o OmitOptions<'a>,
    copies: IdentityMap,
    path: KeyPath,
}

/// What a source node needs to be rebuilt, detached from its `RefCell`
/// borrow so user predicates may freely inspect the source graph.
enum Shape {
    Atomic,
    Array(Vec<Value>),
    Plain(Prototype, Vec<(Key, Value)>),
}

impl Omitter<'_, '_> {
    fn copy_value(&mut self, value: &Value) -> Value {
        let source = match value {
            Value::Object(source) => source,
            other => return other.clone(),
        };

        if let Some(copy) = self.copies.get(source) {
            return Value::Object(copy.clone());
        }

        match shape_of(source) {
            Shape::Atomic => value.clone(),
            Shape::Array(items) => self.copy_array(source, items),
            Shape::Plain(prototype, entries) => self.copy_plain(source, prototype, entries),
        }
    }

    fn copy_array(&mut self, source: &ObjectRef, items: Vec<Value>) -> Value {
        let copy = ObjectRef::new(Object::Array(vec![Value::Undefined; items.len()]));
        self.copies.record(source, &copy);

        for (index, item) in items.iter().enumerate() {
            self.path.push(PathSegment::Index(index));
            let copied = self.copy_value(item);
            self.path.pop();

            if let Object::Array(slots) = &mut *copy.borrow_mut() {
                slots[index] = copied;
            }
        }

        Value::Object(copy)
    }

    fn copy_plain(
        &mut self,
        source: &ObjectRef,
        prototype: Prototype,
        entries: Vec<(Key, Value)>,
    ) -> Value {
        let copy = ObjectRef::new(Object::Plain(PlainObject::with_prototype(prototype)));
        self.copies.record(source, &copy);

        for (key, item) in entries {
            if self.options.excludes(&key, &self.path) {
                continue;
            }

            self.path.push(PathSegment::Key(key.clone()));
            let copied = self.copy_value(&item);
            self.path.pop();

            copy.set_property(key, copied);
        }

        Value::Object(copy)
    }
}

impl Drop for Omitter<'_, '_> {
    // A panicking predicate abandons the partial copy: empty every container
    // it allocated so cycles reproduced so far are released.
    fn drop(&mut self) {
        if std::thread::panicking() {
            let copies = std::mem::replace(&mut self.copies, IdentityMap::new());
            for copy in copies.into_associated() {
                copy.clear();
            }
        }
    }
}

fn shape_of(source: &ObjectRef) -> Shape {
    let object = source.borrow();
    match &*object {
        Object::Array(items) => Shape::Array(items.clone()),
        Object::Plain(plain) if !is_atomic(&object, classify(&object)) => Shape::Plain(
            plain.prototype().clone(),
            plain
                .entries()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        _ => Shape::Atomic,
    }
}
