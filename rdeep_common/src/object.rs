use crate::{Key, RDeepError, Result, Value};
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Heap-allocated value kinds
#[derive(Debug, Clone)]
pub enum Object {
    Array(Vec<Value>),
    Plain(PlainObject),
    Map(OrderedMap),
    Set(OrderedSet),
    Date(Date),
    Pattern(Pattern),
    Boxed(Boxed),
    ArrayBuffer(ArrayBuffer),
    TypedArray(TypedArray),
    DataView(DataView),
    WeakMap,
    WeakSet,
    Promise,
    Error(ErrorObject),
    Host(Rc<dyn HostObject>),
}

impl Object {
    /// Host type tag (the name a runtime would report for this object)
    pub fn tag(&self) -> &str {
        match self {
            Object::Array(_) => "Array",
            Object::Plain(_) => "Object",
            Object::Map(_) => "Map",
            Object::Set(_) => "Set",
            Object::Date(_) => "Date",
            Object::Pattern(_) => "RegExp",
            Object::Boxed(boxed) => boxed.tag(),
            Object::ArrayBuffer(buffer) => {
                if buffer.is_shared() {
                    "SharedArrayBuffer"
                } else {
                    "ArrayBuffer"
                }
            }
            Object::TypedArray(array) => array.tag(),
            Object::DataView(_) => "DataView",
            Object::WeakMap => "WeakMap",
            Object::WeakSet => "WeakSet",
            Object::Promise => "Promise",
            Object::Error(_) => "Error",
            Object::Host(host) => host.type_tag(),
        }
    }
}

/// Extension point for host-specific opaque values.
///
/// Host objects are always atomic: the engine never looks inside them,
/// copies them by reference and compares them by identity.
pub trait HostObject: fmt::Debug {
    fn type_tag(&self) -> &str;
}

/// Identity-compared class handle used as an object prototype.
///
/// `Class::builtin` marks a constructor provided by the host environment;
/// instances of such classes are treated atomically. A user class with the
/// same name is a different class and stays structural.
#[derive(Clone)]
pub struct Class(Rc<ClassInner>);

struct ClassInner {
    name: String,
    builtin: bool,
}

impl Class {
    pub fn user(name: impl Into<String>) -> Self {
        Self(Rc::new(ClassInner {
            name: name.into(),
            builtin: false,
        }))
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Self(Rc::new(ClassInner {
            name: name.into(),
            builtin: true,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_builtin(&self) -> bool {
        self.0.builtin
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = if self.is_builtin() { "builtin" } else { "user" };
        write!(f, "Class({} {})", origin, self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Prototype {
    /// The bare structural-object prototype
    #[default]
    Object,
    Null,
    Class(Class),
}

#[derive(Debug, Clone)]
pub struct Property {
    pub key: Key,
    pub value: Value,
    pub enumerable: bool,
}

/// Keyed bag of own properties, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct PlainObject {
    prototype: Prototype,
    properties: Vec<Property>,
    index: HashMap<Key, usize>,
}

impl PlainObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prototype(prototype: Prototype) -> Self {
        Self {
            prototype,
            ..Self::default()
        }
    }

    pub fn prototype(&self) -> &Prototype {
        &self.prototype
    }

    pub fn set_prototype(&mut self, prototype: Prototype) {
        self.prototype = prototype;
    }

    /// Insert or replace an enumerable property, returning the previous value
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.define(key, value, true)
    }

    /// Insert or replace a property with explicit enumerability
    pub fn define(
        &mut self,
        key: impl Into<Key>,
        value: impl Into<Value>,
        enumerable: bool,
    ) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(&slot) = self.index.get(&key) {
            let property = &mut self.properties[slot];
            property.enumerable = enumerable;
            return Some(std::mem::replace(&mut property.value, value));
        }
        self.index.insert(key.clone(), self.properties.len());
        self.properties.push(Property {
            key,
            value,
            enumerable,
        });
        None
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.index.get(key).map(|&slot| &self.properties[slot].value)
    }

    /// Lookup by string key
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.get(&Key::from(key))
    }

    /// True when `key` is an own enumerable property
    pub fn has_enumerable(&self, key: &Key) -> bool {
        self.index
            .get(key)
            .is_some_and(|&slot| self.properties[slot].enumerable)
    }

    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        let slot = self.index.remove(key)?;
        let property = self.properties.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        Some(property.value)
    }

    /// Own enumerable properties: string keys first, then symbol keys,
    /// each group in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&Key, &Value)> {
        let strings = self
            .properties
            .iter()
            .filter(|p| p.enumerable && !p.key.is_symbol());
        let symbols = self
            .properties
            .iter()
            .filter(|p| p.enumerable && p.key.is_symbol());
        strings.chain(symbols).map(|p| (&p.key, &p.value))
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn string_key_count(&self) -> usize {
        self.properties
            .iter()
            .filter(|p| p.enumerable && !p.key.is_symbol())
            .count()
    }

    pub fn symbol_key_count(&self) -> usize {
        self.properties
            .iter()
            .filter(|p| p.enumerable && p.key.is_symbol())
            .count()
    }

    /// Number of own properties, enumerable or not
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn clear(&mut self) {
        self.properties.clear();
        self.index.clear();
    }
}

/// Insertion-ordered map with SameValueZero key identity
#[derive(Debug, Clone, Default)]
pub struct OrderedMap {
    entries: Vec<(Value, Value)>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(slot) => Some(std::mem::replace(&mut self.entries[slot].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.position(key).map(|slot| &self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.position(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, key: &Value) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k.same_value_zero(key))
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Insertion-ordered set with SameValueZero membership
#[derive(Debug, Clone, Default)]
pub struct OrderedSet {
    items: Vec<Value>,
}

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element; returns false when it was already present
    pub fn insert(&mut self, item: impl Into<Value>) -> bool {
        let item = item.into();
        if self.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn contains(&self, item: &Value) -> bool {
        self.items.iter().any(|existing| existing.same_value_zero(item))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Into<Value>> FromIterator<T> for OrderedSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OrderedSet::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

/// Point in time with millisecond precision; `None` marks an invalid date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    millis: Option<i64>,
}

impl Date {
    pub fn from_millis(millis: i64) -> Self {
        Self {
            millis: Some(millis),
        }
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self::from_millis(datetime.timestamp_millis())
    }

    pub fn invalid() -> Self {
        Self { millis: None }
    }

    pub fn timestamp_millis(&self) -> Option<i64> {
        self.millis
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.millis.and_then(DateTime::from_timestamp_millis)
    }
}

const FLAG_ORDER: &str = "dgimsuvy";

/// Regular expression value: source text plus canonical flags
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` with host-style flags (`dgimsuvy`).
    ///
    /// Flags are stored in canonical order, so `"gi"` and `"ig"` are the same
    /// flag set.
    pub fn new(source: &str, flags: &str) -> Result<Self> {
        for flag in flags.chars() {
            if !FLAG_ORDER.contains(flag) {
                return Err(RDeepError::Pattern(format!("unknown flag '{}'", flag)));
            }
            if flags.matches(flag).count() > 1 {
                return Err(RDeepError::Pattern(format!("duplicate flag '{}'", flag)));
            }
        }
        if flags.contains('u') && flags.contains('v') {
            return Err(RDeepError::Pattern(
                "flags 'u' and 'v' are mutually exclusive".to_string(),
            ));
        }

        let canonical: String = FLAG_ORDER.chars().filter(|f| flags.contains(*f)).collect();
        let regex = RegexBuilder::new(source)
            .case_insensitive(canonical.contains('i'))
            .multi_line(canonical.contains('m'))
            .dot_matches_new_line(canonical.contains('s'))
            .build()
            .map_err(|e| RDeepError::Pattern(e.to_string()))?;

        Ok(Self {
            source: source.to_string(),
            flags: canonical,
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// Object wrapper around a primitive
#[derive(Debug, Clone)]
pub enum Boxed {
    Bool(bool),
    Number(f64),
    String(String),
}

impl Boxed {
    pub fn tag(&self) -> &'static str {
        match self {
            Boxed::Bool(_) => "Boolean",
            Boxed::Number(_) => "Number",
            Boxed::String(_) => "String",
        }
    }

    pub fn primitive(&self) -> Value {
        match self {
            Boxed::Bool(b) => Value::Bool(*b),
            Boxed::Number(n) => Value::Number(*n),
            Boxed::String(s) => Value::String(s.clone()),
        }
    }
}

/// Raw memory buffer
#[derive(Debug, Clone, Default)]
pub struct ArrayBuffer {
    bytes: Vec<u8>,
    shared: bool,
}

impl ArrayBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            shared: false,
        }
    }

    pub fn shared(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            shared: true,
        }
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Byte-level window over raw memory
#[derive(Debug, Clone, Default)]
pub struct DataView {
    bytes: Vec<u8>,
}

impl DataView {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

/// Fixed-width numeric array view
#[derive(Debug, Clone)]
pub enum TypedArray {
    Int8(Vec<i8>),
    Uint8(Vec<u8>),
    Uint8Clamped(Vec<u8>),
    Int16(Vec<i16>),
    Uint16(Vec<u16>),
    Int32(Vec<i32>),
    Uint32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    BigInt64(Vec<i64>),
    BigUint64(Vec<u64>),
}

impl TypedArray {
    pub fn tag(&self) -> &'static str {
        match self {
            TypedArray::Int8(_) => "Int8Array",
            TypedArray::Uint8(_) => "Uint8Array",
            TypedArray::Uint8Clamped(_) => "Uint8ClampedArray",
            TypedArray::Int16(_) => "Int16Array",
            TypedArray::Uint16(_) => "Uint16Array",
            TypedArray::Int32(_) => "Int32Array",
            TypedArray::Uint32(_) => "Uint32Array",
            TypedArray::Float32(_) => "Float32Array",
            TypedArray::Float64(_) => "Float64Array",
            TypedArray::BigInt64(_) => "BigInt64Array",
            TypedArray::BigUint64(_) => "BigUint64Array",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TypedArray::Int8(v) => v.len(),
            TypedArray::Uint8(v) | TypedArray::Uint8Clamped(v) => v.len(),
            TypedArray::Int16(v) => v.len(),
            TypedArray::Uint16(v) => v.len(),
            TypedArray::Int32(v) => v.len(),
            TypedArray::Uint32(v) => v.len(),
            TypedArray::Float32(v) => v.len(),
            TypedArray::Float64(v) => v.len(),
            TypedArray::BigInt64(v) => v.len(),
            TypedArray::BigUint64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements widened to host values
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            TypedArray::Int8(v) => v.iter().map(|&n| Value::Number(n.into())).collect(),
            TypedArray::Uint8(v) | TypedArray::Uint8Clamped(v) => {
                v.iter().map(|&n| Value::Number(n.into())).collect()
            }
            TypedArray::Int16(v) => v.iter().map(|&n| Value::Number(n.into())).collect(),
            TypedArray::Uint16(v) => v.iter().map(|&n| Value::Number(n.into())).collect(),
            TypedArray::Int32(v) => v.iter().map(|&n| Value::Number(n.into())).collect(),
            TypedArray::Uint32(v) => v.iter().map(|&n| Value::Number(n.into())).collect(),
            TypedArray::Float32(v) => v.iter().map(|&n| Value::Number(n.into())).collect(),
            TypedArray::Float64(v) => v.iter().map(|&n| Value::Number(n)).collect(),
            TypedArray::BigInt64(v) => v.iter().map(|&n| Value::BigInt(n.into())).collect(),
            TypedArray::BigUint64(v) => v.iter().map(|&n| Value::BigInt(n.into())).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorObject {
    pub name: String,
    pub message: String,
}

impl ErrorObject {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}
