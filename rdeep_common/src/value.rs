use crate::{Key, Object, PlainObject, Symbol};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Any datum in a host value graph.
///
/// Primitives are held inline; everything else lives behind an
/// [`ObjectRef`] so that graphs can share nodes and contain cycles.
/// `Value` has no `PartialEq`: use `strict_equals` for host
/// identity semantics or the comparison engine for deep equality.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Symbol(Symbol),
    Function(Function),
    Object(ObjectRef),
}

impl Value {
    /// Wrap `object` in a fresh reference
    pub fn object(object: Object) -> Self {
        Value::Object(ObjectRef::new(object))
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::object(Object::Array(items.into_iter().collect()))
    }

    /// Plain object with the bare object prototype
    pub fn plain<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut plain = PlainObject::new();
        for (key, value) in entries {
            plain.insert(key, value);
        }
        Value::object(Object::Plain(plain))
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }

    /// Host strict equality: numbers by IEEE comparison (`NaN` never equals
    /// itself), strings by content, symbols, functions and objects by identity.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Strict equality, except `NaN` matches `NaN` (map key / set element identity)
    pub fn same_value_zero(&self, other: &Value) -> bool {
        (self.is_nan() && other.is_nan()) || self.strict_equals(other)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Function(_) => "function",
            Value::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Value::Symbol(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl From<&ObjectRef> for Value {
    fn from(value: &ObjectRef) -> Self {
        Value::Object(value.clone())
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::object(value)
    }
}

/// Opaque callable, compared by identity only
#[derive(Clone)]
pub struct Function(Rc<str>);

impl Function {
    pub fn new(name: &str) -> Self {
        Self(Rc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name())
    }
}

/// Stable identity of an object for the lifetime of its allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// Shared handle to a heap object.
///
/// Cloning the handle shares the object. Graphs that contain cycles keep
/// themselves alive; call [`ObjectRef::clear`] on a node of the cycle to
/// release them.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    pub fn new(object: Object) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn id(&self) -> ObjectId {
        ObjectId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /// Set an enumerable property on a plain object.
    ///
    /// Returns false when the object is not a plain object.
    pub fn set_property(&self, key: impl Into<Key>, value: impl Into<Value>) -> bool {
        match &mut *self.borrow_mut() {
            Object::Plain(plain) => {
                plain.insert(key, value);
                true
            }
            _ => false,
        }
    }

    /// Append to an array. Returns false when the object is not an array.
    pub fn push(&self, value: impl Into<Value>) -> bool {
        match &mut *self.borrow_mut() {
            Object::Array(items) => {
                items.push(value.into());
                true
            }
            _ => false,
        }
    }

    /// Own enumerable property of a plain object
    pub fn property(&self, key: impl Into<Key>) -> Option<Value> {
        match &*self.borrow() {
            Object::Plain(plain) => plain.get(&key.into()).cloned(),
            _ => None,
        }
    }

    /// Array element
    pub fn element(&self, index: usize) -> Option<Value> {
        match &*self.borrow() {
            Object::Array(items) => items.get(index).cloned(),
            _ => None,
        }
    }

    /// Drop the children of a container, breaking any cycle through it
    pub fn clear(&self) {
        match &mut *self.borrow_mut() {
            Object::Array(items) => items.clear(),
            Object::Plain(plain) => plain.clear(),
            Object::Map(map) => map.clear(),
            Object::Set(set) => set.clear(),
            _ => {}
        }
    }
}

impl fmt::Debug for ObjectRef {
    // Shallow on purpose: the graph may be cyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(object) => write!(f, "ObjectRef({} @{:#x})", object.tag(), self.id().0),
            Err(_) => write!(f, "ObjectRef(<borrowed> @{:#x})", self.id().0),
        }
    }
}
