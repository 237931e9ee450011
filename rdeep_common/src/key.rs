use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Unique, identity-compared property key.
///
/// Two symbols created with the same description are still distinct keys.
#[derive(Clone)]
pub struct Symbol(Rc<SymbolInner>);

struct SymbolInner {
    description: Option<String>,
}

impl Symbol {
    pub fn new(description: impl Into<String>) -> Self {
        Self(Rc::new(SymbolInner {
            description: Some(description.into()),
        }))
    }

    pub fn anonymous() -> Self {
        Self(Rc::new(SymbolInner { description: None }))
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    pub fn ptr_eq(&self, other: &Symbol) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

/// Own property key of a plain object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Str(String),
    Symbol(Symbol),
}

impl Key {
    pub fn is_symbol(&self) -> bool {
        matches!(self, Key::Symbol(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            Key::Symbol(_) => None,
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<Symbol> for Key {
    fn from(value: Symbol) -> Self {
        Key::Symbol(value)
    }
}

impl From<&Symbol> for Key {
    fn from(value: &Symbol) -> Self {
        Key::Symbol(value.clone())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Symbol(sym) => write!(f, "{}", sym),
        }
    }
}

/// One step of a [`KeyPath`]: a property key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(Key),
    Index(usize),
}

impl PathSegment {
    /// True when this segment is the string key `name`
    pub fn is_key(&self, name: &str) -> bool {
        matches!(self, PathSegment::Key(Key::Str(s)) if s == name)
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Key(_) => None,
        }
    }
}

/// Route from a traversal root to the current node.
///
/// Traversals push a segment before descending into a child and pop it on
/// the way back, so the path always describes the node being visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<PathSegment>,
}

impl KeyPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Dotted rendering of this path with `key` appended
    pub fn display_with(&self, key: &Key) -> String {
        let mut rendered = self.to_string();
        if !rendered.is_empty() {
            rendered.push('.');
        }
        rendered.push_str(&key.to_string());
        rendered
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Index(index) => write!(f, "{}", index)?,
                PathSegment::Key(key) => write!(f, "{}", key)?,
            }
        }
        Ok(())
    }
}
