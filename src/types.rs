//! Core types for spark-fiber.
//!
//! Props are what flows from elements into fibers and from fibers into the
//! host binding. Everything here is plain data; identity only matters for
//! event handlers.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::element::Element;

// =============================================================================
// Reserved names
// =============================================================================

/// Host tag used for text literals.
pub const TEXT_ELEMENT: &str = "TEXT_ELEMENT";

/// Host tag of the root fiber that wraps the attachment point.
pub const ROOT_TAG: &str = "#root";

/// The single prop carried by a text element.
pub const NODE_VALUE: &str = "nodeValue";

/// Prop names starting with this prefix are event listeners.
pub const EVENT_PREFIX: &str = "on";

// =============================================================================
// Tag
// =============================================================================

/// Host element tag (`"div"`, `"p"`, [`TEXT_ELEMENT`], ...).
///
/// Cheap to clone; every render pass copies tags into fresh fibers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(Rc<str>);

impl Tag {
    pub fn new(name: &str) -> Self {
        Self(Rc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the text element tag.
    pub fn is_text(&self) -> bool {
        &*self.0 == TEXT_ELEMENT
    }
}

impl Deref for Tag {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self(Rc::from(name))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Events
// =============================================================================

/// Event delivered to a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Listener type, e.g. `"click"`.
    pub kind: String,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

/// Event listener stored in props.
///
/// Two handlers are equal only if they are the same allocation, so a handler
/// created fresh on every render is re-registered on every update.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the listener.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Prop Value
// =============================================================================

/// A single prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(EventHandler),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => f.write_str(s),
            PropValue::Int(i) => write!(f, "{i}"),
            PropValue::Float(x) => write!(f, "{x}"),
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Ordered prop mapping plus the reserved `children` entry.
///
/// Children are kept apart from the named values so the host never sees them.
#[derive(Debug, Clone, Default)]
pub struct Props {
    values: IndexMap<String, PropValue>,
    children: Vec<Element>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style children replacement.
    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Named values in insertion order (children excluded).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn set_children(&mut self, children: Vec<Element>) {
        self.children = children;
    }
}
