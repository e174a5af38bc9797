//! Element descriptions - the declarative input to the engine.
//!
//! An [`Element`] is a plain `{ kind, props }` value. Building one is pure and
//! stateless; the engine only ever reads them.
//!
//! ```ignore
//! use spark_fiber::{create_element, Props};
//!
//! let tree = create_element("div", Props::new(), vec![
//!     create_element("h1", Props::new(), vec!["A".into()]).into(),
//!     create_element("p", Props::new(), vec!["B".into()]).into(),
//! ]);
//! ```

use std::fmt;
use std::rc::Rc;

use crate::engine::RenderContext;
use crate::types::{NODE_VALUE, Props, TEXT_ELEMENT, Tag};

// =============================================================================
// Component
// =============================================================================

type RenderFn = dyn Fn(&mut RenderContext, &Props) -> Element;

/// A function component.
///
/// Components are compared by identity: two elements have the same type only
/// if they hold clones of the same `Component`. Create each component once and
/// clone it into the elements that use it.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new(
        name: &str,
        render: impl Fn(&mut RenderContext, &Props) -> Element + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name),
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity comparison.
    pub fn same(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }

    pub(crate) fn render(&self, cx: &mut RenderContext, props: &Props) -> Element {
        (self.render)(cx, props)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

// =============================================================================
// Element
// =============================================================================

/// What an element (and the fiber built from it) is.
#[derive(Debug, Clone)]
pub enum ElementType {
    /// Host element, rendered to a concrete node.
    Host(Tag),
    /// Function component, rendered to its descendants' nodes.
    Component(Component),
}

impl ElementType {
    /// Whether a fiber of this type can be reused for an element of `other`.
    pub fn same_type(&self, other: &ElementType) -> bool {
        match (self, other) {
            (ElementType::Host(a), ElementType::Host(b)) => a == b,
            (ElementType::Component(a), ElementType::Component(b)) => a.same(b),
            _ => false,
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, ElementType::Component(_))
    }

    /// Host tag or component name, for logs.
    pub fn label(&self) -> &str {
        match self {
            ElementType::Host(tag) => tag.as_str(),
            ElementType::Component(c) => c.name(),
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Host(Tag::from(tag))
    }
}

impl From<Tag> for ElementType {
    fn from(tag: Tag) -> Self {
        ElementType::Host(tag)
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        ElementType::Component(component)
    }
}

impl From<&Component> for ElementType {
    fn from(component: &Component) -> Self {
        ElementType::Component(component.clone())
    }
}

/// A node of the element description tree.
#[derive(Debug, Clone)]
pub struct Element {
    pub kind: ElementType,
    pub props: Props,
}

impl Element {
    pub fn new(kind: impl Into<ElementType>, props: Props) -> Self {
        Self {
            kind: kind.into(),
            props,
        }
    }
}

/// A child passed to [`create_element`]: either an element or a text literal.
#[derive(Debug, Clone)]
pub enum Child {
    Element(Element),
    Text(String),
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Text(value.to_string())
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Build an element; text children become [`TEXT_ELEMENT`] elements.
pub fn create_element(kind: impl Into<ElementType>, props: Props, children: Vec<Child>) -> Element {
    let children = children
        .into_iter()
        .map(|child| match child {
            Child::Element(element) => element,
            Child::Text(value) => text(value),
        })
        .collect();

    Element::new(kind, props.with_children(children))
}

/// Build a text element with a single `nodeValue` prop and no children.
pub fn text(value: impl Into<String>) -> Element {
    Element::new(TEXT_ELEMENT, Props::new().with(NODE_VALUE, value.into()))
}

/// Build a component element.
pub fn component(component: &Component, props: Props) -> Element {
    Element::new(component, props)
}
