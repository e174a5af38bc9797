//! Terminal host - paints the host tree with crossterm.
//!
//! Wraps a [`MemoryHost`] for node storage and adds a painter. Block tags end
//! their line; text inherits attributes from its ancestors:
//!
//! ```text
//! <div><h1>Title</h1><p>body <b>bold</b></p></div>
//!   →  \x1b[1mTitle\x1b[0m\r\n
//!      body \x1b[1mbold\x1b[0m\r\n
//! ```

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};

use super::memory::{MemoryHost, NodeId};
use super::{HostBinding, PropPatch};
use crate::error::HostError;
use crate::types::{NODE_VALUE, PropValue, Props, Tag};

// =============================================================================
// Text Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const INVERSE = 1 << 4;
        const STRIKETHROUGH = 1 << 5;
    }
}

impl Attr {
    /// Attributes implied by a tag name.
    pub fn for_tag(tag: &str) -> Attr {
        match tag {
            "b" | "strong" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => Attr::BOLD,
            "i" | "em" => Attr::ITALIC,
            "u" => Attr::UNDERLINE,
            "s" | "del" => Attr::STRIKETHROUGH,
            "small" => Attr::DIM,
            "mark" => Attr::INVERSE,
            _ => Attr::NONE,
        }
    }

    /// Attributes switched on by boolean props (`bold`, `italic`, ...).
    fn from_node(doc: &MemoryHost, node: NodeId) -> Attr {
        const NAMED: [(&str, Attr); 6] = [
            ("bold", Attr::BOLD),
            ("dim", Attr::DIM),
            ("italic", Attr::ITALIC),
            ("underline", Attr::UNDERLINE),
            ("inverse", Attr::INVERSE),
            ("strikethrough", Attr::STRIKETHROUGH),
        ];

        NAMED
            .iter()
            .filter(|(name, _)| doc.property(node, name).and_then(PropValue::as_bool) == Some(true))
            .fold(Attr::NONE, |acc, (_, attr)| acc | *attr)
    }

    fn attributes(self) -> impl Iterator<Item = Attribute> {
        [
            (Attr::BOLD, Attribute::Bold),
            (Attr::DIM, Attribute::Dim),
            (Attr::ITALIC, Attribute::Italic),
            (Attr::UNDERLINE, Attribute::Underlined),
            (Attr::INVERSE, Attribute::Reverse),
            (Attr::STRIKETHROUGH, Attribute::CrossedOut),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, attribute)| attribute)
    }
}

fn parse_color(name: &str) -> Option<Color> {
    let color = match name {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        _ => return None,
    };
    Some(color)
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "div" | "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "ul" | "ol" | "pre"
            | "section" | "header" | "footer" | "tr"
    )
}

#[derive(Debug, Clone, Copy, Default)]
struct Style {
    attrs: Attr,
    fg: Option<Color>,
}

// =============================================================================
// TerminalHost
// =============================================================================

/// Host binding that renders its document to a terminal.
#[derive(Debug, Default)]
pub struct TerminalHost {
    document: MemoryHost,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_container(&mut self, tag: &str) -> NodeId {
        self.document.create_container(tag)
    }

    /// The underlying document (inspection, event dispatch).
    pub fn document(&self) -> &MemoryHost {
        &self.document
    }

    /// Paint the subtree under `root` with ANSI styling.
    pub fn paint<W: Write>(&self, out: &mut W, root: NodeId) -> io::Result<()> {
        for &child in self.document.children(root) {
            self.paint_node(out, child, Style::default(), true)?;
        }
        out.flush()
    }

    /// The subtree under `root` as plain text, no escape sequences.
    pub fn plain_text(&self, root: NodeId) -> String {
        let mut out = Vec::new();
        for &child in self.document.children(root) {
            // Writing into a Vec cannot fail.
            let _ = self.paint_node(&mut out, child, Style::default(), false);
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Clear the screen and paint `root` to stdout.
    pub fn present(&self, root: NodeId) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        self.paint(&mut stdout, root)
    }

    fn paint_node<W: Write>(&self, out: &mut W, node: NodeId, style: Style, styled: bool) -> io::Result<()> {
        let Some(tag) = self.document.tag(node) else { return Ok(()) };

        if tag.is_text() {
            let text = self
                .document
                .property(node, NODE_VALUE)
                .map(|v| v.to_string())
                .unwrap_or_default();
            return write_text(out, &text, style, styled);
        }

        let style = Style {
            attrs: style.attrs | Attr::for_tag(tag) | Attr::from_node(&self.document, node),
            fg: self
                .document
                .property(node, "color")
                .and_then(PropValue::as_str)
                .and_then(parse_color)
                .or(style.fg),
        };

        for &child in self.document.children(node) {
            self.paint_node(out, child, style, styled)?;
        }

        if is_block(tag) {
            queue!(out, Print("\r\n"))?;
        }
        Ok(())
    }
}

fn write_text<W: Write>(out: &mut W, text: &str, style: Style, styled: bool) -> io::Result<()> {
    if !styled || (style.attrs.is_empty() && style.fg.is_none()) {
        return queue!(out, Print(text));
    }

    for attribute in style.attrs.attributes() {
        queue!(out, SetAttribute(attribute))?;
    }
    if let Some(fg) = style.fg {
        queue!(out, SetForegroundColor(fg))?;
    }
    queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)
}

impl HostBinding for TerminalHost {
    type Node = NodeId;

    fn create_node(&mut self, tag: &Tag, props: &Props) -> Result<NodeId, HostError> {
        self.document.create_node(tag, props)
    }

    fn apply_patch(&mut self, node: &NodeId, patch: &PropPatch) -> Result<(), HostError> {
        self.document.apply_patch(node, patch)
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        self.document.append_child(parent, child)
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        self.document.remove_child(parent, child)
    }

    fn destroy_node(&mut self, node: &NodeId) -> Result<(), HostError> {
        self.document.destroy_node(node)
    }
}
