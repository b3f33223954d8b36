//! Minimal element tree used as the render target.
//!
//! A [`Container`] is a shared handle, like a DOM element: clones point at the
//! same children, so a view can keep the container it rendered into and
//! redraw it later.

use quick_xml::events::{BytesStart, Event};
use quick_xml::escape::escape;
use quick_xml::reader::Reader;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MarkupError {
    #[error("malformed markup: {0}")]
    Syntax(String),
    #[error("unexpected closing tag </{0}>")]
    UnbalancedClose(String),
    #[error("element <{0}> is never closed")]
    Unclosed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            Node::Element(e) => e.write_markup(out),
            Node::Text(t) => out.push_str(&escape(t.as_str())),
        }
    }

    fn text_into(&self, out: &mut String) {
        match self {
            Node::Element(e) => e.children.iter().for_each(|c| c.text_into(out)),
            Node::Text(t) => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(t);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn append(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Depth-first search for the element carrying `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find_map(|e| e.find_by_id(id))
    }

    /// Text content with nodes separated by single spaces.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| c.text_into(&mut out));
        out
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            out.push_str(&escape(v.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for c in &self.children {
            c.write_markup(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn element_from_start(start: &BytesStart) -> Result<Element, MarkupError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| MarkupError::Syntax(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| MarkupError::Syntax(e.to_string()))?;
        element.attrs.push((key, value.into_owned()));
    }
    Ok(element)
}

/// Parse `markup` as the content of an SVG element and return its top-level
/// nodes. Whitespace-only text is dropped.
pub fn parse_fragment(markup: &str) -> Result<Vec<Node>, MarkupError> {
    let wrapped = format!(r#"<svg xmlns="{SVG_NS}">{markup}</svg>"#);
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    fn attach(stack: &mut [Element], roots: &mut Vec<Node>, node: Node) {
        match stack.last_mut() {
            Some(parent) => parent.append(node),
            None => roots.push(node),
        }
    }

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(element_from_start(&start)?),
            Ok(Event::Empty(start)) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut roots, Node::Element(element));
            }
            Ok(Event::End(end)) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let element = stack.pop().ok_or(MarkupError::UnbalancedClose(name))?;
                attach(&mut stack, &mut roots, Node::Element(element));
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| MarkupError::Syntax(e.to_string()))?;
                attach(&mut stack, &mut roots, Node::Text(text.into_owned()));
            }
            Ok(Event::CData(data)) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                attach(&mut stack, &mut roots, Node::Text(text));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(MarkupError::Syntax(e.to_string())),
        }
    }

    if let Some(open) = stack.pop() {
        return Err(MarkupError::Unclosed(open.name));
    }
    match roots.pop() {
        Some(Node::Element(svg)) if roots.is_empty() => Ok(svg.children),
        _ => Err(MarkupError::Syntax("expected a single wrapper element".into())),
    }
}

#[derive(Debug, Default)]
struct ContainerState {
    classes: BTreeSet<String>,
    children: Vec<Node>,
}

/// Shared handle to a UI region whose content is replaced on every render.
#[derive(Debug, Clone, Default)]
pub struct Container {
    state: Rc<RefCell<ContainerState>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all children. Classes are kept.
    pub fn empty(&self) {
        self.state.borrow_mut().children.clear();
    }

    pub fn add_class(&self, class: &str) {
        self.state.borrow_mut().classes.insert(class.to_string());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.contains(class)
    }

    pub fn append(&self, node: Node) {
        self.state.borrow_mut().children.push(node);
    }

    pub fn append_all(&self, nodes: impl IntoIterator<Item = Node>) {
        self.state.borrow_mut().children.extend(nodes);
    }

    pub fn children(&self) -> Vec<Node> {
        self.state.borrow().children.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().children.is_empty()
    }

    /// First child element, typically the root of the last render.
    pub fn first_element(&self) -> Option<Element> {
        self.state
            .borrow()
            .children
            .iter()
            .find_map(Node::as_element)
            .cloned()
    }

    /// Serialized content.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for c in &self.state.borrow().children {
            c.write_markup(&mut out);
        }
        out
    }

    /// Text content with nodes separated by single spaces.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for c in &self.state.borrow().children {
            c.text_into(&mut out);
        }
        out
    }

    /// Whether two handles share the same content.
    pub fn same_as(&self, other: &Container) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_fragment() {
        let nodes =
            parse_fragment(r#"<g id="a"><path id="p" d="M0 0" fill="rgb(1, 2, 3)"/></g><text>Hi &amp; bye</text>"#)
                .unwrap();
        assert_eq!(nodes.len(), 2);
        let g = nodes[0].as_element().unwrap();
        assert_eq!(g.name, "g");
        assert_eq!(g.find_by_id("p").unwrap().attr("fill"), Some("rgb(1, 2, 3)"));
        assert_eq!(
            nodes[1].as_element().unwrap().children,
            vec![Node::Text("Hi & bye".into())]
        );
    }

    #[test]
    fn rejects_broken_markup() {
        assert!(parse_fragment("<g><path></g>").is_err());
        assert!(parse_fragment("<g>").is_err());
        assert!(parse_fragment("</g>").is_err());
    }

    #[test]
    fn serializes_with_escaping() {
        let mut e = Element::new("text").with_attr("title", "a\"b");
        e.append(Node::Text("1 < 2".into()));
        assert_eq!(e.to_markup(), r#"<text title="a&quot;b">1 &lt; 2</text>"#);
        assert_eq!(Element::new("path").to_markup(), "<path/>");
    }

    #[test]
    fn container_handles_share_state() {
        let c = Container::new();
        let view = c.clone();
        c.append(Node::Element(Element::new("svg")));
        assert_eq!(view.len(), 1);
        assert!(view.same_as(&c));
        view.empty();
        assert!(c.is_empty());
    }

    #[test]
    fn container_text_joins_nodes() {
        let c = Container::new();
        c.append_all(parse_fragment("<h4>Title</h4><p>Body <b>bold</b></p>").unwrap());
        assert_eq!(c.text(), "Title Body bold");
    }
}
