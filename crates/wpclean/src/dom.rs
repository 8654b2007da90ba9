//! Owned HTML fragment tree.
//!
//! Input is parsed with html5ever (through `scraper`) and copied into plain
//! owned nodes so that cleaning passes can rewrite the tree freely before it
//! is serialized once at the end.

use scraper::{ElementRef, Html, Node as ParsedNode};

/// Elements whose text never counts as readable content.
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements whose text the parser keeps verbatim, so it is written back
/// without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replaces the value in place, or appends the attribute.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }

    pub fn retain_attrs<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.attrs.retain(|(key, value)| keep(key, value));
    }

    pub fn has_child_elements(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, Node::Element(_)))
    }

    pub fn has_descendant(&self, tag: &str) -> bool {
        self.children.iter().any(|child| match child {
            Node::Element(el) => el.name == tag || el.has_descendant(tag),
            Node::Text(_) => false,
        })
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

/// Parses `html` as the content of a `<body>` element.
///
/// Parsing is lenient: unclosed tags are closed, stray end tags are ignored.
/// Comments, doctypes and processing instructions are not kept.
pub fn parse_fragment(html: &str) -> Vec<Node> {
    if html.is_empty() {
        return Vec::new();
    }
    let parsed = Html::parse_fragment(html);
    convert_children(parsed.root_element())
}

fn convert_children(parent: ElementRef<'_>) -> Vec<Node> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        match child.value() {
            ParsedNode::Text(text) => push_text(&mut nodes, text),
            ParsedNode::Element(element) => {
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                nodes.push(Node::Element(Element {
                    name: element.name().to_string(),
                    attrs: element
                        .attrs()
                        .map(|(key, value)| (key.to_string(), value.to_string()))
                        .collect(),
                    children: convert_children(child_ref),
                }));
            }
            _ => {}
        }
    }
    nodes
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}

/// Concatenated text of `nodes`, skipping script and style bodies.
pub fn text_content(nodes: &[Node]) -> String {
    let mut out = String::new();
    collect_text(nodes, &mut out);
    out
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if NON_TEXT_ELEMENTS.contains(&el.name.as_str()) => {}
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// Depth-first, document-order search.
pub fn find_first<'a>(nodes: &'a [Node], tag: &str) -> Option<&'a Element> {
    nodes.iter().find_map(|node| match node {
        Node::Element(el) if el.name == tag => Some(el),
        Node::Element(el) => find_first(&el.children, tag),
        Node::Text(_) => None,
    })
}

/// Applies `f` to every element, parents before children.
pub fn for_each_element_mut<F>(nodes: &mut [Node], f: &mut F)
where
    F: FnMut(&mut Element),
{
    for node in nodes {
        if let Node::Element(el) = node {
            f(el);
            for_each_element_mut(&mut el.children, f);
        }
    }
}

pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    serialize_into(nodes, false, &mut out);
    out
}

fn serialize_into(nodes: &[Node], raw_text: bool, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) if raw_text => out.push_str(text),
            Node::Text(text) => escape_text(text, out),
            Node::Element(el) => serialize_element(el, out),
        }
    }
}

fn serialize_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for (key, value) in &el.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attr(value, out);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.name.as_str()) {
        return;
    }

    // The parser drops one leading newline in these, so write it back.
    if matches!(el.name.as_str(), "pre" | "textarea" | "listing") {
        if let Some(Node::Text(text)) = el.children.first() {
            if text.starts_with('\n') {
                out.push('\n');
            }
        }
    }

    let raw_text = RAW_TEXT_ELEMENTS.contains(&el.name.as_str());
    serialize_into(&el.children, raw_text, out);
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
