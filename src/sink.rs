//! Format-agnostic tree building
//!
//! The DataCite builder emits one tree of nested elements; whether that tree
//! becomes XML or JSON is decided by the [`TreeSink`] it writes into. Both
//! sinks here are arena-backed: handles are plain indices, cheap to copy and
//! free of borrow entanglement while the builder holds several open parents.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde_json::Value;

use crate::graph::Term;

/// Element text, optionally language-tagged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
    pub language: Option<String>,
}

impl Text {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
        }
    }

    /// Text content of a term; blank nodes have none
    pub fn from_term(term: &Term) -> Option<Self> {
        match term {
            Term::Iri(iri) => Some(Self::plain(iri.clone())),
            Term::Literal { value, language } => Some(Self {
                value: value.clone(),
                language: language.clone(),
            }),
            Term::Blank(_) => None,
        }
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Self::plain(value)
    }
}

impl From<String> for Text {
    fn from(value: String) -> Self {
        Self::plain(value)
    }
}

/// Description of one child element to append
#[derive(Debug, Clone, Default)]
pub struct Child {
    pub is_list: bool,
    pub text: Option<Text>,
    pub attrib: Vec<(String, String)>,
}

impl Child {
    /// Plain nested element
    pub fn node() -> Self {
        Self::default()
    }

    /// List wrapper (XML: a plain wrapper element; JSON: an array)
    pub fn list() -> Self {
        Self {
            is_list: true,
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<Text>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Mark a text/attrib child as list-repeated (the datacite `affiliation`
    /// shape: repeated items with no wrapper)
    pub fn repeated(mut self) -> Self {
        self.is_list = true;
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrib.push((name.into(), value.into()));
        self
    }
}

/// Receiver for the builder's element tree
pub trait TreeSink {
    type Handle: Copy;

    /// Top-level element new children hang off by default
    fn root(&self) -> Self::Handle;

    /// Append a child under `parent`, returning a handle usable as a later
    /// parent
    fn add_child(&mut self, parent: Self::Handle, tag: &str, child: Child) -> Self::Handle;

    /// Number of children (XML) or entries (JSON) under a node
    fn child_count(&self, node: Self::Handle) -> usize;
}

struct XmlNode {
    tag: String,
    text: Option<Text>,
    attrib: Vec<(String, String)>,
    children: Vec<usize>,
}

/// Arena-backed XML document with a fixed root element
pub struct XmlSink {
    nodes: Vec<XmlNode>,
}

impl XmlSink {
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![XmlNode {
                tag: root_tag.to_string(),
                text: None,
                attrib: Vec::new(),
                children: Vec::new(),
            }],
        }
    }

    pub fn tag(&self, node: usize) -> &str {
        &self.nodes[node].tag
    }

    pub fn text(&self, node: usize) -> Option<&Text> {
        self.nodes[node].text.as_ref()
    }

    pub fn children(&self, node: usize) -> &[usize] {
        &self.nodes[node].children
    }

    /// First direct child with the given tag
    pub fn child_by_tag(&self, node: usize, tag: &str) -> Option<usize> {
        self.nodes[node]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].tag == tag)
    }

    /// Render the document with an XML declaration, the given default
    /// namespace on the root, and two-space indentation
    pub fn render(&self, namespace: &str) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        self.render_node(&mut out, 0, 0, Some(namespace));
        out
    }

    fn render_node(&self, out: &mut String, node: usize, depth: usize, namespace: Option<&str>) {
        let n = &self.nodes[node];
        for _ in 0..depth {
            out.push_str("  ");
        }
        let _ = write!(out, "<{}", n.tag);
        if let Some(ns) = namespace {
            let _ = write!(out, " xmlns=\"{}\"", escape_attr(ns));
        }
        for (name, value) in &n.attrib {
            let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
        }
        if let Some(text) = &n.text {
            if let Some(lang) = &text.language {
                let _ = write!(out, " xml:lang=\"{}\"", escape_attr(lang));
            }
        }
        match (&n.text, n.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                let _ = write!(out, ">{}</{}>\n", escape_text(&text.value), n.tag);
            }
            (_, false) => {
                out.push_str(">\n");
                for &child in &n.children {
                    self.render_node(out, child, depth + 1, None);
                }
                for _ in 0..depth {
                    out.push_str("  ");
                }
                let _ = write!(out, "</{}>\n", n.tag);
            }
        }
    }
}

impl TreeSink for XmlSink {
    type Handle = usize;

    fn root(&self) -> usize {
        0
    }

    fn add_child(&mut self, parent: usize, tag: &str, child: Child) -> usize {
        // is_list is a JSON concern; XML list wrappers are explicit elements
        let id = self.nodes.len();
        self.nodes.push(XmlNode {
            tag: tag.to_string(),
            text: child.text,
            attrib: child.attrib,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn child_count(&self, node: usize) -> usize {
        self.nodes[node].children.len()
    }
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

enum JsonNode {
    Object(BTreeMap<String, usize>),
    List(Vec<usize>),
    Scalar(String),
}

/// Arena-backed JSON document rooted at an object
///
/// Reproduces the quirks of the feed consumers' expected shape: a text-only
/// child of an object collapses to a plain string, and a list-marked child
/// that carries text or attributes is appended to an array under its own tag
/// (the `affiliation` shape, repeated items without a wrapper).
pub struct JsonSink {
    nodes: Vec<JsonNode>,
}

impl Default for JsonSink {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSink {
    pub fn new() -> Self {
        Self {
            nodes: vec![JsonNode::Object(BTreeMap::new())],
        }
    }

    fn object_node(&mut self, tag: &str, text: Option<&Text>, attrib: &[(String, String)]) -> usize {
        let mut entries = BTreeMap::new();
        if let Some(text) = text {
            let id = self.push(JsonNode::Scalar(text.value.clone()));
            entries.insert(tag.to_string(), id);
            if let Some(lang) = &text.language {
                let id = self.push(JsonNode::Scalar(lang.clone()));
                entries.insert("lang".to_string(), id);
            }
        }
        for (name, value) in attrib {
            let id = self.push(JsonNode::Scalar(value.clone()));
            entries.insert(name.clone(), id);
        }
        self.push(JsonNode::Object(entries))
    }

    fn push(&mut self, node: JsonNode) -> usize {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    fn to_value(&self, node: usize) -> Value {
        match &self.nodes[node] {
            JsonNode::Scalar(s) => Value::String(s.clone()),
            JsonNode::List(items) => {
                Value::Array(items.iter().map(|&i| self.to_value(i)).collect())
            }
            JsonNode::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, &v)| (k.clone(), self.to_value(v)))
                    .collect(),
            ),
        }
    }

    /// The finished document as a JSON value
    pub fn finish(&self) -> Value {
        self.to_value(0)
    }

    /// Pretty-printed document, two-space indent, keys sorted
    pub fn render(&self) -> String {
        serde_json::to_string_pretty(&self.finish()).unwrap_or_default()
    }
}

impl TreeSink for JsonSink {
    type Handle = usize;

    fn root(&self) -> usize {
        0
    }

    fn add_child(&mut self, parent: usize, tag: &str, child: Child) -> usize {
        let parent_is_list = matches!(self.nodes[parent], JsonNode::List(_));
        let child_id = if child.is_list {
            if child.text.is_none() && child.attrib.is_empty() {
                self.push(JsonNode::List(Vec::new()))
            } else {
                // repeated item without a wrapper
                self.object_node(tag, child.text.as_ref(), &child.attrib)
            }
        } else if child
            .text
            .as_ref()
            .is_some_and(|t| !t.value.is_empty())
            && child.attrib.is_empty()
            && !parent_is_list
        {
            self.push(JsonNode::Scalar(
                child.text.as_ref().map(|t| t.value.clone()).unwrap_or_default(),
            ))
        } else {
            self.object_node(tag, child.text.as_ref(), &child.attrib)
        };

        let attach_to_list = child.is_list && matches!(self.nodes[child_id], JsonNode::Object(_));
        if parent_is_list {
            if let JsonNode::List(items) = &mut self.nodes[parent] {
                items.push(child_id);
            }
        } else if attach_to_list {
            // repeated item: collect under an array keyed by the tag
            let existing = match &self.nodes[parent] {
                JsonNode::Object(entries) => entries.get(tag).copied(),
                _ => None,
            };
            let list_id = match existing {
                Some(id) if matches!(self.nodes[id], JsonNode::List(_)) => id,
                _ => {
                    let id = self.push(JsonNode::List(Vec::new()));
                    if let JsonNode::Object(entries) = &mut self.nodes[parent] {
                        entries.insert(tag.to_string(), id);
                    }
                    id
                }
            };
            if let JsonNode::List(items) = &mut self.nodes[list_id] {
                items.push(child_id);
            }
        } else if let JsonNode::Object(entries) = &mut self.nodes[parent] {
            entries.insert(tag.to_string(), child_id);
        }
        child_id
    }

    fn child_count(&self, node: usize) -> usize {
        match &self.nodes[node] {
            JsonNode::Object(entries) => entries.len(),
            JsonNode::List(items) => items.len(),
            JsonNode::Scalar(_) => 0,
        }
    }
}
