// SPDX-License-Identifier: MPL-2.0
//! The rendered document: a markup tree plus the binding registry.
//!
//! Binding points are declared with `data-i18n` (text/placeholder),
//! `data-i18n-html` (trusted markup) and `data-i18n-attr`
//! (`"attribute:key"`) attributes; `data-lang` marks language-selection
//! triggers. The registry is enumerated once when the document is built
//! rather than re-scanned on every application pass.

use crate::error::Result;

mod parse;

/// Tags whose elements never have children and take no closing tag.
pub(crate) const VOID_TAGS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Verbatim markup, emitted unescaped. Produced by markup bindings and
    /// by doctype declarations.
    Raw(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `name` to `value`, replacing an existing value. Attribute order
    /// is otherwise preserved.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    /// Concatenated text content of direct and nested children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(text.to_string())];
    }

    /// Replaces all children with verbatim markup. Trusted content only.
    pub fn set_raw_inner(&mut self, markup: &str) {
        self.children = vec![Node::Raw(markup.to_string())];
    }

    /// Elements whose text binding targets the `placeholder` attribute
    /// instead of their content.
    pub fn is_form_input(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea")
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
            _ => {}
        }
    }
}

/// Child-index path from the document roots to an element.
pub type NodePath = Vec<usize>;

#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind {
    /// `data-i18n`: text content, or `placeholder` for form inputs.
    Text { key: String },
    /// `data-i18n-html`: inner markup, verbatim.
    Markup { key: String },
    /// `data-i18n-attr="attr:key"`: one named attribute.
    Attribute { attr: String, key: String },
}

impl BindingKind {
    pub fn key(&self) -> &str {
        match self {
            BindingKind::Text { key } | BindingKind::Markup { key } => key,
            BindingKind::Attribute { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub path: NodePath,
    pub kind: BindingKind,
}

/// An element marked with `data-lang` as a selection trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageTrigger {
    pub path: NodePath,
    pub code: String,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    roots: Vec<Node>,
    bindings: Vec<Binding>,
    triggers: Vec<LanguageTrigger>,
}

impl Document {
    /// Parses markup into a document and enumerates its binding points.
    pub fn parse(source: &str) -> Result<Self> {
        Ok(Self::from_nodes(parse::parse_nodes(source)?))
    }

    pub fn from_nodes(roots: Vec<Node>) -> Self {
        let mut doc = Self {
            roots,
            bindings: Vec::new(),
            triggers: Vec::new(),
        };
        doc.rebuild_registry();
        doc
    }

    /// Re-enumerates binding points after structural edits.
    pub fn rebuild_registry(&mut self) {
        self.bindings.clear();
        self.triggers.clear();
        let mut path = Vec::new();
        scan(
            &self.roots,
            &mut path,
            &mut self.bindings,
            &mut self.triggers,
        );
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn triggers(&self) -> &[LanguageTrigger] {
        &self.triggers
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for idx in rest {
            let Node::Element(el) = node else { return None };
            node = el.children.get(*idx)?;
        }
        match node {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get_mut(*first)?;
        for idx in rest {
            let Node::Element(el) = node else { return None };
            node = el.children.get_mut(*idx)?;
        }
        match node {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        let path = self.find_path(&|el| el.attr("id") == Some(id))?;
        self.element_at(&path)
    }

    pub fn element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        let path = self.find_path(&|el| el.attr("id") == Some(id))?;
        self.element_at_mut(&path)
    }

    /// Sets the `<title>` text, if the document has one.
    pub fn set_title(&mut self, title: &str) -> bool {
        if let Some(path) = self.find_path(&|el| el.tag == "title") {
            if let Some(el) = self.element_at_mut(&path) {
                el.set_text(title);
                return true;
            }
        }
        false
    }

    pub fn title(&self) -> Option<String> {
        let path = self.find_path(&|el| el.tag == "title")?;
        self.element_at(&path).map(|el| el.text())
    }

    /// Sets the `content` of `<meta name="...">`, if present.
    pub fn set_meta_content(&mut self, name: &str, content: &str) -> bool {
        let matcher = |el: &Element| el.tag == "meta" && el.attr("name") == Some(name);
        if let Some(path) = self.find_path(&matcher) {
            if let Some(el) = self.element_at_mut(&path) {
                el.set_attr("content", content);
                return true;
            }
        }
        false
    }

    pub fn meta_content(&self, name: &str) -> Option<String> {
        let path = self.find_path(&|el| el.tag == "meta" && el.attr("name") == Some(name))?;
        self.element_at(&path)
            .and_then(|el| el.attr("content"))
            .map(|s| s.to_string())
    }

    /// Sets the declared language on the root `<html>` element.
    pub fn set_lang(&mut self, code: &str) -> bool {
        if let Some(path) = self.find_path(&|el| el.tag == "html") {
            if let Some(el) = self.element_at_mut(&path) {
                el.set_attr("lang", code);
                return true;
            }
        }
        false
    }

    pub fn lang(&self) -> Option<String> {
        let path = self.find_path(&|el| el.tag == "html")?;
        self.element_at(&path)
            .and_then(|el| el.attr("lang"))
            .map(|s| s.to_string())
    }

    fn find_path(&self, matcher: &dyn Fn(&Element) -> bool) -> Option<NodePath> {
        let mut path = Vec::new();
        find_in(&self.roots, matcher, &mut path).then_some(path)
    }

    /// Serializes back to markup. `Raw` nodes are emitted verbatim.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_nodes(&self.roots, &mut out);
        out
    }
}

fn scan(
    nodes: &[Node],
    path: &mut NodePath,
    bindings: &mut Vec<Binding>,
    triggers: &mut Vec<LanguageTrigger>,
) {
    for (i, node) in nodes.iter().enumerate() {
        let Node::Element(el) = node else { continue };
        path.push(i);
        if let Some(key) = el.attr("data-i18n") {
            bindings.push(Binding {
                path: path.clone(),
                kind: BindingKind::Text {
                    key: key.to_string(),
                },
            });
        }
        if let Some(key) = el.attr("data-i18n-html") {
            bindings.push(Binding {
                path: path.clone(),
                kind: BindingKind::Markup {
                    key: key.to_string(),
                },
            });
        }
        if let Some(descriptor) = el.attr("data-i18n-attr") {
            // Split on the first ':' only; keys may not contain one but
            // attribute values are free-form.
            match descriptor.split_once(':') {
                Some((attr, key)) if !attr.is_empty() && !key.is_empty() => {
                    bindings.push(Binding {
                        path: path.clone(),
                        kind: BindingKind::Attribute {
                            attr: attr.to_string(),
                            key: key.to_string(),
                        },
                    });
                }
                _ => {
                    tracing::warn!(descriptor, "ignoring malformed data-i18n-attr descriptor");
                }
            }
        }
        if let Some(code) = el.attr("data-lang") {
            triggers.push(LanguageTrigger {
                path: path.clone(),
                code: code.to_string(),
            });
        }
        scan(&el.children, path, bindings, triggers);
        path.pop();
    }
}

fn find_in(nodes: &[Node], matcher: &dyn Fn(&Element) -> bool, path: &mut NodePath) -> bool {
    for (i, node) in nodes.iter().enumerate() {
        let Node::Element(el) = node else { continue };
        path.push(i);
        if matcher(el) || find_in(&el.children, matcher, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(&escape_text(t)),
            Node::Raw(markup) => out.push_str(markup),
            Node::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            Node::Element(el) => write_element(el, out),
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');
    if VOID_TAGS.contains(&el.tag.as_str()) {
        return;
    }
    write_nodes(&el.children, out);
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
