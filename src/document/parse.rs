// SPDX-License-Identifier: MPL-2.0
//! Markup parsing into the document tree.
//!
//! Built on `quick-xml` with two HTML accommodations: void elements
//! (`<meta>`, `<br>`, ...) need no closing tag, and stray or missing end
//! tags are tolerated rather than rejected.

use super::{Element, Node, VOID_TAGS};
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub(super) fn parse_nodes(source: &str) -> Result<Vec<Node>> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().check_end_names = false;
    // Without this, quick-xml still tracks its own open-tag stack and a
    // stray end tag desynchronizes it, failing the next genuine close.
    reader.config_mut().allow_unmatched_ends = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let el = element_from(&e)?;
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    attach(&mut stack, &mut roots, Node::Element(el));
                } else {
                    stack.push(el);
                }
            }
            Ok(Event::Empty(e)) => {
                attach(&mut stack, &mut roots, Node::Element(element_from(&e)?));
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
                if stack.iter().any(|el| el.tag == name) {
                    // Close intervening unclosed elements along the way.
                    loop {
                        let el = match stack.pop() {
                            Some(el) => el,
                            None => break,
                        };
                        let done = el.tag == name;
                        attach(&mut stack, &mut roots, Node::Element(el));
                        if done {
                            break;
                        }
                    }
                }
                // A stray end tag with no matching open element is dropped.
            }
            Ok(Event::Text(t)) => {
                let text = match t.unescape() {
                    Ok(cow) => cow.into_owned(),
                    // HTML entities unknown to XML (e.g. &nbsp;) stay raw.
                    Err(_) => String::from_utf8_lossy(t.as_ref()).into_owned(),
                };
                if !text.is_empty() {
                    attach(&mut stack, &mut roots, Node::Text(text));
                }
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                attach(&mut stack, &mut roots, Node::Text(text));
            }
            Ok(Event::Comment(t)) => {
                let comment = String::from_utf8_lossy(t.as_ref()).into_owned();
                attach(&mut stack, &mut roots, Node::Comment(comment));
            }
            Ok(Event::DocType(t)) => {
                let doctype = String::from_utf8_lossy(t.as_ref()).trim().to_string();
                attach(&mut stack, &mut roots, Node::Raw(format!("<!DOCTYPE {doctype}>")));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Parse(format!(
                    "at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    // Anything still open at EOF closes implicitly.
    while let Some(el) = stack.pop() {
        attach(&mut stack, &mut roots, Node::Element(el));
    }

    Ok(roots)
}

fn attach(stack: &mut Vec<Element>, roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn element_from(e: &BytesStart) -> Result<Element> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
    let mut el = Element::new(tag);
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| Error::Parse(err.to_string()))?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).to_lowercase();
        let value = match attr.unescape_value() {
            Ok(cow) => cow.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        el.set_attr(&name, &value);
    }
    Ok(el)
}
