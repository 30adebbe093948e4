//! Builds an element tree from quick-xml events

use std::borrow::Cow;
use std::io::BufRead;

use quick_xml::escape::{resolve_xml_entity, unescape};
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;

use crate::config::MAX_DEPTH;
use crate::error::{Error, Result};
use crate::xml::model::Element;

/// Parse a complete XML document held in memory
pub fn read_tree(content: &[u8]) -> Result<Element> {
    read_tree_from(content)
}

/// Parse an XML document from a buffered stream.
///
/// The declaration, comments, processing instructions and DOCTYPE are
/// skipped. Nesting is tracked on an explicit stack, not by recursion, and
/// is limited to [`MAX_DEPTH`] elements.
pub fn read_tree_from<R: BufRead>(source: R) -> Result<Element> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut builder = TreeBuilder::default();

    loop {
        let offset = position(&reader);
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => builder.open(open_element(&start, offset)?, offset)?,
            Event::Empty(start) => {
                builder.open(open_element(&start, offset)?, offset)?;
                builder.close(offset)?;
            }
            Event::End(_) => builder.close(offset)?,
            Event::Text(text) => {
                builder.text(&normalize_line_ends(utf8(&text, offset)?), offset)?;
            }
            Event::CData(cdata) => {
                builder.text(&normalize_line_ends(utf8(&cdata, offset)?), offset)?;
            }
            Event::GeneralRef(reference) => {
                builder.text(&resolve_reference(&reference, offset)?, offset)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    builder.finish(position(&reader))
}

fn position<R>(reader: &Reader<R>) -> u64 {
    u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX)
}

fn open_element(start: &BytesStart<'_>, offset: u64) -> Result<Element> {
    let mut element = Element::new(utf8(start.name().as_ref(), offset)?);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::malformed(offset, e.to_string()))?;
        let name = utf8(attr.key.as_ref(), offset)?;
        // Literal whitespace is folded before references are expanded, so
        // `&#10;` still yields a newline.
        let raw = normalize_attribute(utf8(&attr.value, offset)?);
        let value = unescape(&raw).map_err(|e| Error::malformed(offset, e.to_string()))?;
        element.set(name, value.into_owned());
    }
    Ok(element)
}

/// Expand a character reference or one of the predefined entities
fn resolve_reference(reference: &BytesRef<'_>, offset: u64) -> Result<Cow<'static, str>> {
    let resolved = reference
        .resolve_char_ref()
        .map_err(|e| Error::malformed(offset, e.to_string()))?;
    if let Some(ch) = resolved {
        return Ok(Cow::Owned(ch.to_string()));
    }
    let name = utf8(reference, offset)?;
    resolve_xml_entity(name)
        .map(Cow::Borrowed)
        .ok_or_else(|| Error::malformed(offset, format!("undefined entity &{name};")))
}

/// `\r\n` and a lone `\r` become `\n`
fn normalize_line_ends(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Literal tabs and line ends in an attribute value become spaces
fn normalize_attribute(raw: &str) -> Cow<'_, str> {
    let text = normalize_line_ends(raw);
    if text.contains(['\t', '\n']) {
        Cow::Owned(text.replace(['\t', '\n'], " "))
    } else {
        text
    }
}

/// Elements still open, plus the finished root once the outermost one closes
#[derive(Debug, Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    root: Option<Element>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element, offset: u64) -> Result<()> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(Error::malformed(
                offset,
                format!("junk after document element: <{}>", element.tag),
            ));
        }
        if self.stack.len() >= MAX_DEPTH {
            return Err(Error::DepthLimit { limit: MAX_DEPTH });
        }
        self.stack.push(element);
        Ok(())
    }

    fn close(&mut self, offset: u64) -> Result<()> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| Error::malformed(offset, "closing tag without an open element"))?;
        match self.stack.last_mut() {
            Some(parent) => parent.append(element),
            None => self.root = Some(element),
        }
        Ok(())
    }

    fn text(&mut self, text: &str, offset: u64) -> Result<()> {
        match self.stack.last_mut() {
            Some(current) if current.children.is_empty() => {
                current.text.get_or_insert_with(String::new).push_str(text);
            }
            // tail text
            Some(_) => {}
            None if text.trim().is_empty() => {}
            None => return Err(Error::malformed(offset, "text outside of the root element")),
        }
        Ok(())
    }

    fn finish(mut self, offset: u64) -> Result<Element> {
        if let Some(open) = self.stack.pop() {
            return Err(Error::malformed(
                offset,
                format!("unclosed element <{}>", open.tag),
            ));
        }
        self.root
            .ok_or_else(|| Error::malformed(offset, "no element found"))
    }
}

fn utf8(bytes: &[u8], offset: u64) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| Error::malformed(offset, "invalid utf-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_simple_element() -> Result<()> {
        let root = read_tree(b"<root></root>")?;
        assert_eq!(root, Element::new("root"));
        Ok(())
    }

    #[test]
    fn test_read_attributes_in_document_order() -> Result<()> {
        let root = read_tree(b"<root id=\"1\" name='test'/>")?;
        let attrs: Vec<_> = root
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(attrs, vec![("id", "1"), ("name", "test")]);
        Ok(())
    }

    #[test]
    fn test_read_nested_with_text() -> Result<()> {
        let root = read_tree(b"<root><child>text</child><other/></root>")?;
        let expected = Element::new("root")
            .with_child(Element::new("child").with_text("text"))
            .with_child(Element::new("other"));
        assert_eq!(root, expected);
        Ok(())
    }

    #[test]
    fn test_text_keeps_whitespace() -> Result<()> {
        let root = read_tree(b"<a>\n  hello \n</a>")?;
        assert_eq!(root.text.as_deref(), Some("\n  hello \n"));
        Ok(())
    }

    #[test]
    fn test_tail_text_is_dropped() -> Result<()> {
        let root = read_tree(b"<a>head<b/>tail</a>")?;
        assert_eq!(root.text.as_deref(), Some("head"));
        assert_eq!(root.children, vec![Element::new("b")]);
        Ok(())
    }

    #[test]
    fn test_entities_and_cdata() -> Result<()> {
        let root = read_tree(b"<a t=\"x &amp; y\">1 &lt; 2 &#65;&#x42;<![CDATA[<raw>]]></a>")?;
        assert_eq!(root.attributes.get("t").map(String::as_str), Some("x & y"));
        assert_eq!(root.text.as_deref(), Some("1 < 2 AB<raw>"));
        Ok(())
    }

    #[test]
    fn test_prolog_and_comments_skipped() -> Result<()> {
        let input = b"<?xml version=\"1.0\"?>\n<!-- top -->\n<a><!-- inner --><?pi data?><b/></a>\n";
        let root = read_tree(input)?;
        assert_eq!(root, Element::new("a").with_child(Element::new("b")));
        Ok(())
    }

    #[test]
    fn test_malformed_inputs() {
        let inputs: [&[u8]; 7] = [
            b"",
            b"   ",
            b"<a></b>",
            b"<a><b></b>",
            b"<a/><b/>",
            b"text<a/>",
            b"<a>&bogus;</a>",
        ];
        for input in inputs {
            assert!(read_tree(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_invalid_character_references() {
        let inputs: [&[u8]; 5] = [
            b"<a>&#+65;</a>",
            b"<a x=\"&#+66;\"/>",
            b"<a>x&#0;y</a>",
            b"<a x=\"&#0;\"/>",
            b"<a x=\"&nope;\"/>",
        ];
        for input in inputs {
            assert!(read_tree(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_attribute_whitespace_is_normalized() -> Result<()> {
        let root = read_tree(b"<a x=\"1\n2\tz\" y=\"l\r\nr\"/>")?;
        assert_eq!(root.attributes.get("x").map(String::as_str), Some("1 2 z"));
        assert_eq!(root.attributes.get("y").map(String::as_str), Some("l r"));
        Ok(())
    }

    #[test]
    fn test_attribute_character_references_keep_whitespace() -> Result<()> {
        let root = read_tree(b"<a x=\"1&#10;2&#9;3&#13;\"/>")?;
        assert_eq!(root.attributes.get("x").map(String::as_str), Some("1\n2\t3\r"));
        Ok(())
    }

    #[test]
    fn test_text_line_ends_are_normalized() -> Result<()> {
        let root = read_tree(b"<a>one\r\ntwo\rthree&#13;</a>")?;
        assert_eq!(root.text.as_deref(), Some("one\ntwo\nthree\r"));
        Ok(())
    }

    #[test]
    fn test_nesting_limit() -> Result<()> {
        let nested = |depth: usize| format!("{}{}", "<n>".repeat(depth), "</n>".repeat(depth));

        let root = read_tree(nested(MAX_DEPTH).as_bytes())?;
        assert_eq!(root.tag, "n");

        let err = read_tree(nested(MAX_DEPTH + 1).as_bytes());
        assert!(matches!(err, Err(Error::DepthLimit { limit: MAX_DEPTH })));
        Ok(())
    }

    #[test]
    fn test_read_from_stream() -> Result<()> {
        let source = std::io::BufReader::new(&b"<a x=\"1\"/>"[..]);
        let root = read_tree_from(source)?;
        assert_eq!(root, Element::new("a").with_attribute("x", "1"));
        Ok(())
    }
}
