//! Serializes an element tree with a UTF-8 XML declaration

use std::io::Write;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::xml::model::Element;

/// Write `root` to `out`, preceded by `<?xml version="1.0" encoding="UTF-8"?>`.
///
/// Text and attribute values are escaped, including the whitespace a reader
/// would otherwise normalize; elements without text or children are written
/// as empty-element tags. No indentation is added.
pub fn write_tree<W: Write>(root: &Element, out: W) -> Result<()> {
    let mut writer = Writer::new(out);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (name, value) in &element.attributes {
        let value = escape_attribute(value);
        start.push_attribute((name.as_bytes(), value.as_bytes()));
    }

    if element.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = element.text.as_deref().filter(|t| !t.is_empty()) {
        let text = escape(text).replace('\r', "&#13;");
        writer.write_event(Event::Text(BytesText::from_escaped(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    Ok(())
}

fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\t', "&#9;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
}
