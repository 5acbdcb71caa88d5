// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! XML form of the tag database.
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <taglist xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
//!   <tag id="1" name="Animation">
//!     <beth>Animations</beth>
//!     <gems>160</gems>
//!     <nexus type="category">Animation</nexus>
//!     <nexus type="tag">Animation - Modified</nexus>
//!     <steam xsi:nil="true" />
//!   </tag>
//! </taglist>
//! ```
//!
//! Empty fields are written as a single nil-marked element, never omitted.
//! Child order is fixed: beth, gems, nexus, steam. Link text is read back
//! exactly as written, surrounding whitespace included.

use crate::tags::errors::{TagError, TagErrorKind, TagResult};
use crate::tags::record::{NexusKind, TagDatabase, TagId, TagRecord, empty_record};
use crate::tags::store;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};
use std::fmt::Write;
use std::path::Path;

const ROOT_ELEMENT: &str = "taglist";
const TAG_ELEMENT: &str = "tag";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub fn decode_file(path: &Path) -> TagResult<TagDatabase> {
    let content = store::read_file(path)?;
    decode(&content)
}

pub fn decode(xml: &str) -> TagResult<TagDatabase> {
    let mut reader = Reader::from_str(xml);

    let mut database = TagDatabase::new();
    let mut seen_root = false;
    loop {
        match next_event(&mut reader)? {
            Event::Start(start) => {
                expect_root(&start, seen_root)?;
                seen_root = true;
                read_taglist(&mut reader, &mut database)?;
            }
            Event::Empty(start) => {
                expect_root(&start, seen_root)?;
                seen_root = true;
            }
            Event::Text(text) if is_blank(&text) => {}
            Event::Text(_) | Event::CData(_) => {
                return Err(TagError::malformed(
                    "Unexpected text outside the taglist element",
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(TagError::malformed("Missing taglist root element"));
    }
    Ok(database)
}

fn next_event<'i>(reader: &mut Reader<&'i [u8]>) -> TagResult<Event<'i>> {
    reader.read_event().map_err(|err| {
        TagError::malformed(format!(
            "Malformed tag database near byte {}: {}",
            reader.buffer_position(),
            err
        ))
        .with_source(err)
    })
}

/// Indentation between elements. Text inside link elements is kept verbatim.
fn is_blank(text: &BytesText) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

fn skip_element(reader: &mut Reader<&[u8]>, start: &BytesStart) -> TagResult<()> {
    reader.read_to_end(start.name()).map_err(|err| {
        TagError::malformed(format!("Malformed tag database: {}", err)).with_source(err)
    })?;
    Ok(())
}

fn expect_root(start: &BytesStart, seen_root: bool) -> TagResult<()> {
    if seen_root {
        return Err(TagError::malformed("Multiple root elements"));
    }
    let name = element_name(start);
    if name != ROOT_ELEMENT {
        return Err(TagError::malformed(format!(
            "Expected root element '{}', found '{}'",
            ROOT_ELEMENT, name
        )));
    }
    Ok(())
}

fn read_taglist(reader: &mut Reader<&[u8]>, database: &mut TagDatabase) -> TagResult<()> {
    loop {
        match next_event(reader)? {
            Event::Start(start) => {
                if element_name(&start) != TAG_ELEMENT {
                    skip_element(reader, &start)?;
                    continue;
                }
                let (id, mut record) = open_tag(&start)?;
                read_tag_children(reader, &mut record)?;
                insert_unique(database, id, record)?;
            }
            Event::Empty(start) => {
                if element_name(&start) == TAG_ELEMENT {
                    let (id, record) = open_tag(&start)?;
                    insert_unique(database, id, record)?;
                }
            }
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(TagError::malformed(
                    "Unexpected end of document inside taglist",
                ));
            }
            _ => {}
        }
    }
}

fn insert_unique(database: &mut TagDatabase, id: TagId, record: TagRecord) -> TagResult<()> {
    if database.contains_key(&id) {
        return Err(TagError::new(
            TagErrorKind::DuplicateIdentifier,
            format!("Duplicate tag ID: {}", id),
        ));
    }
    database.insert(id, record);
    Ok(())
}

fn open_tag(start: &BytesStart) -> TagResult<(TagId, TagRecord)> {
    let attrs = ElementAttrs::read(start)?;
    let raw_id = attrs
        .id
        .ok_or_else(|| TagError::malformed("Tag element is missing the id attribute"))?;
    let id = TagId::parse(&raw_id).ok_or_else(|| {
        TagError::malformed(format!(
            "Tag id '{}' is not a canonical decimal integer",
            raw_id
        ))
    })?;
    let name = attrs.name.ok_or_else(|| {
        TagError::malformed(format!("Tag {} is missing the name attribute", id))
    })?;
    let mut record = empty_record();
    record.name = name;
    Ok((id, record))
}

fn read_tag_children(reader: &mut Reader<&[u8]>, record: &mut TagRecord) -> TagResult<()> {
    loop {
        match next_event(reader)? {
            Event::Start(start) => {
                let attrs = ElementAttrs::read(&start)?;
                let text = read_text(reader)?;
                apply_link(record, &element_name(&start), attrs, text)?;
            }
            Event::Empty(start) => {
                let attrs = ElementAttrs::read(&start)?;
                apply_link(record, &element_name(&start), attrs, String::new())?;
            }
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(TagError::malformed("Unexpected end of document inside tag"));
            }
            _ => {}
        }
    }
}

fn read_text(reader: &mut Reader<&[u8]>) -> TagResult<String> {
    let mut text = String::new();
    loop {
        match next_event(reader)? {
            Event::Text(value) => {
                let value = value.unescape().map_err(|err| {
                    TagError::malformed(format!("Invalid text content: {}", err)).with_source(err)
                })?;
                text.push_str(&value);
            }
            Event::CData(value) => {
                let value = std::str::from_utf8(&value).map_err(|err| {
                    TagError::malformed(format!("Invalid CDATA content: {}", err)).with_source(err)
                })?;
                text.push_str(value);
            }
            Event::Start(nested) => skip_element(reader, &nested)?,
            Event::End(_) => return Ok(text),
            Event::Eof => {
                return Err(TagError::malformed(
                    "Unexpected end of document inside a link element",
                ));
            }
            _ => {}
        }
    }
}

fn apply_link(
    record: &mut TagRecord,
    element: &str,
    attrs: ElementAttrs,
    text: String,
) -> TagResult<()> {
    if attrs.nil || text.is_empty() {
        return Ok(());
    }
    match element {
        "beth" => record.beth.push(text),
        "gems" => record.gems.push(text),
        "steam" => record.steam.push(text),
        "nexus" => {
            let kind = attrs
                .kind
                .as_deref()
                .and_then(NexusKind::parse)
                .ok_or_else(|| {
                    TagError::malformed(format!(
                        "Nexus link '{}' of tag '{}' needs type=\"category\" or type=\"tag\"",
                        text, record.name
                    ))
                })?;
            record.nexus.push(kind, text);
        }
        _ => {}
    }
    Ok(())
}

fn element_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

#[derive(Debug, Default)]
struct ElementAttrs {
    id: Option<String>,
    name: Option<String>,
    kind: Option<String>,
    nil: bool,
}

impl ElementAttrs {
    fn read(start: &BytesStart) -> TagResult<Self> {
        let mut attrs = Self::default();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| {
                TagError::malformed(format!("Invalid attribute: {}", err)).with_source(err)
            })?;
            let value = attr
                .unescape_value()
                .map_err(|err| {
                    TagError::malformed(format!("Invalid attribute value: {}", err))
                        .with_source(err)
                })?
                .into_owned();
            match attr.key.local_name().as_ref() {
                b"id" => attrs.id = Some(value),
                b"name" => attrs.name = Some(value),
                b"type" => attrs.kind = Some(value),
                b"nil" => attrs.nil = value == "true" || value == "1",
                _ => {}
            }
        }
        Ok(attrs)
    }
}

/// Encodes records in the order given.
pub fn encode<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a TagId, &'a TagRecord)>,
{
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<{} xmlns:xsi=\"{}\">", ROOT_ELEMENT, XSI_NAMESPACE);
    for (id, record) in entries {
        let _ = writeln!(
            xml,
            "  <{} id=\"{}\" name=\"{}\">",
            TAG_ELEMENT,
            id,
            escape_xml(&record.name)
        );
        write_links(&mut xml, "beth", &record.beth);
        write_links(&mut xml, "gems", &record.gems);
        if record.nexus.is_empty() {
            write_nil(&mut xml, "nexus");
        } else {
            for (kind, values) in [
                (NexusKind::Category, &record.nexus.category),
                (NexusKind::Tag, &record.nexus.tag),
            ] {
                for value in values {
                    let _ = writeln!(
                        xml,
                        "    <nexus type=\"{}\">{}</nexus>",
                        kind.as_str(),
                        escape_xml(value)
                    );
                }
            }
        }
        write_links(&mut xml, "steam", &record.steam);
        let _ = writeln!(xml, "  </{}>", TAG_ELEMENT);
    }
    let _ = writeln!(xml, "</{}>", ROOT_ELEMENT);
    xml
}

pub fn encode_database(database: &TagDatabase) -> String {
    encode(database.iter())
}

fn write_links(xml: &mut String, element: &str, values: &[String]) {
    if values.is_empty() {
        write_nil(xml, element);
        return;
    }
    for value in values {
        let _ = writeln!(xml, "    <{0}>{1}</{0}>", element, escape_xml(value));
    }
}

fn write_nil(xml: &mut String, element: &str) {
    let _ = writeln!(xml, "    <{} xsi:nil=\"true\" />", element);
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
