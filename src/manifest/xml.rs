//! Manifest XML format.
//!
//! # Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <resources xmlns="urn:skinpack:resources">
//!   <css value="common/base.css"/>
//!   <css value="print.css" media="print" included="aggregated"/>
//!   <js value="/static/jquery.js" compressed="true"/>
//!   <js value="widgets/skin.xml" import="true"/>
//!   <parameter name="theme" value="dark"/>
//! </resources>
//! ```
//!
//! Elements and attributes are matched by local name, so any namespace
//! prefix is accepted. Unknown attributes and elements are ignored.

use std::borrow::Cow;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::model::{Entry, Manifest, Parameter, Scope};
use crate::asset::AssetKind;
use crate::error::LoadError;

const ROOT: &str = "resources";
const NAMESPACE: &str = "urn:skinpack:resources";
const PARAMETER: &str = "parameter";

// ============================================================================
// Parsing
// ============================================================================

/// Parse manifest XML. `path` is only used for error context.
pub fn parse(content: &str, path: &Path) -> Result<Manifest, LoadError> {
    let fail = |message: String| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut manifest = Manifest::new();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            fail(format!(
                "malformed XML at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(elem) => {
                if depth == 0 {
                    check_root(&elem, seen_root).map_err(fail)?;
                    seen_root = true;
                } else if depth == 1 {
                    read_child(&elem, &mut manifest).map_err(fail)?;
                }
                depth += 1;
            }
            Event::Empty(elem) => {
                if depth == 0 {
                    check_root(&elem, seen_root).map_err(fail)?;
                    seen_root = true;
                } else if depth == 1 {
                    read_child(&elem, &mut manifest).map_err(fail)?;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            // Declarations, comments, whitespace and stray text
            _ => {}
        }
    }

    if !seen_root {
        return Err(fail(format!("missing <{ROOT}> root element")));
    }
    if depth != 0 {
        return Err(fail("unexpected end of document".to_string()));
    }
    Ok(manifest)
}

fn check_root(elem: &BytesStart<'_>, seen_root: bool) -> Result<(), String> {
    let name = local_name(elem);
    if seen_root {
        return Err(format!("unexpected second root element <{name}>"));
    }
    if name != ROOT {
        return Err(format!("expected <{ROOT}> root element, found <{name}>"));
    }
    Ok(())
}

fn read_child(elem: &BytesStart<'_>, manifest: &mut Manifest) -> Result<(), String> {
    let name = local_name(elem);
    let kind = AssetKind::ALL.into_iter().find(|k| k.element() == name);

    match kind {
        Some(kind) => {
            let entry = read_entry(elem, kind)?;
            manifest.entries_mut(kind).push(entry);
        }
        None if name == PARAMETER => manifest.parameters.push(read_parameter(elem)?),
        None => {}
    }
    Ok(())
}

fn read_entry(elem: &BytesStart<'_>, kind: AssetKind) -> Result<Entry, String> {
    let element = kind.element();
    let mut value = None;
    let mut entry = Entry::default();

    for (key, raw) in attributes(elem)? {
        match key.as_str() {
            "value" => value = Some(raw),
            "included" => {
                entry.scope = raw
                    .parse()
                    .map_err(|e| format!("<{element}> attribute `included`: {e}"))?;
            }
            "conditional" => entry.conditional = Some(raw),
            "media" if kind == AssetKind::Css => entry.media = Some(raw),
            "compressed" => entry.compressed = parse_bool(element, &key, &raw)?,
            "import" => entry.import = parse_bool(element, &key, &raw)?,
            "resource" => entry.resource = parse_bool(element, &key, &raw)?,
            _ => {}
        }
    }

    entry.value = value.ok_or_else(|| format!("<{element}> is missing `value`"))?;
    Ok(entry)
}

fn read_parameter(elem: &BytesStart<'_>) -> Result<Parameter, String> {
    let mut name = None;
    let mut value = None;
    for (key, raw) in attributes(elem)? {
        match key.as_str() {
            "name" => name = Some(raw),
            "value" => value = Some(raw),
            _ => {}
        }
    }

    Ok(Parameter {
        name: name.ok_or_else(|| format!("<{PARAMETER}> is missing `name`"))?,
        value: value.unwrap_or_default(),
    })
}

/// Local-name / unescaped-value pairs, skipping namespace declarations.
fn attributes(elem: &BytesStart<'_>) -> Result<Vec<(String, String)>, String> {
    let mut out = Vec::new();
    for attr in elem.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on <{}>: {e}", local_name(elem)))?;
        let qualified = attr.key.as_ref();
        if qualified == b"xmlns" || qualified.starts_with(b"xmlns:") {
            continue;
        }

        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("bad value for `{key}`: {e}"))?
            .into_owned();
        out.push((key, value));
    }
    Ok(out)
}

fn local_name(elem: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(elem.local_name().as_ref()).into_owned()
}

/// `xs:boolean` lexical forms.
fn parse_bool(element: &str, key: &str, raw: &str) -> Result<bool, String> {
    match raw.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(format!(
            "<{element}> attribute `{key}` must be true or false, found `{other}`"
        )),
    }
}

// ============================================================================
// Serialization
// ============================================================================

/// Render a manifest. `encoding` is the label written in the declaration.
///
/// Attributes holding their default value are omitted.
pub fn to_xml(manifest: &Manifest, encoding: &str) -> String {
    let mut xml = String::with_capacity(256 + 64 * (manifest.css.len() + manifest.js.len()));

    xml.push_str("<?xml version=\"1.0\" encoding=\"");
    xml.push_str(&escape_xml(encoding));
    xml.push_str("\"?>\n<");
    xml.push_str(ROOT);
    xml.push_str(" xmlns=\"");
    xml.push_str(NAMESPACE);
    xml.push_str("\">\n");

    for kind in AssetKind::ALL {
        for entry in manifest.entries(kind) {
            write_entry(&mut xml, kind, entry);
        }
    }

    for param in &manifest.parameters {
        xml.push_str("  <parameter");
        push_attr(&mut xml, "name", &param.name);
        push_attr(&mut xml, "value", &param.value);
        xml.push_str("/>\n");
    }

    xml.push_str("</");
    xml.push_str(ROOT);
    xml.push_str(">\n");
    xml
}

fn write_entry(xml: &mut String, kind: AssetKind, entry: &Entry) {
    xml.push_str("  <");
    xml.push_str(kind.element());
    push_attr(xml, "value", &entry.value);
    if entry.scope != Scope::Plain {
        push_attr(xml, "included", entry.scope.as_str());
    }
    if let Some(conditional) = &entry.conditional {
        push_attr(xml, "conditional", conditional);
    }
    if kind == AssetKind::Css
        && let Some(media) = &entry.media
    {
        push_attr(xml, "media", media);
    }
    if entry.compressed {
        push_attr(xml, "compressed", "true");
    }
    if entry.import {
        push_attr(xml, "import", "true");
    }
    if entry.resource {
        push_attr(xml, "resource", "true");
    }
    xml.push_str("/>\n");
}

fn push_attr(xml: &mut String, name: &str, value: &str) {
    xml.push(' ');
    xml.push_str(name);
    xml.push_str("=\"");
    xml.push_str(&escape_xml(value));
    xml.push('"');
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
