//! The Identifier and per-kind node parsers (spec §4.3–§4.8).
//!
//! A hand-rolled recursive-descent parser, dispatching by prefix the same
//! way the teacher crate's `parse.rs`/`tokenizer.rs` do, but directly
//! against the owned arena in [`crate::node`] rather than producing a
//! borrowed, namespace-aware tree.

use crate::cursor::{Encoding, DEFAULT_TAB_SIZE};
use crate::entity;
use crate::error::{Error, ErrorId};
use crate::node::{Attributes, NodeKind};
use crate::scan::{self, Scanner};
use crate::{Document, NodeId};

/// Per-parse configuration (spec §5: the process-wide whitespace toggle is
/// promoted to a per-parse value; spec.md §9/§10 adds `tab_size`).
#[derive(Clone, Copy, Debug)]
pub struct ParsingOptions {
    /// Trim and collapse internal whitespace in text nodes (spec §4.5).
    pub condense_whitespace: bool,
    /// Tab stop width used by the cursor and by indentation on serialize.
    pub tab_size: u32,
    /// Encoding mode to start in, absent a BOM or Declaration overriding it.
    pub initial_encoding: Encoding,
}

impl Default for ParsingOptions {
    fn default() -> Self {
        ParsingOptions {
            condense_whitespace: true,
            tab_size: DEFAULT_TAB_SIZE,
            initial_encoding: Encoding::Utf8,
        }
    }
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parses a byte buffer into a [`Document`] (spec §2 data flow, §6 input contract).
pub(crate) fn parse(bytes: &[u8], options: ParsingOptions) -> Result<Document, Error> {
    let mut encoding = options.initial_encoding;
    if bytes.starts_with(UTF8_BOM) {
        encoding = Encoding::Utf8;
    }

    let mut scanner = Scanner::new(bytes, options.tab_size, encoding);
    let mut doc = Document::empty(options.tab_size);
    doc.set_bom(bytes.starts_with(UTF8_BOM));

    let result = parse_document(&mut scanner, &mut doc, &options, &mut encoding);

    match result {
        Ok(()) => Ok(doc),
        Err(err) => {
            doc.set_error(err.clone());
            Err(err)
        }
    }
}

fn parse_document(
    scanner: &mut Scanner<'_>,
    doc: &mut Document,
    options: &ParsingOptions,
    encoding: &mut Encoding,
) -> Result<(), Error> {
    loop {
        scanner.skip_whitespace();
        if scanner.at_end() {
            break;
        }

        if scanner.current() != Some(b'<') {
            return Err(Error::new(ErrorId::Generic, scanner.text_pos()));
        }

        match identify(scanner) {
            Ident::Declaration => {
                if doc.root().children().next().is_some() {
                    return Err(Error::new(ErrorId::DocumentTopOnly, scanner.text_pos()));
                }
                let id = parse_declaration(scanner, doc, encoding)?;
                doc.append_child(crate::ROOT, id);
            }
            Ident::Comment => {
                let id = parse_comment(scanner, doc)?;
                doc.append_child(crate::ROOT, id);
            }
            Ident::Unknown => {
                let id = parse_unknown(scanner, doc)?;
                doc.append_child(crate::ROOT, id);
            }
            Ident::Cdata => {
                return Err(Error::new(ErrorId::Generic, scanner.text_pos()));
            }
            Ident::Element => {
                if doc.root_element().is_some() {
                    return Err(Error::new(ErrorId::Generic, scanner.text_pos()));
                }
                parse_element(crate::ROOT, scanner, doc, options)?;
            }
            Ident::EndTag => {
                return Err(Error::new(ErrorId::ReadingEndTag, scanner.text_pos()));
            }
            Ident::Text | Ident::Eof => unreachable!(),
        }
    }

    if doc.root_element().is_none() {
        return Err(Error::new(ErrorId::DocumentEmpty, scanner.text_pos()));
    }

    Ok(())
}

enum Ident {
    Declaration,
    Comment,
    Cdata,
    Unknown,
    Element,
    EndTag,
    Text,
    Eof,
}

/// Classifies what begins at the scanner's current position (spec §4.3).
fn identify(scanner: &Scanner<'_>) -> Ident {
    if scanner.at_end() {
        return Ident::Eof;
    }
    if scanner.current() != Some(b'<') {
        return Ident::Text;
    }
    if scanner.starts_with(b"<?xml") {
        return Ident::Declaration;
    }
    if scanner.starts_with(b"<!--") {
        return Ident::Comment;
    }
    if scanner.starts_with(b"<![CDATA[") {
        return Ident::Cdata;
    }
    if scanner.starts_with(b"</") {
        return Ident::EndTag;
    }
    if scanner.starts_with(b"<!") {
        return Ident::Unknown;
    }
    if scan::is_name_start(scanner.full_bytes(), scanner.pos() + 1, scanner.encoding()) {
        return Ident::Element;
    }
    Ident::Unknown
}

/// Parses and appends one child node of `parent` (spec §4.4 step 3's
/// "call Identifier and parse the child node").
fn parse_child(parent: NodeId, scanner: &mut Scanner<'_>, doc: &mut Document, options: &ParsingOptions) -> Result<(), Error> {
    match identify(scanner) {
        Ident::Declaration => Err(Error::new(ErrorId::DocumentTopOnly, scanner.text_pos())),
        Ident::Comment => {
            let id = parse_comment(scanner, doc)?;
            doc.append_child(parent, id);
            Ok(())
        }
        Ident::Cdata => {
            let id = parse_cdata(scanner, doc)?;
            doc.append_child(parent, id);
            Ok(())
        }
        Ident::Unknown => {
            let id = parse_unknown(scanner, doc)?;
            doc.append_child(parent, id);
            Ok(())
        }
        Ident::Element => parse_element(parent, scanner, doc, options),
        Ident::Text => {
            let pos = scanner.text_pos();
            if let Some(text) = parse_text(scanner, options) {
                let id = doc.push_node(NodeKind::Text { cdata: false }, text, pos);
                doc.append_child(parent, id);
            }
            Ok(())
        }
        Ident::EndTag | Ident::Eof => unreachable!(),
    }
}

/// Element parser (spec §4.4).
fn parse_element(parent: NodeId, scanner: &mut Scanner<'_>, doc: &mut Document, options: &ParsingOptions) -> Result<(), Error> {
    let pos = scanner.text_pos();
    scanner.advance(1); // '<'

    let name = scanner
        .read_name()
        .ok_or_else(|| Error::new(ErrorId::FailedToReadElementName, pos))?;

    let node_id = doc.push_node(NodeKind::Element { attributes: Attributes::new() }, name.clone(), pos);
    doc.append_child(parent, node_id);

    loop {
        scanner.skip_whitespace();

        if scanner.starts_with(b"/>") {
            scanner.advance(2);
            return Ok(());
        }
        if scanner.starts_with(b">") {
            scanner.advance(1);
            break;
        }
        if scanner.at_end() {
            return Err(Error::new(ErrorId::EmbeddedNull, scanner.text_pos()));
        }

        let (attr_name, attr_value) = parse_attribute(scanner)?;
        doc.set_attribute(node_id, attr_name, attr_value);
    }

    loop {
        if scanner.at_end() {
            return Err(Error::new(ErrorId::ReadingEndTag, scanner.text_pos()));
        }

        if scanner.starts_with(b"</") {
            let end_pos = scanner.text_pos();
            scanner.advance(2);
            let end_name = scanner
                .read_name()
                .ok_or_else(|| Error::new(ErrorId::ReadingEndTag, end_pos))?;
            scanner.skip_whitespace();
            if !scanner.starts_with(b">") {
                return Err(Error::new(ErrorId::ReadingEndTag, end_pos));
            }
            scanner.advance(1);

            if end_name != name {
                return Err(Error::new(ErrorId::ReadingEndTag, end_pos));
            }
            return Ok(());
        }

        parse_child(node_id, scanner, doc, options)?;
    }
}

/// Attribute parser (spec §4.8).
fn parse_attribute(scanner: &mut Scanner<'_>) -> Result<(String, String), Error> {
    let pos = scanner.text_pos();

    let name = scanner.read_name().ok_or_else(|| Error::new(ErrorId::ReadingAttributes, pos))?;

    scanner.skip_whitespace();
    if scanner.current() != Some(b'=') {
        return Err(Error::new(ErrorId::ReadingAttributes, scanner.text_pos()));
    }
    scanner.advance(1);
    scanner.skip_whitespace();

    let value = match scanner.current() {
        Some(q @ b'"') | Some(q @ b'\'') => parse_quoted_attribute_value(scanner, q, pos)?,
        Some(_) => parse_unquoted_attribute_value(scanner, pos)?,
        None => return Err(Error::new(ErrorId::ReadingAttributes, pos)),
    };

    Ok((name, value))
}

fn decode_one(scanner: &mut Scanner<'_>, out: &mut String) {
    if scanner.current() == Some(b'&') {
        if let Some(d) = entity::try_decode(scanner.full_bytes(), scanner.pos(), scanner.encoding()) {
            out.push_str(&d.text);
            scanner.advance(d.len);
            return;
        }
    }
    if let Some(c) = scanner.advance_char() {
        out.push(c);
    }
}

fn parse_quoted_attribute_value(scanner: &mut Scanner<'_>, quote: u8, start_pos: crate::TextPos) -> Result<String, Error> {
    scanner.advance(1);
    let mut out = String::new();
    loop {
        match scanner.current() {
            Some(b) if b == quote => {
                scanner.advance(1);
                return Ok(out);
            }
            Some(_) => decode_one(scanner, &mut out),
            None => return Err(Error::new(ErrorId::ReadingAttributes, start_pos)),
        }
    }
}

fn parse_unquoted_attribute_value(scanner: &mut Scanner<'_>, _start_pos: crate::TextPos) -> Result<String, Error> {
    let mut out = String::new();
    loop {
        match scanner.current() {
            Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'/') | Some(b'>') | None => {
                return Ok(out);
            }
            Some(b'"') | Some(b'\'') => {
                return Err(Error::new(ErrorId::ReadingAttributes, scanner.text_pos()));
            }
            Some(_) => decode_one(scanner, &mut out),
        }
    }
}

/// Text parser and whitespace policy (spec §4.5).
///
/// Returns `None` if the node's value is empty after processing — such a
/// node is not inserted (spec §4.5 last sentence).
fn parse_text(scanner: &mut Scanner<'_>, options: &ParsingOptions) -> Option<String> {
    let mut out = String::new();
    while let Some(b) = scanner.current() {
        if b == b'<' {
            break;
        }
        decode_one(scanner, &mut out);
    }

    let text = if options.condense_whitespace { condense(&out) } else { out };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn condense(s: &str) -> String {
    let mut out = String::new();
    let mut pending_space = false;
    for c in s.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            pending_space = true;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }
    out
}

/// CDATA parser (spec §4.3, §4.5): verbatim, no entity decoding, ends at `]]>`.
fn parse_cdata(scanner: &mut Scanner<'_>, doc: &mut Document) -> Result<NodeId, Error> {
    let pos = scanner.text_pos();
    scanner.advance(9); // "<![CDATA["
    let start = scanner.pos();

    loop {
        if scanner.starts_with(b"]]>") {
            break;
        }
        if scanner.at_end() {
            return Err(Error::new(ErrorId::ParsingCdata, pos));
        }
        scanner.advance(1);
    }

    let end = scanner.pos();
    let text = scan::decode_lossy(scanner.slice(start, end), scanner.encoding());
    scanner.advance(3);

    Ok(doc.push_node(NodeKind::Text { cdata: true }, text, pos))
}

/// Comment parser (spec §4.6).
fn parse_comment(scanner: &mut Scanner<'_>, doc: &mut Document) -> Result<NodeId, Error> {
    let pos = scanner.text_pos();
    scanner.advance(4); // "<!--"
    let start = scanner.pos();

    loop {
        if scanner.starts_with(b"-->") {
            break;
        }
        if scanner.at_end() {
            return Err(Error::new(ErrorId::ParsingComment, pos));
        }
        scanner.advance(1);
    }

    let end = scanner.pos();
    let text = scan::decode_lossy(scanner.slice(start, end), scanner.encoding());
    scanner.advance(3);

    Ok(doc.push_node(NodeKind::Comment, text, pos))
}

/// Declaration parser (spec §4.7).
fn parse_declaration(scanner: &mut Scanner<'_>, doc: &mut Document, encoding: &mut Encoding) -> Result<NodeId, Error> {
    let pos = scanner.text_pos();
    scanner.advance(5); // "<?xml"

    let mut version = None;
    let mut decl_encoding = None;
    let mut standalone = None;

    loop {
        scanner.skip_whitespace();

        if scanner.starts_with(b"?>") {
            scanner.advance(2);
            break;
        }
        if scanner.at_end() {
            return Err(Error::new(ErrorId::ParsingDeclaration, pos));
        }

        let name = scanner
            .read_name()
            .ok_or_else(|| Error::new(ErrorId::ParsingDeclaration, scanner.text_pos()))?;
        scanner.skip_whitespace();
        if scanner.current() != Some(b'=') {
            return Err(Error::new(ErrorId::ParsingDeclaration, scanner.text_pos()));
        }
        scanner.advance(1);
        scanner.skip_whitespace();

        let value = read_quoted_value(scanner).ok_or_else(|| Error::new(ErrorId::ParsingDeclaration, scanner.text_pos()))?;

        match name.as_str() {
            "version" if version.is_none() => version = Some(value),
            "encoding" if decl_encoding.is_none() => decl_encoding = Some(value),
            "standalone" if standalone.is_none() => standalone = Some(value),
            _ => return Err(Error::new(ErrorId::ParsingDeclaration, pos)),
        }
    }

    if let Some(e) = &decl_encoding {
        *encoding = if e.eq_ignore_ascii_case("utf-8") || e.eq_ignore_ascii_case("utf8") {
            Encoding::Utf8
        } else {
            Encoding::Legacy
        };
        scanner.set_encoding(*encoding);
    }

    Ok(doc.push_node(
        NodeKind::Declaration { version, encoding: decl_encoding, standalone },
        String::new(),
        pos,
    ))
}

fn read_quoted_value(scanner: &mut Scanner<'_>) -> Option<String> {
    let quote = scanner.current()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    scanner.advance(1);
    let start = scanner.pos();

    while let Some(b) = scanner.current() {
        if b == quote {
            break;
        }
        scanner.advance(1);
    }

    if scanner.current() != Some(quote) {
        return None;
    }
    let end = scanner.pos();
    scanner.advance(1);

    Some(scan::decode_lossy(scanner.slice(start, end), scanner.encoding()))
}

/// Unknown-construct parser (spec §4.3): everything between `<` and the
/// next `>`, stored verbatim.
fn parse_unknown(scanner: &mut Scanner<'_>, doc: &mut Document) -> Result<NodeId, Error> {
    let pos = scanner.text_pos();
    scanner.advance(1); // '<'
    let start = scanner.pos();

    loop {
        if scanner.starts_with(b">") {
            break;
        }
        if scanner.at_end() {
            return Err(Error::new(ErrorId::ParsingUnknown, pos));
        }
        scanner.advance(1);
    }

    let end = scanner.pos();
    let text = scan::decode_lossy(scanner.slice(start, end), scanner.encoding());
    scanner.advance(1);

    Ok(doc.push_node(NodeKind::Unknown, text, pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeType;

    #[test]
    fn parses_empty_element() {
        let doc = Document::parse("<a/>").unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(root.tag_name(), Some("a"));
        assert_eq!(root.children().count(), 0);
    }

    #[test]
    fn parses_attributes_and_nested_element() {
        let doc = Document::parse("<a x=\"1\" y='2'><b>hi</b></a>").unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(root.attribute("x"), Some("1"));
        assert_eq!(root.attribute("y"), Some("2"));
        let b = root.first_element_child().unwrap();
        assert_eq!(b.tag_name(), Some("b"));
        assert_eq!(b.first_child().unwrap().text(), Some("hi"));
    }

    #[test]
    fn declaration_switches_encoding_mode() {
        let doc = Document::parse("<?xml version=\"1.0\" encoding=\"UTF-8\"?><root/>").unwrap();
        let decl = doc.root().first_child().unwrap();
        assert_eq!(decl.node_type(), NodeType::Declaration);
        assert_eq!(decl.declaration().unwrap().1, Some("UTF-8"));
        assert!(doc.root_element().is_some());
    }

    #[test]
    fn entity_and_condensed_whitespace() {
        let doc = Document::parse("<t>a &amp; b &#x3C; c</t>").unwrap();
        let t = doc.root_element().unwrap().first_child().unwrap();
        assert_eq!(t.text(), Some("a & b < c"));
    }

    #[test]
    fn mismatched_end_tag_is_an_error() {
        let err = Document::parse("<a><b></a>").unwrap_err();
        assert_eq!(err.id(), ErrorId::ReadingEndTag);
    }

    #[test]
    fn cdata_is_stored_verbatim() {
        let doc = Document::parse("<x><![CDATA[<not-parsed/>]]></x>").unwrap();
        let t = doc.root_element().unwrap().first_child().unwrap();
        assert!(t.is_cdata());
        assert_eq!(t.text(), Some("<not-parsed/>"));
    }

    #[test]
    fn duplicate_attribute_last_wins() {
        let doc = Document::parse("<a x=\"1\" x=\"2\"/>").unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(root.attribute("x"), Some("2"));
        assert_eq!(root.attributes().count(), 1);
    }

    #[test]
    fn empty_input_is_document_empty_error() {
        let err = Document::parse("").unwrap_err();
        assert_eq!(err.id(), ErrorId::DocumentEmpty);
    }

    #[test]
    fn whitespace_only_input_is_document_empty_error() {
        let err = Document::parse("   \n\t  ").unwrap_err();
        assert_eq!(err.id(), ErrorId::DocumentEmpty);
    }

    #[test]
    fn declaration_only_input_is_document_empty_error() {
        let err = Document::parse("<?xml version=\"1.0\"?>").unwrap_err();
        assert_eq!(err.id(), ErrorId::DocumentEmpty);
    }

    #[test]
    fn unterminated_tag_is_an_error() {
        let err = Document::parse("<a x=\"1\"").unwrap_err();
        assert_eq!(err.id(), ErrorId::EmbeddedNull);
    }

    #[test]
    fn declaration_after_root_element_is_document_top_only() {
        let err = Document::parse("<a/><?xml version=\"1.0\"?>").unwrap_err();
        assert_eq!(err.id(), ErrorId::DocumentTopOnly);
    }

    #[test]
    fn second_root_element_is_rejected() {
        let err = Document::parse("<a/><b/>").unwrap_err();
        assert_eq!(err.id(), ErrorId::Generic);
    }

    #[test]
    fn stray_end_tag_at_document_level_is_an_error() {
        let err = Document::parse("</a>").unwrap_err();
        assert_eq!(err.id(), ErrorId::ReadingEndTag);
    }

    #[test]
    fn trailing_end_tag_after_root_element_is_an_error() {
        let err = Document::parse("<a/></a>").unwrap_err();
        assert_eq!(err.id(), ErrorId::ReadingEndTag);
    }
}
