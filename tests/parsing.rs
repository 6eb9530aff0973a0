use pretty_assertions::assert_eq;

use minixml::{Document, Encoding, ErrorId, ParsingOptions};

#[test]
fn scenario_empty_element() {
    let doc = Document::parse("<a/>").unwrap();
    let root = doc.root_element().unwrap();
    assert_eq!(root.tag_name(), Some("a"));
    assert_eq!(root.children().count(), 0);
    assert_eq!(root.attributes().count(), 0);
}

#[test]
fn scenario_attributes_and_nested_element() {
    let doc = Document::parse("<a x=\"1\" y='2'><b>hi</b></a>").unwrap();
    let root = doc.root_element().unwrap();

    let names_values: Vec<(&str, &str)> = root.attributes().map(|a| (a.name(), a.value())).collect();
    assert_eq!(names_values, vec![("x", "1"), ("y", "2")]);

    let b = root.first_element_child().unwrap();
    assert_eq!(b.tag_name(), Some("b"));
    assert_eq!(b.first_child().unwrap().text(), Some("hi"));
}

#[test]
fn scenario_declaration_switches_to_utf8() {
    let doc = Document::parse("<?xml version=\"1.0\" encoding=\"UTF-8\"?><root/>").unwrap();
    let (version, encoding, _) = doc.root().first_child().unwrap().declaration().unwrap();
    assert_eq!(version, Some("1.0"));
    assert_eq!(encoding, Some("UTF-8"));
    assert!(doc.root_element().is_some());
}

#[test]
fn scenario_entities_decode_with_condensed_whitespace() {
    let doc = Document::parse("<t>a &amp; b &#x3C; c</t>").unwrap();
    let text = doc.root_element().unwrap().first_child().unwrap();
    assert_eq!(text.text(), Some("a & b < c"));
}

#[test]
fn scenario_mismatched_end_tag() {
    let err = Document::parse("<a><b></a>").unwrap_err();
    assert_eq!(err.id(), ErrorId::ReadingEndTag);
}

#[test]
fn scenario_cdata_not_parsed_inside() {
    let doc = Document::parse("<x><![CDATA[<not-parsed/>]]></x>").unwrap();
    let text = doc.root_element().unwrap().first_child().unwrap();
    assert!(text.is_cdata());
    assert_eq!(text.text(), Some("<not-parsed/>"));
}

#[test]
fn boundary_empty_input() {
    assert_eq!(Document::parse("").unwrap_err().id(), ErrorId::DocumentEmpty);
}

#[test]
fn boundary_whitespace_only_input() {
    assert_eq!(Document::parse("   \n \t ").unwrap_err().id(), ErrorId::DocumentEmpty);
}

#[test]
fn boundary_declaration_only_input() {
    assert_eq!(
        Document::parse("<?xml version=\"1.0\"?>").unwrap_err().id(),
        ErrorId::DocumentEmpty
    );
}

#[test]
fn boundary_zero_one_many_attributes() {
    assert_eq!(Document::parse("<a/>").unwrap().root_element().unwrap().attributes().count(), 0);
    assert_eq!(Document::parse("<a x=\"1\"/>").unwrap().root_element().unwrap().attributes().count(), 1);
    assert_eq!(
        Document::parse("<a x=\"1\" y=\"2\" z=\"3\"/>").unwrap().root_element().unwrap().attributes().count(),
        3
    );
}

#[test]
fn boundary_duplicate_attribute_names_last_wins() {
    let doc = Document::parse("<a x=\"1\" x=\"2\" x=\"3\"/>").unwrap();
    let root = doc.root_element().unwrap();
    assert_eq!(root.attributes().count(), 1);
    assert_eq!(root.attribute("x"), Some("3"));
}

#[test]
fn boundary_cdata_containing_brackets_but_not_terminator() {
    let doc = Document::parse("<a><![CDATA[a] b]] c]]></a>").unwrap();
    let text = doc.root_element().unwrap().first_child().unwrap();
    assert_eq!(text.text(), Some("a] b]] c"));
}

#[test]
fn boundary_numeric_entities_across_the_utf8_length_boundaries() {
    let cases = [
        (1u32, "\u{1}"),
        (0x7F, "\u{7F}"),
        (0x80, "\u{80}"),
        (0x7FF, "\u{7FF}"),
        (0x800, "\u{800}"),
        (0xFFFD, "\u{FFFD}"),
        (0x10000, "\u{10000}"),
    ];
    for (code, expected) in cases {
        let xml = format!("<a>&#x{:X};</a>", code);
        let doc = Document::parse(&xml).unwrap();
        let text = doc.root_element().unwrap().first_child().unwrap();
        assert_eq!(text.text(), Some(expected), "code point U+{:04X}", code);
    }
}

#[test]
fn boundary_input_ending_mid_tag() {
    let err = Document::parse("<a x=\"1\"").unwrap_err();
    assert_eq!(err.id(), ErrorId::EmbeddedNull);
}

#[test]
fn bom_is_recorded_and_consumed() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"<a/>");
    let doc = Document::parse_bytes(&bytes, ParsingOptions::default()).unwrap();
    assert!(doc.has_bom());
    assert_eq!(doc.root_element().unwrap().tag_name(), Some("a"));
}

#[test]
fn no_bom_is_recorded_as_absent() {
    let doc = Document::parse("<a/>").unwrap();
    assert!(!doc.has_bom());
}

#[test]
fn legacy_encoding_passes_high_bytes_through() {
    let mut bytes = b"<a>".to_vec();
    bytes.push(0xE9); // not valid UTF-8 on its own
    bytes.extend_from_slice(b"</a>");

    let options = ParsingOptions { initial_encoding: Encoding::Legacy, ..ParsingOptions::default() };
    let doc = Document::parse_bytes(&bytes, options).unwrap();
    let text = doc.root_element().unwrap().first_child().unwrap();
    assert_eq!(text.text(), Some("\u{E9}"));
}

#[test]
fn verbatim_mode_keeps_internal_whitespace() {
    let options = ParsingOptions { condense_whitespace: false, ..ParsingOptions::default() };
    let doc = Document::parse_with_options("<a>one   two</a>", options).unwrap();
    let text = doc.root_element().unwrap().first_child().unwrap();
    assert_eq!(text.text(), Some("one   two"));
}

#[test]
fn cursor_position_is_monotonic_across_a_parse() {
    let doc = Document::parse("<a>\n  <b/>\n  <c/>\n</a>").unwrap();
    let root = doc.root_element().unwrap();
    let mut last = (0, 0);
    for child in root.children() {
        let pos = child.pos();
        let current = (pos.row, pos.col);
        assert!(current >= last, "{:?} should not precede {:?}", current, last);
        last = current;
    }
}
