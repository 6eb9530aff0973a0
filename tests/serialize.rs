use pretty_assertions::assert_eq;

use minixml::Document;

#[test]
fn empty_element_serializes_with_self_closing_tag() {
    let doc = Document::parse("<a/>").unwrap();
    assert_eq!(doc.to_xml_string(), "<a/>\n");
}

#[test]
fn single_text_child_with_no_attributes_is_inlined() {
    let doc = Document::parse("<a><b>hi</b></a>").unwrap();
    let out = doc.to_xml_string();
    assert_eq!(out, "<a>\n    <b>hi</b>\n</a>\n");
}

#[test]
fn element_with_attributes_is_never_inlined_even_with_one_text_child() {
    let doc = Document::parse("<a><b x=\"1\">hi</b></a>").unwrap();
    let out = doc.to_xml_string();
    assert!(out.contains("<b x=\"1\">\n"));
    assert!(out.contains("  hi\n"));
    assert!(out.contains("</b>\n"));
}

#[test]
fn nested_elements_are_indented_by_depth() {
    let doc = Document::parse("<a><b><c/></b></a>").unwrap();
    let out = doc.to_xml_string();
    assert_eq!(out, "<a>\n    <b>\n        <c/>\n    </b>\n</a>\n");
}

#[test]
fn reserved_characters_are_escaped_on_output() {
    let doc = Document::parse("<a>x</a>").unwrap();
    let id = doc.root_element().unwrap().first_child().unwrap().id();
    let mut doc = doc;
    doc.set_value(id, "<tag> & \"quote\" 'apos'");
    let out = doc.to_xml_string();
    assert!(out.contains("&lt;tag&gt; &amp; &quot;quote&quot; &apos;apos&apos;"));
}

#[test]
fn comment_and_cdata_round_trip() {
    let doc = Document::parse("<a><!-- hello --><![CDATA[<raw/>]]></a>").unwrap();
    let out = doc.to_xml_string();
    assert!(out.contains("<!-- hello -->"));
    assert!(out.contains("<![CDATA[<raw/>]]>"));

    let reparsed = Document::parse(&out).unwrap();
    let root = reparsed.root_element().unwrap();
    let mut children = root.children();
    assert_eq!(children.next().unwrap().comment(), Some(" hello "));
    let cdata = children.next().unwrap();
    assert!(cdata.is_cdata());
    assert_eq!(cdata.text(), Some("<raw/>"));
}

#[test]
fn declaration_serializes_with_present_fields_only() {
    let doc = Document::parse("<?xml version=\"1.0\"?><root/>").unwrap();
    let out = doc.to_xml_string();
    assert!(out.starts_with("<?xml version=\"1.0\"?>\n"));
    assert!(!out.contains("encoding"));
}

#[test]
fn round_trip_preserves_structure_for_a_mixed_document() {
    let input = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><a x=\"1\" y=\"2\"><b>hi</b><c/></a>";
    let first = Document::parse(input).unwrap();
    let serialized = first.to_xml_string();
    let second = Document::parse(&serialized).unwrap();

    let a1 = first.root_element().unwrap();
    let a2 = second.root_element().unwrap();
    assert_eq!(a1.tag_name(), a2.tag_name());
    assert_eq!(a1.attribute("x"), a2.attribute("x"));
    assert_eq!(a1.attribute("y"), a2.attribute("y"));

    let names1: Vec<&str> = a1.children().filter_map(|n| n.tag_name()).collect();
    let names2: Vec<&str> = a2.children().filter_map(|n| n.tag_name()).collect();
    assert_eq!(names1, names2);
}
