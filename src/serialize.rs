//! Serializer / encoder (spec §4.9).
//!
//! Walks the tree with the same parent/first-child/next-sibling traversal
//! the teacher crate's `Children`/`Traverse` iterators expose, escaping
//! reserved characters the way TinyXML's `EncodeString` does.

use std::io::{self, Write};

use crate::{Document, Node, NodeType};

pub(crate) fn to_string(doc: &Document) -> String {
    let mut out = String::new();
    let tab_size = doc.tab_size();
    for child in doc.root().children() {
        write_node(child, 0, tab_size, &mut out);
    }
    out
}

pub(crate) fn write_to(doc: &Document, w: &mut dyn Write) -> io::Result<()> {
    w.write_all(to_string(doc).as_bytes())
}

fn indent(out: &mut String, depth: usize, tab_size: u32) {
    for _ in 0..(depth as u32 * tab_size) {
        out.push(' ');
    }
}

fn write_node(node: Node, depth: usize, tab_size: u32, out: &mut String) {
    match node.node_type() {
        NodeType::Element => write_element(node, depth, tab_size, out),
        NodeType::Text => write_text(node, depth, tab_size, out),
        NodeType::Comment => {
            let content = format!("<!--{}-->", node.comment().unwrap_or(""));
            write_verbatim(out, depth, tab_size, &content);
        }
        NodeType::Declaration => write_declaration(node, depth, tab_size, out),
        NodeType::Unknown => {
            let content = format!("<{}>", node.unknown_contents().unwrap_or(""));
            write_verbatim(out, depth, tab_size, &content);
        }
        NodeType::Document => {}
    }
}

fn write_element(node: Node, depth: usize, tab_size: u32, out: &mut String) {
    indent(out, depth, tab_size);
    out.push('<');
    out.push_str(node.tag_name().unwrap_or(""));

    let mut has_attrs = false;
    for attr in node.attributes() {
        has_attrs = true;
        out.push(' ');
        out.push_str(attr.name());
        out.push('=');
        write_attribute_value(out, attr.value());
    }

    let children: Vec<Node> = node.children().collect();
    if children.is_empty() {
        out.push_str("/>\n");
        return;
    }

    // Inline iff exactly one Text child and no attributes (spec §9 Design
    // Notes, Open Question resolved).
    if children.len() == 1 && children[0].is_text() && !has_attrs {
        out.push('>');
        write_text_inline(out, children[0]);
        out.push_str("</");
        out.push_str(node.tag_name().unwrap_or(""));
        out.push_str(">\n");
        return;
    }

    out.push_str(">\n");
    for child in &children {
        write_node(*child, depth + 1, tab_size, out);
    }
    indent(out, depth, tab_size);
    out.push_str("</");
    out.push_str(node.tag_name().unwrap_or(""));
    out.push_str(">\n");
}

fn write_attribute_value(out: &mut String, value: &str) {
    let quote = if value.contains('"') { '\'' } else { '"' };
    out.push(quote);
    out.push_str(&encode_for_output(value));
    out.push(quote);
}

fn write_text_inline(out: &mut String, node: Node) {
    if node.is_cdata() {
        out.push_str("<![CDATA[");
        out.push_str(node.text().unwrap_or(""));
        out.push_str("]]>");
    } else {
        out.push_str(&encode_for_output(node.text().unwrap_or("")));
    }
}

fn write_text(node: Node, depth: usize, tab_size: u32, out: &mut String) {
    indent(out, depth, tab_size);
    write_text_inline(out, node);
    out.push('\n');
}

fn write_declaration(node: Node, depth: usize, tab_size: u32, out: &mut String) {
    indent(out, depth, tab_size);
    let (version, encoding, standalone) = node.declaration().unwrap_or((None, None, None));
    out.push_str("<?xml");
    if let Some(v) = version {
        out.push_str(" version=\"");
        out.push_str(v);
        out.push('"');
    }
    if let Some(e) = encoding {
        out.push_str(" encoding=\"");
        out.push_str(e);
        out.push('"');
    }
    if let Some(s) = standalone {
        out.push_str(" standalone=\"");
        out.push_str(s);
        out.push('"');
    }
    out.push_str("?>\n");
}

fn write_verbatim(out: &mut String, depth: usize, tab_size: u32, content: &str) {
    indent(out, depth, tab_size);
    out.push_str(content);
    out.push('\n');
}

/// Escapes reserved characters for output (spec §4.9, `EncodeString`).
///
/// A pre-existing `&#x…;`/`&#X…;` sequence already in the string is passed
/// through unescaped rather than having its leading `&` re-escaped.
pub(crate) fn encode_for_output(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == '&' && (s[i..].starts_with("&#x") || s[i..].starts_with("&#X")) {
            if let Some(rel_semi) = s[i..].find(';') {
                let end = i + rel_semi + 1;
                out.push_str(&s[i..end]);
                while let Some(&(j, _)) = chars.peek() {
                    if j < end {
                        chars.next();
                    } else {
                        break;
                    }
                }
                continue;
            }
        }

        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if (c as u32) < 0x20 => out.push_str(&format!("&#x{:02X};", c as u32)),
            c => out.push(c),
        }
    }

    out
}
