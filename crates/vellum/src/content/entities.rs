use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::format::has_escaped_html_tag;

/// Closing tag that would end the RCDATA context early.
const TEXTAREA_END: &str = "</textarea";

/// Decodes one level of HTML entities, but only when `value` looks like
/// entity-escaped markup.
///
/// Decoding goes through a throwaway parser instance: the value is placed in
/// the RCDATA context of a `<textarea>`, where the parser resolves character
/// references but keeps tags literal, and the decoded text is read back. The
/// output is never inspected for a second level of escaping.
#[must_use]
pub fn decode_html_entities(value: &str) -> String {
    if !has_escaped_html_tag(value) {
        return value.to_owned();
    }

    // A literal `</textarea` would close the context, so decode the pieces
    // between occurrences separately. References never span the delimiter.
    let mut decoded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = find_ignore_ascii_case(rest, TEXTAREA_END) {
        decoded.push_str(&decode_rcdata(&rest[..pos]));
        decoded.push_str(&rest[pos..pos + TEXTAREA_END.len()]);
        rest = &rest[pos + TEXTAREA_END.len()..];
    }
    decoded.push_str(&decode_rcdata(rest));
    decoded
}

fn decode_rcdata(chunk: &str) -> String {
    if chunk.is_empty() {
        return String::new();
    }

    // The parser drops the first newline after `<textarea>`; feed it one so
    // a leading newline in `chunk` survives.
    let source = format!("<textarea>\n{chunk}");
    let dom = parse_document(RcDom::default(), Default::default()).one(source);

    let mut text = String::new();
    if let Some(textarea) = find_textarea(&dom.document) {
        for child in textarea.children.borrow().iter() {
            if let NodeData::Text { contents } = &child.data {
                text.push_str(&contents.borrow());
            }
        }
    }
    text
}

fn find_textarea(node: &Handle) -> Option<Handle> {
    if matches!(&node.data, NodeData::Element { name, .. } if &*name.local == "textarea") {
        return Some(node.clone());
    }
    node.children.borrow().iter().find_map(find_textarea)
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
