use super::policy::is_void_tag;
use super::tree::{Fragment, Node, NodeId};

enum Step {
    Open(NodeId),
    Close(&'static str),
}

/// Serializes `fragment` to HTML.
///
/// Mirrors the HTML serialization algorithm for the subset the sanitizer can
/// emit, so that re-parsing the output reproduces the same tree.
pub(crate) fn serialize(fragment: &Fragment) -> String {
    let mut html = String::new();
    let mut steps: Vec<Step> = fragment.roots.iter().rev().map(|&id| Step::Open(id)).collect();

    while let Some(step) = steps.pop() {
        let id = match step {
            Step::Close(tag) => {
                html.push_str("</");
                html.push_str(tag);
                html.push('>');
                continue;
            }
            Step::Open(id) => id,
        };

        match &fragment.nodes[id] {
            Node::Text(text) => push_escaped_text(&mut html, text),
            Node::Element {
                tag,
                attrs,
                children,
            } => {
                html.push('<');
                html.push_str(tag);
                for (name, value) in attrs {
                    html.push(' ');
                    html.push_str(name);
                    html.push_str("=\"");
                    push_escaped_attribute(&mut html, value);
                    html.push('"');
                }
                html.push('>');

                if is_void_tag(tag) {
                    continue;
                }

                // The parser drops one newline right after `<pre>`.
                if *tag == "pre" && starts_with_newline(fragment, children) {
                    html.push('\n');
                }

                steps.push(Step::Close(*tag));
                steps.extend(children.iter().rev().map(|&child| Step::Open(child)));
            }
        }
    }

    html
}

fn starts_with_newline(fragment: &Fragment, children: &[NodeId]) -> bool {
    children
        .first()
        .is_some_and(|&first| matches!(&fragment.nodes[first], Node::Text(text) if text.starts_with('\n')))
}

fn push_escaped_text(html: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '\u{a0}' => html.push_str("&nbsp;"),
            _ => html.push(ch),
        }
    }
}

fn push_escaped_attribute(html: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => html.push_str("&amp;"),
            '"' => html.push_str("&quot;"),
            '\u{a0}' => html.push_str("&nbsp;"),
            _ => html.push(ch),
        }
    }
}
