//! Allowlist rebuild of a parsed document into an owned output tree.

use std::sync::LazyLock;

use html5ever::Attribute;
use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;
use tracing::{debug, trace};

use super::Sanitizer;
use super::color::is_valid_editorial_color;
use super::policy::{
    ALLOWED_TAGS, CALLOUT_KINDS, EXTERNAL_LINK_REL, MAX_IMAGE_DIMENSION, MAX_TABLE_SPAN,
    is_allowed_attribute, is_dangerous_tag,
};
use super::url::{UrlKind, classify_url};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

static CLASS_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9:_\-\s]+$").expect("valid regex"));

/// Index of a node in [`Fragment::nodes`].
pub(crate) type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Element {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
        children: Vec<NodeId>,
    },
    Text(String),
}

/// Sanitized output tree. Nodes live in a flat arena so neither building,
/// serializing nor dropping it recurses.
#[derive(Debug, Default)]
pub(crate) struct Fragment {
    pub nodes: Vec<Node>,
    pub roots: Vec<NodeId>,
}

impl Fragment {
    /// Appends `node` under `parent` (or at the top level) and returns its id.
    fn append(&mut self, parent: Option<NodeId>, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.children_mut(parent).push(id);
        id
    }

    /// Appends text under `parent`, merging it into a trailing text sibling.
    fn append_text(&mut self, parent: Option<NodeId>, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.children_of(parent).last() {
            if let Node::Text(existing) = &mut self.nodes[last] {
                existing.push_str(text);
                return;
            }
        }
        self.append(parent, Node::Text(text.to_owned()));
    }

    fn children_of(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            None => &self.roots,
            Some(id) => match &self.nodes[id] {
                Node::Element { children, .. } => children,
                Node::Text(_) => &[],
            },
        }
    }

    fn children_mut(&mut self, parent: Option<NodeId>) -> &mut Vec<NodeId> {
        match parent {
            None => &mut self.roots,
            Some(id) => match &mut self.nodes[id] {
                Node::Element { children, .. } => children,
                Node::Text(_) => unreachable!("text nodes are never used as parents"),
            },
        }
    }
}

/// Pending source children and the output element they are emitted into.
struct Frame {
    source: Vec<Handle>,
    next: usize,
    parent: Option<NodeId>,
}

impl Frame {
    fn new(node: &Handle, parent: Option<NodeId>) -> Self {
        Self {
            source: node.children.borrow().clone(),
            next: 0,
            parent,
        }
    }
}

/// What the walk does with a source element.
enum Disposition {
    /// Remove it with its whole subtree.
    Drop,
    /// Replace it by its children.
    Unwrap,
    /// Emit it with the given tag and filtered attributes.
    Keep {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
    },
}

/// Rebuilds the document rooted at `document` into a sanitized fragment.
///
/// The walk is depth-first and pre-order. Unwrapped elements push their
/// children onto the stack with the *same* output parent, so promoted children
/// are visited and filtered like any other node in their new position.
pub(crate) fn rebuild(document: &Handle, sanitizer: &Sanitizer) -> Fragment {
    let mut fragment = Fragment::default();
    let mut stack = vec![Frame::new(document, None)];

    while let Some(frame) = stack.last_mut() {
        let Some(node) = frame.source.get(frame.next).cloned() else {
            stack.pop();
            continue;
        };
        frame.next += 1;
        let parent = frame.parent;

        match &node.data {
            NodeData::Text { contents } => fragment.append_text(parent, &contents.borrow()),
            NodeData::Element { name, attrs, .. } => {
                let local = &*name.local;
                match sanitizer.disposition(local, &name.ns, &attrs.borrow()) {
                    Disposition::Drop => {}
                    Disposition::Unwrap => {
                        trace!(tag = local, "unwrapped element");
                        stack.push(Frame::new(&node, parent));
                    }
                    Disposition::Keep { tag, attrs } => {
                        let id = fragment.append(
                            parent,
                            Node::Element {
                                tag,
                                attrs,
                                children: Vec::new(),
                            },
                        );
                        stack.push(Frame::new(&node, Some(id)));
                    }
                }
            }
            NodeData::Document => stack.push(Frame::new(&node, parent)),
            // Comments, doctypes and processing instructions never survive.
            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => {}
        }
    }

    fragment
}

impl Sanitizer {
    fn disposition(&self, local: &str, ns: &str, attrs: &[Attribute]) -> Disposition {
        if is_dangerous_tag(local) {
            debug!(tag = local, "removed dangerous element and its subtree");
            return Disposition::Drop;
        }
        if ns != HTML_NAMESPACE {
            return Disposition::Unwrap;
        }

        // The article title owns the only h1; stray ones become h2.
        let lookup = if local == "h1" { "h2" } else { local };
        let Some(&tag) = ALLOWED_TAGS.iter().find(|&&allowed| allowed == lookup) else {
            return Disposition::Unwrap;
        };

        match self.filter_attributes(tag, attrs) {
            Some(attrs) => Disposition::Keep { tag, attrs },
            None => Disposition::Drop,
        }
    }

    /// Applies the attribute policy of `tag`.
    ///
    /// Returns `None` when the element cannot be kept at all (an image
    /// without a usable source). Output order is fixed: `class` first, then
    /// the tag's own attributes in allowlist order, synthesized ones last.
    fn filter_attributes(
        &self,
        tag: &'static str,
        source: &[Attribute],
    ) -> Option<Vec<(&'static str, String)>> {
        let attrs = SourceAttributes { tag, source };
        let mut out = Vec::new();

        if let Some(class) = attrs.get("class").filter(|value| CLASS_VALUE.is_match(value)) {
            out.push(("class", class.to_owned()));
        }

        match tag {
            "a" => self.link_attributes(&attrs, &mut out),
            "img" => self.image_attributes(&attrs, &mut out)?,
            "th" | "td" => {
                for name in ["colspan", "rowspan"] {
                    if let Some(span) = attrs.get(name).and_then(|v| parse_bounded(v, MAX_TABLE_SPAN)) {
                        out.push((name, span.to_string()));
                    }
                }
            }
            "span" => {
                let color = attrs
                    .get("data-editorial-color")
                    .map(str::trim)
                    .filter(|color| is_valid_editorial_color(color));
                if let Some(color) = color {
                    out.push(("data-editorial-color", color.to_owned()));
                    out.push(("style", format!("color: {color};")));
                }
            }
            "section" => {
                if let Some(kind) = attrs.get("data-editorial-callout") {
                    let kind = CALLOUT_KINDS
                        .iter()
                        .find(|&&known| known == kind)
                        .unwrap_or(&CALLOUT_KINDS[0]);
                    out.push(("data-editorial-callout", (*kind).to_owned()));
                }
            }
            _ => {}
        }

        Some(out)
    }

    /// Internal links lose `target`/`rel`; external ones, and other accepted
    /// links the author asked to open in a new tab, get both forced.
    fn link_attributes(&self, attrs: &SourceAttributes<'_>, out: &mut Vec<(&'static str, String)>) {
        let href = attrs.get("href").and_then(|raw| {
            let classified = classify_url(raw, &self.origin, false);
            if classified.is_blocked() {
                debug!("removed blocked link target");
                None
            } else {
                Some(classified)
            }
        });

        if let Some(href) = href {
            out.push(("href", href.value.to_owned()));
        }
        if let Some(title) = attrs.get("title") {
            out.push(("title", title.to_owned()));
        }

        let requested_new_tab = attrs
            .get("target")
            .is_some_and(|target| target.trim().eq_ignore_ascii_case("_blank"));
        let new_tab = href.is_some_and(|href| match href.kind {
            UrlKind::External => true,
            UrlKind::Internal | UrlKind::Blocked => false,
            UrlKind::DataImage | UrlKind::Blob => requested_new_tab,
        });
        if new_tab {
            out.push(("target", String::from("_blank")));
            out.push(("rel", String::from(EXTERNAL_LINK_REL)));
        }
    }

    fn image_attributes(
        &self,
        attrs: &SourceAttributes<'_>,
        out: &mut Vec<(&'static str, String)>,
    ) -> Option<()> {
        let src = classify_url(attrs.get("src").unwrap_or_default(), &self.origin, true);
        if src.is_blocked() {
            debug!("removed image without a usable source");
            return None;
        }

        out.push(("src", src.value.to_owned()));
        let alt = attrs
            .get("alt")
            .map_or_else(|| self.default_image_alt.clone(), str::to_owned);
        out.push(("alt", alt));
        if let Some(title) = attrs.get("title") {
            out.push(("title", title.to_owned()));
        }
        for name in ["width", "height"] {
            if let Some(size) = attrs.get(name).and_then(|v| parse_bounded(v, MAX_IMAGE_DIMENSION)) {
                out.push((name, size.to_string()));
            }
        }
        out.push(("loading", String::from("lazy")));
        out.push(("decoding", String::from("async")));
        if let Some(display) = attrs.get("data-display") {
            out.push(("data-display", display.to_owned()));
        }
        Some(())
    }
}

/// Source attributes of one element, filtered through its allowlist on read.
struct SourceAttributes<'s> {
    tag: &'static str,
    source: &'s [Attribute],
}

impl<'s> SourceAttributes<'s> {
    /// Returns the value of `name` if the element carries it and the policy
    /// allows it. Namespaced attributes (`xlink:href`, ...) never match.
    fn get(&self, name: &str) -> Option<&'s str> {
        if !is_allowed_attribute(self.tag, name) {
            return None;
        }
        self.source
            .iter()
            .find(|attr| attr.name.ns.is_empty() && &*attr.name.local == name)
            .map(|attr| &*attr.value)
    }
}

/// Parses a positive integer no greater than `max`. Out-of-range values are
/// rejected, never clamped.
fn parse_bounded(value: &str, max: u32) -> Option<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=max).contains(n))
}
