//! Tag and attribute allowlists for editorial content.

/// Elements removed together with everything inside them.
pub const DANGEROUS_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "form", "input", "textarea", "select",
    "button", "meta", "link",
];

/// Elements kept in sanitized output. Anything else is unwrapped.
pub const ALLOWED_TAGS: &[&str] = &[
    "p",
    "br",
    "hr",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "strong",
    "b",
    "em",
    "i",
    "u",
    "s",
    "mark",
    "small",
    "sub",
    "sup",
    "blockquote",
    "code",
    "pre",
    "ul",
    "ol",
    "li",
    "a",
    "img",
    "figure",
    "figcaption",
    "span",
    "section",
    "table",
    "caption",
    "thead",
    "tbody",
    "tfoot",
    "tr",
    "th",
    "td",
];

/// Elements serialized without an end tag.
pub const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// Attributes accepted on every allowed element.
pub const GLOBAL_ATTRIBUTES: &[&str] = &["class"];

/// Value forced onto `rel` for links that open a new browsing context.
pub const EXTERNAL_LINK_REL: &str = "noopener noreferrer";

/// Upper bound for `img` `width` / `height`.
pub const MAX_IMAGE_DIMENSION: u32 = 4000;

/// Upper bound for `th` / `td` `colspan` / `rowspan`.
pub const MAX_TABLE_SPAN: u32 = 12;

/// Accepted values of `section[data-editorial-callout]`; the first is the fallback.
pub const CALLOUT_KINDS: &[&str] = &["summary", "warning"];

/// Returns the attributes `tag` accepts beyond [`GLOBAL_ATTRIBUTES`], in
/// output order.
#[must_use]
pub fn tag_attributes(tag: &str) -> &'static [&'static str] {
    match tag {
        "a" => &["href", "title", "target", "rel"],
        "img" => &[
            "src",
            "alt",
            "title",
            "width",
            "height",
            "loading",
            "decoding",
            "data-display",
        ],
        "span" => &["data-editorial-color"],
        "section" => &["data-editorial-callout"],
        "th" | "td" => &["colspan", "rowspan"],
        _ => &[],
    }
}

#[must_use]
pub fn is_dangerous_tag(tag: &str) -> bool {
    DANGEROUS_TAGS.contains(&tag)
}

#[must_use]
pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

#[must_use]
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Returns `true` if `name` may appear on `tag`.
///
/// Event handlers (`on*`) and `style` are refused unconditionally.
#[must_use]
pub fn is_allowed_attribute(tag: &str, name: &str) -> bool {
    if name.starts_with("on") || name == "style" {
        return false;
    }
    GLOBAL_ATTRIBUTES.contains(&name) || tag_attributes(tag).contains(&name)
}
