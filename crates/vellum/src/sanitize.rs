pub mod color;
pub mod policy;
mod serialize;
mod tree;
pub mod url;

use anyhow::{Context, Result};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::RcDom;
use ::url::Url;

use crate::config::{Config, DEFAULT_IMAGE_ALT, DEFAULT_SITE_ORIGIN};
use crate::content::normalize_editorial_html;

/// Minimum output: sanitized content is never empty.
pub const FLOOR_HTML: &str = "<p></p>";

/// Upper bound on rebuild passes while settling.
const MAX_PASSES: usize = 4;

/// Allowlist sanitizer for editorial HTML.
///
/// Immutable once built; every call parses into a fresh tree, so one instance
/// can serve any number of callers.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    origin: Url,
    default_image_alt: String,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_SITE_ORIGIN).expect("default site origin is a valid URL"))
    }
}

impl Sanitizer {
    /// Creates a sanitizer resolving relative URLs against `origin`.
    #[must_use]
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            default_image_alt: String::from(DEFAULT_IMAGE_ALT),
        }
    }

    /// Sets the `alt` text given to images that carry none.
    #[must_use]
    pub fn with_default_image_alt(mut self, alt: impl Into<String>) -> Self {
        self.default_image_alt = alt.into();
        self
    }

    /// Builds a sanitizer from site configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `site_origin` is not an absolute URL.
    pub fn from_config(config: &Config) -> Result<Self> {
        let origin = Url::parse(&config.site_origin)
            .with_context(|| format!("invalid site_origin `{}`", config.site_origin))?;
        Ok(Self::new(origin).with_default_image_alt(&config.default_image_alt))
    }

    #[must_use]
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Sanitizes an HTML fragment.
    ///
    /// The rebuild pass is repeated over its own output until the result stops
    /// changing. Unwrapping can leave nesting the parser restructures on the
    /// next read (a `<p>` directly inside a `<p>`, say); settling makes
    /// `sanitize(sanitize(x)) == sanitize(x)`.
    #[must_use]
    pub fn sanitize(&self, html: &str) -> String {
        let mut current = self.sanitize_once(html);
        for _ in 1..MAX_PASSES {
            let next = self.sanitize_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Normalizes raw content, then sanitizes it.
    #[must_use]
    pub fn render(&self, raw: &str) -> String {
        self.sanitize(&normalize_editorial_html(raw))
    }

    fn sanitize_once(&self, html: &str) -> String {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let dom = parse_document(RcDom::default(), opts).one(html);
        let fragment = tree::rebuild(&dom.document, self);
        let html = serialize::serialize(&fragment);

        let trimmed = html.trim();
        if trimmed.is_empty() {
            String::from(FLOOR_HTML)
        } else {
            trimmed.to_owned()
        }
    }
}

/// Sanitizes `html` with the default site origin.
#[must_use]
pub fn sanitize_editorial_html(html: &str) -> String {
    Sanitizer::default().sanitize(html)
}

/// Normalizes and sanitizes `raw` with the default site origin.
#[must_use]
pub fn render_editorial_html(raw: &str) -> String {
    Sanitizer::default().render(raw)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn sanitize(html: &str) -> String {
        sanitize_editorial_html(html)
    }

    // -- dangerous content --

    #[test]
    fn script_removed_with_content() {
        let html = sanitize("<p>a</p><script>alert(1)</script><p>b</p>");
        assert_eq!(html, "<p>a</p><p>b</p>");
    }

    #[test]
    fn every_dangerous_tag_removed() {
        for tag in policy::DANGEROUS_TAGS {
            let html = sanitize(&format!(r#"<p>keep</p><{tag} title="gone">"#));
            assert_eq!(html, "<p>keep</p>", "{tag} leaked");
        }
    }

    #[test]
    fn dangerous_nested_in_unwrapped_removed() {
        let html = sanitize("<div><span>x</span><div><iframe src=\"//evil\"></iframe></div></div>");
        assert_eq!(html, "<span>x</span>");
    }

    #[test]
    fn script_inside_svg_removed() {
        let html = sanitize("<svg><script>alert(1)</script><text>t</text></svg>");
        assert_eq!(html, "t");
    }

    #[test]
    fn comments_removed() {
        assert_eq!(sanitize("<p>a<!-- secret -->b</p>"), "<p>ab</p>");
    }

    // -- unwrapping --

    #[test]
    fn div_unwrapped() {
        assert_eq!(sanitize("<div><p>kept</p></div>"), "<p>kept</p>");
    }

    #[test]
    fn unwrapped_children_are_sanitized() {
        let html = sanitize(r#"<article><p onclick="x()">t</p><font><img src="javascript:x"></font></article>"#);
        assert_eq!(html, "<p>t</p>");
    }

    #[test]
    fn head_content_unwrapped_not_lost() {
        assert_eq!(sanitize("<title>Hola</title><p>x</p>"), "Hola<p>x</p>");
    }

    #[test]
    fn noscript_content_parsed_as_markup() {
        assert_eq!(sanitize("<noscript><p>x</p></noscript>"), "<p>x</p>");
    }

    #[test]
    fn h1_renamed_to_h2() {
        let html = sanitize(r#"<h1 class="hero">Title</h1>"#);
        assert_eq!(html, r#"<h2 class="hero">Title</h2>"#);
    }

    // -- attributes --

    #[test]
    fn event_handlers_removed() {
        assert_eq!(sanitize(r#"<p onclick="x()">t</p>"#), "<p>t</p>");
    }

    #[test]
    fn style_and_unknown_attributes_removed() {
        assert_eq!(
            sanitize(r#"<p style="color:red" id="x" data-x="1" class="lead">t</p>"#),
            r#"<p class="lead">t</p>"#
        );
    }

    #[test]
    fn invalid_class_removed() {
        assert_eq!(sanitize(r#"<p class="a&quot;b">t</p>"#), "<p>t</p>");
        assert_eq!(
            sanitize(r#"<p class="md:grid col_2 x-y">t</p>"#),
            r#"<p class="md:grid col_2 x-y">t</p>"#
        );
    }

    // -- links --

    #[test]
    fn javascript_link_degrades_to_text() {
        assert_eq!(
            sanitize(r#"<a href="javascript:alert(1)" target="_blank" rel="opener">x</a>"#),
            "<a>x</a>"
        );
    }

    #[test]
    fn entity_obfuscated_javascript_link_blocked() {
        assert_eq!(
            sanitize(r#"<a href="jav&#x09;ascript:alert(1)">x</a>"#),
            "<a>x</a>"
        );
    }

    #[test]
    fn external_link_forced_new_tab() {
        assert_eq!(
            sanitize(r#"<a href="https://example.com">x</a>"#),
            r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer">x</a>"#
        );
    }

    #[test]
    fn external_link_rel_overridden() {
        assert_eq!(
            sanitize(r#"<a href="https://example.com" target="_self" rel="opener">x</a>"#),
            r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer">x</a>"#
        );
    }

    #[test]
    fn internal_link_has_no_target() {
        assert_eq!(
            sanitize(r#"<a href="/articulos/foo" target="_blank" rel="noopener">x</a>"#),
            r#"<a href="/articulos/foo">x</a>"#
        );
    }

    #[test]
    fn link_title_kept() {
        assert_eq!(
            sanitize(r##"<a title="Notas" href="#notas">x</a>"##),
            r##"<a href="#notas" title="Notas">x</a>"##
        );
    }

    #[test]
    fn blob_link_new_tab_only_when_requested() {
        assert_eq!(
            sanitize(r#"<a href="blob:http://localhost/1">x</a>"#),
            r#"<a href="blob:http://localhost/1">x</a>"#
        );
        assert_eq!(
            sanitize(r#"<a href="blob:http://localhost/1" target="_blank">x</a>"#),
            r#"<a href="blob:http://localhost/1" target="_blank" rel="noopener noreferrer">x</a>"#
        );
    }

    #[test]
    fn link_origin_follows_configuration() {
        let sanitizer = Sanitizer::new(Url::parse("https://revista.example").unwrap());
        assert_eq!(
            sanitizer.sanitize(r#"<a href="https://revista.example/a">x</a>"#),
            r#"<a href="https://revista.example/a">x</a>"#
        );
    }

    // -- images --

    #[test]
    fn data_image_kept_with_defaults() {
        assert_eq!(
            sanitize(r#"<img src="data:image/webp;base64,AAAA">"#),
            r#"<img src="data:image/webp;base64,AAAA" alt="Imagen" loading="lazy" decoding="async">"#
        );
    }

    #[test]
    fn image_without_usable_src_removed() {
        assert_eq!(sanitize(r#"<p>a<img src="javascript:x">b</p>"#), "<p>ab</p>");
        assert_eq!(sanitize(r#"<p>a<img alt="x">b</p>"#), "<p>ab</p>");
        assert_eq!(sanitize(r#"<img src="data:text/html,x">"#), FLOOR_HTML);
    }

    #[test]
    fn image_dimensions_validated_not_clamped() {
        assert_eq!(
            sanitize(r#"<img src="/a.png" alt="" width="800" height="5000" onerror="x()">"#),
            r#"<img src="/a.png" alt="" width="800" loading="lazy" decoding="async">"#
        );
        assert_eq!(
            sanitize(r#"<img src="/a.png" alt="a" width="0" height="12px">"#),
            r#"<img src="/a.png" alt="a" loading="lazy" decoding="async">"#
        );
    }

    #[test]
    fn image_loading_and_decoding_forced() {
        assert_eq!(
            sanitize(r#"<img src="/a.png" alt="a" loading="eager" decoding="sync" data-display="wide" class="full">"#),
            r#"<img class="full" src="/a.png" alt="a" loading="lazy" decoding="async" data-display="wide">"#
        );
    }

    #[test]
    fn image_default_alt_configurable() {
        let sanitizer = Sanitizer::default().with_default_image_alt("Image");
        assert_eq!(
            sanitizer.sanitize(r#"<img src="/a.png">"#),
            r#"<img src="/a.png" alt="Image" loading="lazy" decoding="async">"#
        );
    }

    // -- tables --

    #[test]
    fn table_spans_validated() {
        let html = sanitize(r#"<table><tr><td colspan="999" rowspan="3">a</td><th colspan="3">b</th></tr></table>"#);
        assert_eq!(
            html,
            r#"<table><tbody><tr><td rowspan="3">a</td><th colspan="3">b</th></tr></tbody></table>"#
        );
    }

    // -- spans and callouts --

    #[test]
    fn editorial_color_synthesizes_style() {
        assert_eq!(
            sanitize(r##"<span data-editorial-color="#1d4ed8" style="font-size:99px">x</span>"##),
            r##"<span data-editorial-color="#1d4ed8" style="color: #1d4ed8;">x</span>"##
        );
    }

    #[test]
    fn invalid_editorial_color_dropped() {
        assert_eq!(
            sanitize(r#"<span data-editorial-color="red;}body{display:none">x</span>"#),
            "<span>x</span>"
        );
    }

    #[test]
    fn callout_kind_coerced() {
        assert_eq!(
            sanitize(r#"<section data-editorial-callout="warning">x</section>"#),
            r#"<section data-editorial-callout="warning">x</section>"#
        );
        assert_eq!(
            sanitize(r#"<section data-editorial-callout="danger">x</section>"#),
            r#"<section data-editorial-callout="summary">x</section>"#
        );
        assert_eq!(sanitize("<section>x</section>"), "<section>x</section>");
    }

    // -- floor and whitespace --

    #[test]
    fn empty_output_floors() {
        assert_eq!(sanitize(""), FLOOR_HTML);
        assert_eq!(sanitize("   "), FLOOR_HTML);
        assert_eq!(sanitize("<script>x</script>"), FLOOR_HTML);
        assert_eq!(sanitize("<!-- only a comment -->"), FLOOR_HTML);
    }

    #[test]
    fn output_trimmed() {
        assert_eq!(sanitize("\n  <p>a</p>\n  "), "<p>a</p>");
    }

    #[test]
    fn pre_leading_newline_preserved() {
        let html = sanitize("<pre>\n\nfn main() {}</pre>");
        assert_eq!(html, "<pre>\n\nfn main() {}</pre>");
        assert_eq!(sanitize(&html), html);
    }

    // -- idempotence --

    #[test]
    fn sanitize_is_idempotent() {
        let corpus = [
            "",
            "plain text & <stuff>",
            "<p>a<p>b",
            "<div><p>kept</p></div>",
            "<h1>Title</h1><h2><x-a><h2>nested</h2></x-a></h2>",
            "<p><marquee><p>inside</p></marquee></p>",
            "<ul><li><article><li>x</li></article></li></ul>",
            "<table><x-y><tr><td>1</td></tr></x-y>text</table>",
            "<svg><td>x</td><a href=\"/y\">y</a></svg>",
            "<math><mi>x</mi><style>s</style></math>",
            "<a href=\"https://e.com\"><div><a href=\"/b\">b</a></div></a>",
            "<pre>\n\n\ncode</pre>",
            "<table><caption>c</caption><td colspan=2>x</td></table>",
            "<img src=\"/a.png\" width=\"10\"><p>&nbsp;&amp;&lt;</p>",
            "<span data-editorial-color=\"rgb(1, 2, 3)\">c</span>",
            "<template><p>hidden</p></template><p>shown</p>",
            "<p>unclosed <b>bold <i>both</p> after",
            "<select><option>o</option></select><button>b</button>",
            "<frameset><frame src=x></frameset>",
            "</p></br><p>",
        ];
        for input in corpus {
            let once = sanitize(input);
            let twice = sanitize(&once);
            assert_eq!(once, twice, "not idempotent for input:\n{input}");
        }
    }

    #[test]
    fn document_round_trip() {
        let input = indoc! {r#"
            <h1>Guía</h1>
            <p>Texto con <a href="https://example.com">enlace</a>.</p>
            <section data-editorial-callout="summary" class="callout">
              <ul><li>Uno</li><li>Dos</li></ul>
            </section>
            <script>track()</script>
        "#};
        let html = sanitize(input);
        assert!(html.starts_with("<h2>Guía</h2>"), "html:\n{html}");
        assert!(!html.contains("<h1"), "html:\n{html}");
        assert!(!html.contains("<script"), "html:\n{html}");
        assert!(
            html.contains(r#"<section class="callout" data-editorial-callout="summary">"#),
            "html:\n{html}"
        );
        assert_eq!(sanitize(&html), html);
    }

    // -- pipeline --

    #[test]
    fn render_plain_text() {
        assert_eq!(
            render_editorial_html("Line one\n\nLine two"),
            "<p>Line one</p><p>Line two</p>"
        );
    }

    #[test]
    fn render_plain_text_line_breaks() {
        assert_eq!(render_editorial_html("a\nb"), "<p>a<br>b</p>");
    }

    #[test]
    fn render_escaped_html_still_sanitized() {
        assert_eq!(
            render_editorial_html("&lt;p&gt;ok&lt;/p&gt;&lt;script&gt;alert(1)&lt;/script&gt;"),
            "<p>ok</p>"
        );
    }

    #[test]
    fn render_empty_floors() {
        assert_eq!(render_editorial_html(""), FLOOR_HTML);
        assert_eq!(render_editorial_html("   "), FLOOR_HTML);
    }

    // -- configuration --

    #[test]
    fn from_config_rejects_relative_origin() {
        let config = Config {
            site_origin: String::from("not a url"),
            ..Config::default()
        };
        assert!(Sanitizer::from_config(&config).is_err());
    }

    #[test]
    fn from_config_uses_values() {
        let config = Config {
            site_origin: String::from("https://revista.example"),
            default_image_alt: String::from("Foto"),
        };
        let sanitizer = Sanitizer::from_config(&config).unwrap();
        assert_eq!(sanitizer.origin().as_str(), "https://revista.example/");
        assert_eq!(
            sanitizer.sanitize(r#"<img src="/a.png">"#),
            r#"<img src="/a.png" alt="Foto" loading="lazy" decoding="async">"#
        );
    }
}
