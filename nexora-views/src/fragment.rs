//! View fragment parsing.
//!
//! Views are fetched as complete HTML documents. The router only consumes
//! three things from them: head `<link>`/`<style>` nodes (injected as view
//! assets), the body markup with `<script>` tags stripped out (so the HTML
//! injection cannot double-execute them), and the ordered script list, which
//! the script loader replays with browser-equivalent ordering.

use once_cell::sync::Lazy;
use regex::Regex;

static HEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<head[^>]*>(.*?)</head>").expect("head pattern"));
static BODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("body pattern"));
static HEAD_ASSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<link\b[^>]*>|<style\b[^>]*>.*?</style>").expect("head asset pattern")
});
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>(.*?)</style>").expect("style pattern"));
static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script>").expect("script pattern"));
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([a-zA-Z][a-zA-Z0-9_:.-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+)))?"#)
        .expect("attribute pattern")
});

/// One attribute on a parsed tag. Bare attributes carry an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A head-level node owned by a view once injected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadAsset {
    /// `<link>` with an `href` (stylesheets, but also icons etc.).
    Link { href: String, attrs: Vec<Attribute> },
    /// Inline `<style>` block.
    Style { css: String },
}

impl HeadAsset {
    /// The stylesheet href, if this asset is a link.
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Link { href, .. } => Some(href),
            Self::Style { .. } => None,
        }
    }
}

/// A `<script>` extracted from a fragment body, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub src: Option<String>,
    pub attrs: Vec<Attribute>,
    /// Inline source text; empty for external scripts.
    pub text: String,
}

impl ScriptTag {
    /// Whether this script loads from an external source.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.src.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Whether the tag opted out of ordered execution
    /// (`async`, `defer`, or `type="module"`).
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.attrs.iter().any(|a| {
            let name = a.name.to_ascii_lowercase();
            name == "async"
                || name == "defer"
                || (name == "type" && a.value.eq_ignore_ascii_case("module"))
        })
    }

    /// Identifier used in log messages.
    #[must_use]
    pub fn label(&self) -> &str {
        self.src.as_deref().filter(|s| !s.is_empty()).unwrap_or("<inline>")
    }
}

/// The parts of a fetched view fragment the router consumes.
#[derive(Debug, Clone, Default)]
pub struct ParsedFragment {
    /// Head assets in document order.
    pub assets: Vec<HeadAsset>,
    /// Body markup with all `<script>` tags removed.
    pub body_html: String,
    /// Scripts found in the body, in document order.
    pub scripts: Vec<ScriptTag>,
}

impl ParsedFragment {
    /// Parse a fetched HTML document into its injectable parts.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let head = HEAD_RE
            .captures(html)
            .and_then(|c| c.get(1))
            .map_or("", |m| m.as_str());
        let body = BODY_RE
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or_else(|| body_fallback(html));

        let assets = parse_head_assets(head);
        let scripts = parse_scripts(body);
        let body_html = SCRIPT_RE.replace_all(body, "").trim().to_string();

        Self {
            assets,
            body_html,
            scripts,
        }
    }
}

/// Documents served as bare fragments have no `<body>` wrapper; everything
/// outside the head is the body then.
fn body_fallback(html: &str) -> &str {
    HEAD_RE
        .find(html)
        .map_or(html, |m| &html[m.end()..])
}

fn parse_head_assets(head: &str) -> Vec<HeadAsset> {
    let mut assets = Vec::new();
    for tag in HEAD_ASSET_RE.find_iter(head) {
        let text = tag.as_str();
        if starts_with_link(text) {
            let attrs = parse_attributes(attr_span(text));
            let href = attr_value(&attrs, "href");
            // Links without an href cannot be cloned meaningfully.
            if let Some(href) = href.filter(|h| !h.is_empty()) {
                assets.push(HeadAsset::Link { href, attrs });
            }
        } else if let Some(css) = STYLE_RE.captures(text).and_then(|c| c.get(1)) {
            assets.push(HeadAsset::Style {
                css: css.as_str().to_string(),
            });
        }
    }
    assets
}

fn starts_with_link(tag: &str) -> bool {
    tag.len() >= 5 && tag[..5].eq_ignore_ascii_case("<link")
}

fn parse_scripts(body: &str) -> Vec<ScriptTag> {
    SCRIPT_RE
        .captures_iter(body)
        .map(|caps| {
            let attrs = parse_attributes(caps.get(1).map_or("", |m| m.as_str()));
            let src = attr_value(&attrs, "src").filter(|s| !s.is_empty());
            let text = caps.get(2).map_or("", |m| m.as_str()).to_string();
            ScriptTag { src, attrs, text }
        })
        .collect()
}

/// The attribute span of a tag: everything between the tag name and `>`.
fn attr_span(tag: &str) -> &str {
    let inner = tag.trim_start_matches('<');
    let end = inner.find('>').unwrap_or(inner.len());
    let inner = &inner[..end];
    // Skip the tag name itself.
    inner
        .find(char::is_whitespace)
        .map_or("", |idx| &inner[idx..])
}

fn parse_attributes(span: &str) -> Vec<Attribute> {
    ATTR_RE
        .captures_iter(span)
        .map(|caps| {
            let name = caps.get(1).map_or("", |m| m.as_str()).to_string();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or(String::new(), |m| m.as_str().to_string());
            Attribute { name, value }
        })
        .filter(|a| !a.name.is_empty())
        .collect()
}

fn attr_value(attrs: &[Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
        .map(|a| a.value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Games</title>
  <link rel="stylesheet" href="/css/games.css">
  <link rel="icon" href="/favicon.ico">
  <link rel="preconnect">
  <style>.grid { display: flex; }</style>
</head>
<body>
  <div class="grid" id="games"></div>
  <script src="/js/games.js"></script>
  <script>initGames();</script>
  <script src="/js/analytics.js" async></script>
</body>
</html>"#;

    #[test]
    fn extracts_head_assets_in_document_order() {
        let frag = ParsedFragment::parse(DOC);
        assert_eq!(frag.assets.len(), 3);
        assert_eq!(frag.assets[0].href(), Some("/css/games.css"));
        assert_eq!(frag.assets[1].href(), Some("/favicon.ico"));
        assert!(matches!(&frag.assets[2], HeadAsset::Style { css } if css.contains("flex")));
    }

    #[test]
    fn link_without_href_is_skipped() {
        let frag = ParsedFragment::parse(DOC);
        assert!(frag.assets.iter().all(|a| a.href() != Some("")));
    }

    #[test]
    fn strips_scripts_from_body() {
        let frag = ParsedFragment::parse(DOC);
        assert!(frag.body_html.contains(r#"id="games""#));
        assert!(!frag.body_html.contains("<script"));
    }

    #[test]
    fn collects_scripts_in_document_order() {
        let frag = ParsedFragment::parse(DOC);
        assert_eq!(frag.scripts.len(), 3);
        assert_eq!(frag.scripts[0].src.as_deref(), Some("/js/games.js"));
        assert!(!frag.scripts[0].is_async());
        assert!(!frag.scripts[1].is_external());
        assert_eq!(frag.scripts[1].text.trim(), "initGames();");
        assert!(frag.scripts[2].is_async());
    }

    #[test]
    fn module_scripts_count_as_async() {
        let frag = ParsedFragment::parse(r#"<body><script type="module" src="/m.js"></script></body>"#);
        assert!(frag.scripts[0].is_async());
    }

    #[test]
    fn single_quoted_and_bare_attributes_parse() {
        let frag =
            ParsedFragment::parse("<body><script src='/a.js' defer>x</script></body>");
        assert_eq!(frag.scripts[0].src.as_deref(), Some("/a.js"));
        assert!(frag.scripts[0].is_async());
    }

    #[test]
    fn document_without_body_tag_uses_remainder_as_body() {
        let frag = ParsedFragment::parse(
            "<head><style>p{}</style></head><h1>Hi</h1><script>go();</script>",
        );
        assert_eq!(frag.assets.len(), 1);
        assert_eq!(frag.body_html, "<h1>Hi</h1>");
        assert_eq!(frag.scripts.len(), 1);
    }

    #[test]
    fn script_label_for_logging() {
        let frag = ParsedFragment::parse(DOC);
        assert_eq!(frag.scripts[0].label(), "/js/games.js");
        assert_eq!(frag.scripts[1].label(), "<inline>");
    }
}
