use draftline_core::escape_html;
use ego_tree::NodeRef;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html};

const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "br", "hr", "div", "span", "ul", "ol", "li",
    "table", "thead", "tbody", "tfoot", "tr", "th", "td", "caption", "strong", "b", "em", "i",
    "u", "s", "del", "sup", "sub", "a", "img", "code", "pre", "blockquote",
];

const ALLOWED_ATTRS: &[&str] = &[
    "style", "class", "title", "href", "src", "alt", "colspan", "rowspan",
];

/// Removed together with everything inside them.
const DROPPED_TAGS: &[&str] = &[
    "script", "style", "iframe", "noscript", "template", "object", "embed", "head", "title",
];

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// Allow-list HTML sanitizer for backend payloads.
///
/// Unknown tags are unwrapped (their children are kept), event handler attributes
/// and script URLs are removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlSanitizer;

impl HtmlSanitizer {
    pub fn sanitize(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let mut out = String::with_capacity(html.len());
        for child in fragment.root_element().children() {
            self.visit_node(child, &mut out);
        }
        out
    }

    fn visit_node(&self, node: NodeRef<'_, Node>, out: &mut String) {
        match node.value() {
            Node::Text(text) => out.push_str(&escape_html(text)),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node) {
                    self.visit_element(element, out);
                }
            }
            Node::Comment(_) | Node::ProcessingInstruction(_) | Node::Doctype(_) => {}
            _ => {
                for child in node.children() {
                    self.visit_node(child, out);
                }
            }
        }
    }

    fn visit_element(&self, element: ElementRef<'_>, out: &mut String) {
        let tag = element.value().name().to_ascii_lowercase();
        if DROPPED_TAGS.contains(&tag.as_str()) {
            return;
        }
        if !ALLOWED_TAGS.contains(&tag.as_str()) {
            self.visit_children(element, out);
            return;
        }

        out.push('<');
        out.push_str(&tag);
        push_attributes(element.value(), out);
        out.push('>');
        if VOID_TAGS.contains(&tag.as_str()) {
            return;
        }
        self.visit_children(element, out);
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
    }

    fn visit_children(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            self.visit_node(child, out);
        }
    }
}

fn push_attributes(element: &Element, out: &mut String) {
    for (name, value) in element.attrs() {
        let name = name.to_ascii_lowercase();
        if !ALLOWED_ATTRS.contains(&name.as_str()) {
            continue;
        }
        if (name == "href" || name == "src") && is_script_url(value) {
            continue;
        }
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
}

pub(crate) fn is_script_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.starts_with("javascript:") || compact.starts_with("vbscript:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_urls_detected_through_whitespace() {
        assert!(is_script_url(" java\tscript:alert(1)"));
        assert!(is_script_url("JavaScript:void(0)"));
        assert!(!is_script_url("https://example.com/javascript:"));
    }

    #[test]
    fn unknown_tags_are_unwrapped() {
        let html = HtmlSanitizer.sanitize("<section><p>kept</p></section>");
        assert_eq!(html, "<p>kept</p>");
    }

    #[test]
    fn comments_are_removed() {
        let html = HtmlSanitizer.sanitize("<p>a<!-- hidden -->b</p>");
        assert_eq!(html, "<p>ab</p>");
    }
}
