use draftline_core::{
    detect_content_kind, escape_html, fix_markdown_leaks, prepare_markdown, style_for, ContentKind,
};
use draftline_logging::draft_debug;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::sanitize::{is_script_url, HtmlSanitizer};

pub trait Renderer: Send + Sync {
    fn render(&self, content: &str) -> String;
}

/// Sanitizes an HTML payload, then rewrites the Markdown that leaked into it.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer {
    sanitizer: HtmlSanitizer,
}

impl Renderer for HtmlRenderer {
    fn render(&self, content: &str) -> String {
        fix_markdown_leaks(&self.sanitizer.sanitize(content))
    }
}

/// Markdown to inline-styled HTML. Raw HTML in the source is shown escaped.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, content: &str) -> String {
        let prepared = prepare_markdown(content);
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut writer = HtmlWriter::default();
        for event in Parser::new_ext(&prepared, options) {
            writer.event(event);
        }
        writer.out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub kind: ContentKind,
    pub html: String,
}

/// Picks the rendering path from the payload itself and renders it.
pub fn render_content(content: &str) -> RenderedContent {
    let kind = detect_content_kind(content);
    draft_debug!("rendering {} bytes as {}", content.len(), kind.as_str());
    let html = match kind {
        ContentKind::Html => HtmlRenderer::default().render(content),
        ContentKind::Markdown => MarkdownRenderer.render(content),
    };
    RenderedContent { kind, html }
}

#[derive(Default)]
struct HtmlWriter {
    out: String,
    /// Closing markup for every open tag, innermost last.
    closers: Vec<String>,
    in_table_head: bool,
    /// Alt text collected while inside an image.
    image: Option<PendingImage>,
}

struct PendingImage {
    src: String,
    title: String,
    alt: String,
}

impl HtmlWriter {
    fn event(&mut self, event: Event<'_>) {
        if let Some(image) = self.image.as_mut() {
            match &event {
                Event::Text(text) | Event::Code(text) => {
                    image.alt.push_str(text);
                    return;
                }
                Event::End(TagEnd::Image) => {}
                _ => return,
            }
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(TagEnd::Image) => self.finish_image(),
            Event::End(_) => {
                if let Some(closer) = self.closers.pop() {
                    self.out.push_str(&closer);
                }
            }
            Event::Text(text) => self.out.push_str(&escape_html(&text)),
            Event::Code(text) => {
                self.open("code", "");
                self.out.push_str(&escape_html(&text));
                self.out.push_str("</code>");
            }
            Event::Html(raw) | Event::InlineHtml(raw) => self.out.push_str(&escape_html(&raw)),
            Event::SoftBreak => self.out.push('\n'),
            Event::HardBreak => self.out.push_str("<br>\n"),
            Event::Rule => {
                self.open("hr", "");
                self.out.push('\n');
            }
            Event::TaskListMarker(checked) => {
                self.out.push_str(if checked { "&#9745; " } else { "&#9744; " });
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let closer = match tag {
            Tag::Paragraph => self.block("p"),
            Tag::Heading { level, .. } => self.block(heading_tag(level)),
            Tag::BlockQuote(_) => self.block("blockquote"),
            Tag::CodeBlock(kind) => {
                self.open("pre", "");
                match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                        let class = format!(" class=\"language-{}\"", escape_html(&lang));
                        self.out.push_str(&format!("<code{class}>"));
                    }
                    _ => self.out.push_str("<code>"),
                }
                "</code></pre>\n".to_string()
            }
            Tag::List(Some(1)) => self.block("ol"),
            Tag::List(Some(start)) => {
                self.open("ol", &format!(" start=\"{start}\""));
                "</ol>\n".to_string()
            }
            Tag::List(None) => self.block("ul"),
            Tag::Item => self.block("li"),
            Tag::Table(_) => self.block("table"),
            Tag::TableHead => {
                self.in_table_head = true;
                self.out.push_str("<thead><tr>");
                "</tr></thead>\n".to_string()
            }
            Tag::TableRow => {
                self.in_table_head = false;
                self.out.push_str("<tr>");
                "</tr>\n".to_string()
            }
            Tag::TableCell => {
                let cell = if self.in_table_head { "th" } else { "td" };
                self.open(cell, "");
                format!("</{cell}>")
            }
            Tag::Emphasis => self.inline("em"),
            Tag::Strong => self.inline("strong"),
            Tag::Strikethrough => self.inline("del"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut attrs = String::new();
                if !is_script_url(&dest_url) {
                    attrs.push_str(&format!(" href=\"{}\"", escape_html(&dest_url)));
                }
                if !title.is_empty() {
                    attrs.push_str(&format!(" title=\"{}\"", escape_html(&title)));
                }
                self.open("a", &attrs);
                "</a>".to_string()
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(PendingImage {
                    src: dest_url.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                });
                return;
            }
            _ => String::new(),
        };
        self.closers.push(closer);
    }

    fn block(&mut self, tag: &str) -> String {
        self.open(tag, "");
        format!("</{tag}>\n")
    }

    fn inline(&mut self, tag: &str) -> String {
        self.open(tag, "");
        format!("</{tag}>")
    }

    fn open(&mut self, tag: &str, attrs: &str) {
        self.out.push('<');
        self.out.push_str(tag);
        let style = style_for(tag);
        if !style.is_empty() {
            self.out.push_str(&format!(" style=\"{style}\""));
        }
        self.out.push_str(attrs);
        self.out.push('>');
    }

    fn finish_image(&mut self) {
        let Some(image) = self.image.take() else {
            return;
        };
        let mut attrs = String::new();
        if !is_script_url(&image.src) {
            attrs.push_str(&format!(" src=\"{}\"", escape_html(&image.src)));
        }
        attrs.push_str(&format!(" alt=\"{}\"", escape_html(&image.alt)));
        if !image.title.is_empty() {
            attrs.push_str(&format!(" title=\"{}\"", escape_html(&image.title)));
        }
        self.open("img", &attrs);
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}
