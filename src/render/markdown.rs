//! Markdown to HTML using pulldown-cmark.
//!
//! Events pass through a small rewriting layer before `push_html`:
//! headings get slug ids, registered code block languages are handed to
//! their [`BlockHandler`], inline text goes through the [`InlinePattern`]s,
//! and every piece of user text has the placeholder opener defused.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use super::{BlockHandler, Extensible, InlinePattern, MarkupRenderer, RenderContext, Rendered};
use crate::deferred::{TOKEN_OPEN, neutralize};
use crate::outline::SlugSet;
use crate::utils::html::escape;
use crate::utils::path::slug::slugify;

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: MarkdownOptions,
    blocks: Vec<BlockHandler>,
    inlines: Vec<InlinePattern>,
}

impl MarkdownRenderer {
    pub fn new(options: MarkdownOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// All markdown extensions plus every block handler and inline pattern.
    pub fn with_extensions() -> Self {
        let mut renderer = Self::new(MarkdownOptions::all());
        renderer.register_block_handler(BlockHandler::Mermaid);
        renderer.register_block_handler(BlockHandler::Query);
        renderer.register_inline_pattern(InlinePattern::Highlight);
        renderer
    }

    fn block_handler(&self, info: &str) -> Option<BlockHandler> {
        let lang = info.split_whitespace().next()?;
        self.blocks
            .iter()
            .copied()
            .find(|handler| handler.language().eq_ignore_ascii_case(lang))
    }

    fn inline_html(&self, text: &str) -> String {
        let escaped = escape(text);
        let mut html = escaped.into_owned();
        for pattern in &self.inlines {
            if let Some(rewritten) = pattern.apply(&html) {
                html = rewritten;
            }
        }
        neutralize(&html).into_owned()
    }
}

impl Extensible for MarkdownRenderer {
    fn register_block_handler(&mut self, handler: BlockHandler) {
        if !self.blocks.contains(&handler) {
            self.blocks.push(handler);
        }
    }

    fn register_inline_pattern(&mut self, pattern: InlinePattern) {
        if !self.inlines.contains(&pattern) {
            self.inlines.push(pattern);
        }
    }
}

/// Per-render state.
#[derive(Default)]
struct Pass<'a> {
    events: Vec<Event<'a>>,
    plain: String,
    slugs: SlugSet,
    /// Position of the open heading's start event.
    heading: Option<usize>,
    heading_text: String,
    /// Handled code block being collected.
    block: Option<(BlockHandler, String)>,
    in_code_block: bool,
    /// Nesting depth of images; pulldown-cmark escapes alt text itself.
    in_image: usize,
}

impl MarkupRenderer for MarkdownRenderer {
    fn render(&self, text: &str, ctx: &RenderContext) -> Rendered {
        let parser = Parser::new_ext(text, self.options.to_pulldown_options());
        let mut pass = Pass::default();

        for event in parser {
            if let Some((handler, code)) = &mut pass.block {
                match event {
                    Event::Text(t) => code.push_str(&t),
                    Event::End(TagEnd::CodeBlock) => {
                        pass.plain.push_str(code);
                        pass.plain.push('\n');
                        let html = handler.render(code);
                        pass.events.push(Event::Html(html.into()));
                        pass.block = None;
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let handler = match &kind {
                        CodeBlockKind::Fenced(info) => self.block_handler(info),
                        CodeBlockKind::Indented => None,
                    };
                    match handler {
                        Some(handler) => pass.block = Some((handler, String::new())),
                        None => {
                            pass.in_code_block = true;
                            pass.events.push(Event::Start(Tag::CodeBlock(kind)));
                        }
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    pass.in_code_block = false;
                    pass.events.push(event);
                }
                Event::Start(Tag::Heading { .. }) => {
                    pass.heading = Some(pass.events.len());
                    pass.heading_text.clear();
                    pass.events.push(event);
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(start) = pass.heading.take()
                        && let Event::Start(Tag::Heading { id, .. }) = &mut pass.events[start]
                    {
                        let base = match id.as_deref() {
                            Some(custom) => custom.to_string(),
                            None => slugify(&pass.heading_text, ctx.fragment_slug),
                        };
                        *id = Some(CowStr::from(pass.slugs.claim(&base)));
                    }
                    pass.plain.push('\n');
                    pass.events.push(event);
                }
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    pass.in_image += 1;
                    pass.events.push(Event::Start(Tag::Image {
                        link_type,
                        dest_url: defuse(dest_url),
                        title: defuse(title),
                        id,
                    }));
                }
                Event::End(TagEnd::Image) => {
                    pass.in_image = pass.in_image.saturating_sub(1);
                    pass.events.push(event);
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    pass.events.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url: defuse(dest_url),
                        title: defuse(title),
                        id,
                    }));
                }
                Event::Text(t) => {
                    pass.record_text(&t);
                    if pass.in_image > 0 {
                        pass.events.push(Event::Text(defuse(t)));
                    } else if pass.in_code_block {
                        let html = neutralize(&escape(&t)).into_owned();
                        pass.events.push(Event::Html(html.into()));
                    } else {
                        pass.events.push(Event::InlineHtml(self.inline_html(&t).into()));
                    }
                }
                Event::Code(code) => {
                    pass.record_text(&code);
                    if pass.in_image > 0 {
                        pass.events.push(Event::Code(defuse(code)));
                    } else {
                        let html = format!("<code>{}</code>", neutralize(&escape(&code)));
                        pass.events.push(Event::InlineHtml(html.into()));
                    }
                }
                Event::Html(raw) => {
                    pass.events.push(Event::Html(neutralize_cow(raw)));
                }
                Event::InlineHtml(raw) => {
                    pass.events.push(Event::InlineHtml(neutralize_cow(raw)));
                }
                Event::SoftBreak | Event::HardBreak => {
                    pass.plain.push(' ');
                    pass.events.push(event);
                }
                Event::End(TagEnd::Paragraph | TagEnd::Item | TagEnd::TableCell) => {
                    pass.plain.push('\n');
                    pass.events.push(event);
                }
                other => pass.events.push(other),
            }
        }

        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, pass.events.into_iter());

        Rendered {
            html: out,
            text: pass.plain.trim().to_string(),
        }
    }
}

impl Pass<'_> {
    fn record_text(&mut self, text: &str) {
        self.plain.push_str(text);
        if self.heading.is_some() {
            self.heading_text.push_str(text);
        }
    }
}

/// Break the placeholder opener in text that pulldown-cmark escapes itself.
///
/// An entity would be escaped again, so a zero-width space goes after the
/// brace instead.
fn defuse(s: CowStr<'_>) -> CowStr<'_> {
    if s.contains(TOKEN_OPEN) {
        CowStr::from(s.replace(TOKEN_OPEN, "{\u{200B}_core_"))
    } else {
        s
    }
}

fn neutralize_cow(s: CowStr<'_>) -> CowStr<'_> {
    if s.contains(TOKEN_OPEN) {
        CowStr::from(neutralize(&s).into_owned())
    } else {
        s
    }
}
