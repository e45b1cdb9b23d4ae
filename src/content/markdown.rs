//! Markdown rendering with themed elements and syntax highlighting

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde::{Deserialize, Serialize};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

lazy_static! {
    static ref LANGUAGE_HINT: Regex = Regex::new(r"^(\w+)").unwrap();
}

/// CSS classes applied to rendered elements, plus the highlighting theme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownTheme {
    pub heading: String,
    pub paragraph: String,
    pub link: String,
    pub inline_code: String,
    pub code_block: String,
    /// syntect theme name
    pub syntax_theme: String,
}

impl Default for MarkdownTheme {
    fn default() -> Self {
        Self {
            heading: "md-heading".to_string(),
            paragraph: "md-text".to_string(),
            link: "md-link".to_string(),
            inline_code: "tag tag-red".to_string(),
            code_block: "code-block".to_string(),
            syntax_theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: MarkdownTheme,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_theme(MarkdownTheme::default())
    }

    /// Create with custom theme overrides
    pub fn with_theme(theme: MarkdownTheme) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme,
        }
    }

    /// Render markdown to an HTML fragment
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // Some(lang) while inside a code block
        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block = Some(match kind {
                        CodeBlockKind::Fenced(info) => language_hint(&info),
                        CodeBlockKind::Indented => None,
                    });
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().flatten();
                    let highlighted = self.highlight_code(&code_block_content, lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }
                Event::Code(code) => {
                    events.push(Event::InlineHtml(CowStr::from(format!(
                        r#"<span class="{}">{}</span>"#,
                        self.theme.inline_code,
                        html_escape(&code)
                    ))));
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    events.push(Event::Html(CowStr::from(format!(
                        r#"<h{} class="{}">"#,
                        heading_rank(level),
                        self.theme.heading
                    ))));
                }
                Event::End(TagEnd::Heading(level)) => {
                    events.push(Event::Html(CowStr::from(format!(
                        "</h{}>\n",
                        heading_rank(level)
                    ))));
                }
                Event::Start(Tag::Paragraph) => {
                    events.push(Event::Html(CowStr::from(format!(
                        r#"<p class="{}">"#,
                        self.theme.paragraph
                    ))));
                }
                Event::End(TagEnd::Paragraph) => {
                    events.push(Event::Html(CowStr::from("</p>\n")));
                }
                Event::Start(Tag::Link {
                    dest_url, title, ..
                }) => {
                    let title_attr = if title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, html_escape(&title))
                    };
                    events.push(Event::InlineHtml(CowStr::from(format!(
                        r#"<a class="{}" href="{}"{}>"#,
                        self.theme.link,
                        html_escape(&dest_url),
                        title_attr
                    ))));
                }
                Event::End(TagEnd::Link) => {
                    events.push(Event::InlineHtml(CowStr::from("</a>")));
                }
                // raw HTML in the source is shown as text, never emitted
                Event::Html(raw) | Event::InlineHtml(raw) => {
                    events.push(Event::Text(raw));
                }
                _ => {
                    if code_block.is_none() {
                        events.push(event);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block; an unknown language falls back to plain text
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let code = code.strip_suffix('\n').unwrap_or(code);

        let syntax = lang
            .and_then(|lang| {
                self.syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let lang_attr = lang
            .map(|lang| format!(r#" data-language="{}""#, lang))
            .unwrap_or_default();

        let body = match self.theme_set.themes.get(&self.theme.syntax_theme) {
            Some(theme) => highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
                .unwrap_or_else(|e| {
                    tracing::debug!("Highlighting failed, rendering plain code: {}", e);
                    format!("<pre>{}</pre>", html_escape(code))
                }),
            None => {
                tracing::debug!("Unknown syntax theme {:?}", self.theme.syntax_theme);
                format!("<pre>{}</pre>", html_escape(code))
            }
        };

        format!(
            r#"<div class="{}"{}>{}</div>"#,
            self.theme.code_block, lang_attr, body
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Language named by a fence info string (`go`, `language-go`, `rust,ignore`)
pub fn language_hint(info: &str) -> Option<String> {
    let info = info.trim();
    let info = info.strip_prefix("language-").unwrap_or(info);
    LANGUAGE_HINT
        .captures(info)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn heading_rank(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Simple HTML escaping
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
