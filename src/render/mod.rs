//! HTML rendering for transcript entries and the widget page

mod highlight;
mod page;

pub use highlight::{highlight_terms, HIGHLIGHT_TERMS};
pub use page::{render_page, Branding};

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::models::{ChatMessage, MessageSource, MessageView};

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_user_message(text: &str) -> String {
    format!(r#"<div class="user-message">{}</div>"#, escape_html(text))
}

/// Markdown reply from the model, with terms highlighted in text nodes only.
/// Raw HTML in the reply is shown as text.
pub fn render_model_message(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    // Image alt text is written from Text events only
    let mut image_depth = 0usize;
    let events = parser.map(move |event| match event {
        Event::Start(tag @ Tag::Image { .. }) => {
            image_depth += 1;
            Event::Start(tag)
        }
        Event::End(TagEnd::Image) => {
            image_depth = image_depth.saturating_sub(1);
            Event::End(TagEnd::Image)
        }
        Event::Text(text) if image_depth == 0 => {
            Event::Html(CowStr::from(highlight_terms(&escape_html(&text))))
        }
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut body = String::new();
    html::push_html(&mut body, events);
    format!(r#"<div class="ai-message">{}</div>"#, body.trim_end())
}

/// Encyclopedia text: escaped, not highlighted
pub fn render_fallback_message(text: &str) -> String {
    format!(
        r#"<div class="ai-message fallback">{}</div>"#,
        escape_html(text)
    )
}

pub fn render_message(message: &ChatMessage) -> String {
    match message.source {
        MessageSource::User => render_user_message(&message.text),
        MessageSource::Model => render_model_message(&message.text),
        MessageSource::Encyclopedia => render_fallback_message(&message.text),
    }
}

pub fn to_view(message: &ChatMessage) -> MessageView {
    MessageView {
        id: message.id.clone(),
        source: message.source,
        timestamp: message.timestamp,
        text: message.text.clone(),
        html: render_message(message),
    }
}
