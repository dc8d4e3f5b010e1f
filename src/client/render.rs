//! Terminal rendering for transcript messages. Assistant messages are
//! treated as markdown, user messages are printed exactly as typed.
use std::sync::LazyLock;

use crossterm::style::Stylize;
use regex::Regex;

use super::models::{ChatMessage, Transcript};
use crate::openai::Role;

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("Invalid inline code regex"));
static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("Invalid strong regex"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)[-*+]\s+(.*)$").expect("Invalid bullet regex"));
static ORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)(\d+)[.)]\s+(.*)$").expect("Invalid ordered regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.*)$").expect("Invalid heading regex"));

fn render_inline(text: &str) -> String {
    // Code spans first so `**` inside them is left alone
    let mut out = String::new();
    let mut last = 0;
    for caps in INLINE_CODE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&render_strong(&text[last..whole.start()]));
        out.push_str(&caps[1].cyan().to_string());
        last = whole.end();
    }
    out.push_str(&render_strong(&text[last..]));
    out
}

fn render_strong(text: &str) -> String {
    STRONG
        .replace_all(text, |caps: &regex::Captures| caps[1].bold().to_string())
        .into_owned()
}

/// Render markdown for a terminal: paragraphs, bullet and ordered
/// lists, headings, fenced code blocks and inline code.
pub fn render_markdown(text: &str) -> String {
    let mut lines = Vec::new();
    let mut in_code = false;

    for line in text.lines() {
        if let Some(lang) = line.trim_start().strip_prefix("```") {
            in_code = !in_code;
            let label = if in_code { lang.trim() } else { "" };
            lines.push(format!("{} {}", "───".dark_grey(), label.dark_grey()));
            continue;
        }

        if in_code {
            lines.push(format!("{} {}", "│".dark_grey(), line.green()));
        } else if let Some(caps) = BULLET.captures(line) {
            lines.push(format!("{}• {}", &caps[1], render_inline(&caps[2])));
        } else if let Some(caps) = ORDERED.captures(line) {
            lines.push(format!("{}{}. {}", &caps[1], &caps[2], render_inline(&caps[3])));
        } else if let Some(caps) = HEADING.captures(line) {
            lines.push(caps[1].bold().underlined().to_string());
        } else {
            lines.push(render_inline(line));
        }
    }

    lines.join("\n")
}

pub fn render_message(msg: &ChatMessage) -> String {
    match msg.role {
        Role::User => format!("{} {}", ">>>".blue().bold(), msg.content),
        Role::Assistant => render_markdown(&msg.content),
    }
}

pub fn render_transcript(transcript: &Transcript) -> String {
    transcript
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n\n")
}
