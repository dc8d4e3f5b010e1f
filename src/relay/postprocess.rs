//! Cleanup applied to a buffered completion before it's returned as
//! `{ thinking, response }`.

use crate::api::public::chat::ChatResponse;

/// Marks the end of the reasoning segment in the raw completion.
pub const THINK_SEPARATOR: &str = "</think>";
const THINK_OPEN: &str = "<think>";

const QUOTES: [char; 2] = ['"', '\''];

/// Remove one pair of matching quotes around `line`, if present.
fn unwrap_quotes(line: &str) -> Option<&str> {
    QUOTES
        .iter()
        .find_map(|q| line.strip_prefix(*q).and_then(|rest| rest.strip_suffix(*q)))
}

/// Strip leading `+` continuation artifacts and quote pairs wrapping
/// the whole line. Quotes only count when the same character opens and
/// closes the line. Applying it to its own output is a no-op.
pub fn clean_line(line: &str) -> &str {
    let mut line = line;
    loop {
        let trimmed = line.trim_start_matches('+');
        match unwrap_quotes(trimmed) {
            Some(inner) => line = inner,
            None => return trimmed,
        }
    }
}

/// Apply [`clean_line`] to every line of `text`.
pub fn clean_text(text: &str) -> String {
    text.lines().map(clean_line).collect::<Vec<_>>().join("\n")
}

fn strip_think_open(segment: &str) -> String {
    let segment = segment.trim();
    segment
        .strip_prefix(THINK_OPEN)
        .unwrap_or(segment)
        .trim()
        .to_string()
}

/// Clean the raw completion and split it on the first
/// [`THINK_SEPARATOR`]. Without a separator the whole text is treated
/// as thinking and `response` is left empty.
pub fn split_reasoning(raw: &str) -> ChatResponse {
    let cleaned = clean_text(raw);

    match cleaned.split_once(THINK_SEPARATOR) {
        Some((thinking, response)) => ChatResponse {
            thinking: Some(strip_think_open(thinking)),
            response: Some(response.trim().to_string()),
        },
        None => ChatResponse {
            thinking: Some(strip_think_open(&cleaned)),
            response: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_line() {
        assert_eq!(clean_line(r#""quoted""#), "quoted");
        assert_eq!(clean_line("'single'"), "single");
        assert_eq!(clean_line("+ continued"), " continued");
        assert_eq!(clean_line(r#"++"both""#), "both");
        assert_eq!(clean_line("plain text"), "plain text");
        assert_eq!(clean_line(r#"say "hi" now"#), r#"say "hi" now"#);
        assert_eq!(clean_line(""), "");
        assert_eq!(clean_line(r#"+""#), r#"""#);
        assert_eq!(clean_line(r#"+"'nested'""#), "nested");
    }

    #[test]
    fn test_clean_line_keeps_unpaired_quotes() {
        assert_eq!(clean_line(r#"He said "hi""#), r#"He said "hi""#);
        assert_eq!(clean_line("'tis the season"), "'tis the season");
        assert_eq!(clean_line(r#""Hello," she said."#), r#""Hello," she said."#);
        assert_eq!(clean_line(r#""mixed'"#), r#""mixed'"#);
        assert_eq!(clean_line("+it's fine"), "it's fine");
    }

    #[test]
    fn test_clean_line_is_idempotent() {
        let lines = [
            r#""+a""#,
            "+'+b'+",
            r#"''""x""''"#,
            "+++",
            "  +indented",
            "a + b = 'c'",
            r#""""#,
            "text",
            r#"He said "hi""#,
            "'tis",
            r#""'+x'""#,
            r#"+"+"+y"+"+""#,
        ];
        for line in lines {
            let once = clean_line(line);
            assert_eq!(clean_line(once), once, "not idempotent for {:?}", line);
        }
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let text = "\"first\"\n+second\n'+third'\n\n  fourth  \n";
        let once = clean_text(text);
        assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn test_split_with_separator() {
        let reply = split_reasoning("4\n</think>\nThe answer is 4");
        assert_eq!(reply.thinking.as_deref(), Some("4"));
        assert_eq!(reply.response.as_deref(), Some("The answer is 4"));
    }

    #[test]
    fn test_split_without_separator() {
        let reply = split_reasoning("  just some text\nover two lines  ");
        assert_eq!(
            reply.thinking.as_deref(),
            Some("just some text\nover two lines")
        );
        assert_eq!(reply.response, None);
    }

    #[test]
    fn test_split_strips_think_open_tag() {
        let reply = split_reasoning("<think>\nLet me add.\n</think>\n\n\"2 + 2 = 4\"");
        assert_eq!(reply.thinking.as_deref(), Some("Let me add."));
        assert_eq!(reply.response.as_deref(), Some("2 + 2 = 4"));
    }

    #[test]
    fn test_split_keeps_trailing_quoted_word() {
        let reply = split_reasoning("ok\n</think>\nThe word is \"cat\"");
        assert_eq!(reply.response.as_deref(), Some("The word is \"cat\""));
    }

    #[test]
    fn test_split_uses_first_separator() {
        let reply = split_reasoning("a</think>b</think>c");
        assert_eq!(reply.thinking.as_deref(), Some("a"));
        assert_eq!(reply.response.as_deref(), Some("b</think>c"));
    }

    #[test]
    fn test_split_cleans_lines_before_splitting() {
        let reply = split_reasoning("+\"hmm\"\n</think>\n+'Done'");
        assert_eq!(reply.thinking.as_deref(), Some("hmm"));
        assert_eq!(reply.response.as_deref(), Some("Done"));
    }
}
