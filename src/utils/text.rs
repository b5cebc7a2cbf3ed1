use regex::Regex;
use std::sync::OnceLock;

/// Longest free-text value shown before it is cut and suffixed with `...`.
pub const MAX_TEXT_LEN: usize = 100;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<.*?>").expect("tag pattern is valid"))
}

fn whitespace_regex() -> &'static Regex {
    static WS: OnceLock<Regex> = OnceLock::new();
    WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Removes `<...>` tags, collapses whitespace runs and trims.
pub fn clear_html(input: &str) -> String {
    let without_tags = tag_regex().replace_all(input, "");
    whitespace_regex()
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

pub fn shorten(input: &str) -> String {
    if input.chars().count() <= MAX_TEXT_LEN {
        return input.to_string();
    }
    let mut short: String = input.chars().take(MAX_TEXT_LEN).collect();
    short.push_str("...");
    short
}

/// Formats an integer with spaces between thousand groups: `1 234 567`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}
