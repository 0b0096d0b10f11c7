//! Lightweight structural checks for raw Turtle documents.
//!
//! This is not a Turtle parser. It catches the mistakes people make while
//! typing: unterminated IRIs and strings, unbalanced brackets, prefixes used
//! before their declaration, and a missing final `.`.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static PREFIX_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:@prefix|(?i:\bPREFIX\b))\s+([A-Za-z][\w.-]*)?:").expect("prefix decl regex")
});

static PREFIXED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[\s;,()\[\]^])([A-Za-z][\w.-]*)?:").expect("prefixed name regex")
});

/// Replace IRIs and string literals with empty placeholders and drop comments.
fn strip_literals(content: &str, problems: &mut Vec<String>) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len());
    let mut line = 1usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                out.push(c);
                i += 1;
            }
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '<' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == '>' || ch == '<' || ch.is_whitespace())
                    .map(|p| i + 1 + p);
                match end {
                    Some(j) if chars[j] == '>' => {
                        out.push_str("<>");
                        i = j + 1;
                    }
                    _ => {
                        problems.push(format!("Unterminated IRI on line {}", line));
                        out.push_str("<>");
                        i = end.unwrap_or(chars.len());
                    }
                }
            }
            '"' | '\'' => {
                let long = i + 2 < chars.len() && chars[i + 1] == c && chars[i + 2] == c;
                let start_line = line;
                let mut j = if long { i + 3 } else { i + 1 };
                let mut closed = false;
                while j < chars.len() {
                    let ch = chars[j];
                    if ch == '\\' {
                        j += 2;
                        continue;
                    }
                    if ch == '\n' {
                        if !long {
                            break;
                        }
                        line += 1;
                    }
                    if ch == c
                        && (!long || (j + 2 < chars.len() && chars[j + 1] == c && chars[j + 2] == c))
                    {
                        closed = true;
                        j += if long { 3 } else { 1 };
                        break;
                    }
                    j += 1;
                }
                if !closed {
                    problems.push(format!("Unterminated string literal on line {}", start_line));
                }
                out.push_str("\"\"");
                i = j.min(chars.len());
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

fn check_brackets(cleaned: &str, problems: &mut Vec<String>) {
    let mut stack: Vec<char> = Vec::new();
    for c in cleaned.chars() {
        match c {
            '[' | '(' => stack.push(c),
            ']' | ')' => {
                let expected = if c == ']' { '[' } else { '(' };
                if stack.pop() != Some(expected) {
                    problems.push(format!("Unexpected '{}'", c));
                    return;
                }
            }
            _ => {}
        }
    }
    if let Some(open) = stack.last() {
        problems.push(format!("Unclosed '{}'", open));
    }
}

fn check_prefixes(cleaned: &str, problems: &mut Vec<String>) {
    let declarations: Vec<(String, usize)> = PREFIX_DECL_RE
        .captures_iter(cleaned)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            Some((prefix.to_string(), whole.end() - 1))
        })
        .collect();

    let mut reported = BTreeSet::new();
    for caps in PREFIXED_NAME_RE.captures_iter(cleaned) {
        let Some(whole) = caps.get(0) else { continue };
        let colon = whole.end() - 1;
        if declarations.iter().any(|(_, pos)| *pos == colon) {
            continue;
        }
        let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let declared_before = declarations
            .iter()
            .any(|(declared, pos)| declared == prefix && *pos < colon);
        if !declared_before && reported.insert(prefix.to_string()) {
            problems.push(format!("Prefix '{}:' is used before it is declared", prefix));
        }
    }
}

/// Check a Turtle document and return every problem found.
pub fn check_turtle(content: &str) -> Vec<String> {
    if content.trim().is_empty() {
        return vec!["Turtle content is empty".to_string()];
    }
    let mut problems = Vec::new();
    let cleaned = strip_literals(content, &mut problems);
    check_brackets(&cleaned, &mut problems);
    check_prefixes(&cleaned, &mut problems);
    if !cleaned.trim_end().ends_with('.') {
        problems.push("The last statement must end with '.'".to_string());
    }
    problems
}
