use tracing::{trace, warn};

use crate::error::LoadError;
use crate::group::Item;
use crate::{Document, Limits, truncate};

/// Represents an on-going parse.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    text: &'a str,
    limits: Limits,
    document: Document,
    current: Option<usize>,
}

/// What a single line of input contributes to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Header(&'a str),
    Pair {
        key: &'a str,
        value: &'a str,
        quoted: bool,
    },
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(text: &'a str, limits: Limits) -> Self {
        Self {
            text,
            limits,
            document: Document::with_limits(limits),
            current: None,
        }
    }
}

impl Parser<'_> {
    /// Runs every line through the tokenizer; any error discards the partially built document.
    pub fn into_document(mut self) -> Result<Document, LoadError> {
        let text = self.text;

        for (i, line) in text.lines().enumerate() {
            let number = i + 1;
            let line = self.bound_line(line, number);
            let token = tokenize(line);
            trace!(line = number, ?token, "tokenized line");

            match token {
                Line::Blank => {}
                Line::Header(name) => {
                    // Repeated headers merge into the first group of that name.
                    self.current = Some(self.document.group_index_or_insert(name)?);
                }
                Line::Pair { key, value, quoted } => {
                    self.push_item(number, key, value, quoted)?;
                }
            }
        }

        Ok(self.document)
    }

    fn bound_line<'l>(&self, line: &'l str, number: usize) -> &'l str {
        let kept = truncate(line, self.limits.max_line_length);

        if kept.len() < line.len() {
            warn!(
                line = number,
                length = line.len(),
                limit = self.limits.max_line_length,
                "discarding the end of an over-long line"
            );
        }

        kept
    }

    fn push_item(
        &mut self,
        number: usize,
        key: &str,
        value: &str,
        quoted: bool,
    ) -> Result<(), LoadError> {
        let Some(current) = self.current else {
            return Err(LoadError::MissingSection { line: number });
        };

        let item = Item::new(
            self.limits.bounded(key, "key"),
            self.limits.bounded(value, "value"),
            quoted,
        );

        // Duplicate keys are kept; lookups return the first one.
        self.document.groups[current].push(item)?;

        Ok(())
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn tokenize(line: &str) -> Line<'_> {
    let line = line.trim_start_matches(is_blank);

    match line.chars().next() {
        None | Some('#' | ';') => Line::Blank,
        Some('[') => {
            let rest = &line[1..];
            let name = rest.split_once(']').map_or(rest, |(name, _)| name);

            Line::Header(name)
        }
        Some(_) => {
            let (key, rest) = line.split_once('=').unwrap_or((line, ""));
            let key = key.trim_end_matches(is_blank);
            let rest = rest.trim_start_matches(is_blank);

            if let Some(rest) = rest.strip_prefix('"') {
                // No escape sequences: the value ends at the very next quote.
                let value = rest.split_once('"').map_or(rest, |(value, _)| value);

                Line::Pair {
                    key,
                    value,
                    quoted: true,
                }
            } else {
                Line::Pair {
                    key,
                    value: rest.trim_end_matches(is_blank),
                    quoted: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair<'a>(key: &'a str, value: &'a str, quoted: bool) -> Line<'a> {
        Line::Pair { key, value, quoted }
    }

    #[test]
    fn blank_and_comment_lines() {
        assert_eq!(tokenize(""), Line::Blank);
        assert_eq!(tokenize(" \t "), Line::Blank);
        assert_eq!(tokenize("# comment"), Line::Blank);
        assert_eq!(tokenize("\t; comment = not a pair"), Line::Blank);
    }

    #[test]
    fn header_ignores_trailing_text() {
        assert_eq!(tokenize("[Section]"), Line::Header("Section"));
        assert_eq!(tokenize("  [Section] ; trailing"), Line::Header("Section"));
        assert_eq!(tokenize("[My Section]"), Line::Header("My Section"));
        assert_eq!(tokenize("[Unclosed"), Line::Header("Unclosed"));
    }

    #[test]
    fn key_keeps_interior_whitespace() {
        assert_eq!(
            tokenize("  my key \t= value"),
            pair("my key", "value", false)
        );
    }

    #[test]
    fn unquoted_value_is_trimmed() {
        assert_eq!(
            tokenize("key =   some value \t "),
            pair("key", "some value", false)
        );
        assert_eq!(tokenize("key=value"), pair("key", "value", false));
        assert_eq!(tokenize("key ="), pair("key", "", false));
    }

    #[test]
    fn unquoted_value_keeps_later_equals() {
        assert_eq!(tokenize("expr = 1+1=2"), pair("expr", "1+1=2", false));
    }

    #[test]
    fn quoted_value_stops_at_next_quote() {
        assert_eq!(
            tokenize(r#"name = "  padded value  " ignored"#),
            pair("name", "  padded value  ", true)
        );
        assert_eq!(
            tokenize(r#"escaped = "say \"hi\"""#),
            pair("escaped", r"say \", true)
        );
        assert_eq!(tokenize(r#"open = "runs on"#), pair("open", "runs on", true));
    }

    #[test]
    fn line_without_equals_is_key_with_empty_value() {
        assert_eq!(tokenize("flag  "), pair("flag", "", false));
    }

    #[test]
    fn merges_repeated_sections() {
        let text = "[A]\nx = 1\n[B]\ny = 2\n[A]\nz = 3\n";
        let document = Parser::new(text, Limits::default())
            .into_document()
            .expect("failed to parse hardcoded document");

        assert_eq!(document.group_count(), 2);

        let a = document.group("A").unwrap();
        let keys = a.items().iter().map(Item::key).collect::<Vec<_>>();
        assert_eq!(keys, ["x", "z"]);
    }

    #[test]
    fn pair_before_header_is_an_error() {
        let text = "# leading comment\n\nkey = value\n[A]\n";
        let result = Parser::new(text, Limits::default()).into_document();

        assert!(matches!(result, Err(LoadError::MissingSection { line: 3 })));
    }

    #[test]
    fn crlf_line_endings() {
        let text = "[A]\r\nkey = value\r\nname = \"quoted\"\r\n";
        let document = Parser::new(text, Limits::default())
            .into_document()
            .expect("failed to parse hardcoded document");

        let a = document.group("A").unwrap();
        assert_eq!(a.item("key").map(Item::value), Some("value"));
        assert_eq!(a.item("name").map(Item::value), Some("quoted"));
    }

    #[test]
    fn over_long_lines_are_cut() {
        let limits = Limits {
            max_line_length: 12,
            ..Limits::default()
        };
        let text = "[A]\nkey = abcdefghijk\n";
        let document = Parser::new(text, limits)
            .into_document()
            .expect("failed to parse hardcoded document");

        assert_eq!(
            document.group("A").and_then(|a| a.item("key")).map(Item::value),
            Some("abcdef")
        );
    }

    #[test]
    fn long_keys_and_values_are_truncated() {
        let limits = Limits {
            max_key_value_length: 3,
            ..Limits::default()
        };
        let text = "[A]\nlongkey = longvalue\n";
        let document = Parser::new(text, limits)
            .into_document()
            .expect("failed to parse hardcoded document");

        let item = &document.group("A").unwrap().items()[0];
        assert_eq!((item.key(), item.value()), ("lon", "lon"));
    }
}
