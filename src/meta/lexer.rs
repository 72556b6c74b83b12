//! Line-oriented lexer for Micro-Manager's pseudo-JSON metadata.
//!
//! The metadata files look like JSON but are written one key per line and
//! are routinely malformed (trailing commas, unterminated arrays), so they
//! are scanned line by line instead of being handed to a JSON parser. The
//! lexer pulls one trimmed line at a time and turns it into a small stream
//! of [`Event`]s:
//!
//! - `{` and `"Key": {` open an object, lines starting with `}` close one.
//! - `"Key": [ ... ]` emits [`Event::ArrayOpen`], one [`Event::Key`] holding
//!   the merged array body, then [`Event::ArrayClose`]. When the closing
//!   bracket is on a later line, the intervening lines are concatenated.
//! - `"Key": value` emits [`Event::Key`]. Quotes and a trailing comma are
//!   stripped from the value. A value that ends up empty emits
//!   [`Event::Empty`] instead, which most consumers ignore.
//! - A scalar value with an opening bracket but no closing one on the same
//!   line, such as `"Label": "GFP [ex`, runs on until a line with `]`; the
//!   lines are joined into one value.
//!
//! Lines without a quoted key are skipped.

use std::collections::VecDeque;
use std::str::Lines;

/// A lexical event.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Start of an object, with the key it is bound to (if any).
    ObjectOpen(Option<String>),
    /// End of the innermost object.
    ObjectClose,
    /// Start of an array bound to `key`; its merged body follows as a `Key`.
    ArrayOpen(String),
    /// End of the array opened by the last `ArrayOpen`.
    ArrayClose,
    /// A key with a non-empty, cleaned value.
    Key { key: String, value: String },
    /// A scalar key whose value is empty once cleaned.
    Empty(String),
}

/// Pull-based lexer over a full metadata text.
pub struct Lexer<'a> {
    lines: Lines<'a>,
    line: usize,
    pending: VecDeque<Event>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line: 0,
            pending: VecDeque::new(),
        }
    }

    /// 1-based number of the last line consumed from the input.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Consumes events up to and including the close of the object whose
    /// `ObjectOpen` was just returned.
    pub fn skip_object(&mut self) {
        let mut depth = 1usize;
        for event in self.by_ref() {
            match event {
                Event::ObjectOpen(_) => depth += 1,
                Event::ObjectClose => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        for raw in self.lines.by_ref() {
            self.line += 1;
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
        None
    }

    fn lex_line(&mut self, line: &'a str) {
        if line == "{" {
            self.pending.push_back(Event::ObjectOpen(None));
            return;
        }
        if line.starts_with('}') {
            self.pending.push_back(Event::ObjectClose);
            return;
        }

        let Some((key, rest)) = split_key(line) else {
            return;
        };

        if let Some(body) = rest.strip_prefix('{') {
            self.pending.push_back(Event::ObjectOpen(Some(key.to_string())));
            if body.trim_start().starts_with('}') {
                self.pending.push_back(Event::ObjectClose);
            }
        } else if let Some(body) = rest.strip_prefix('[') {
            self.pending.push_back(Event::ArrayOpen(key.to_string()));
            let merged = match body.find(']') {
                Some(end) => body[..end].to_string(),
                None => self.merge_array_lines(body),
            };
            let value = clean_value(&merged);
            if !value.is_empty() {
                self.pending.push_back(Event::Key {
                    key: key.to_string(),
                    value,
                });
            }
            self.pending.push_back(Event::ArrayClose);
        } else {
            let value = if has_unclosed_bracket(rest) {
                clean_value(&self.merge_continued_value(rest))
            } else {
                clean_value(rest)
            };
            let event = if value.is_empty() {
                Event::Empty(key.to_string())
            } else {
                Event::Key {
                    key: key.to_string(),
                    value,
                }
            };
            self.pending.push_back(event);
        }
    }

    /// Joins whole lines onto `first` through the first one holding `]`.
    fn merge_continued_value(&mut self, first: &str) -> String {
        let mut merged = first.to_string();
        while let Some(line) = self.next_line() {
            merged.push_str(line);
            if line.contains(']') {
                break;
            }
        }
        merged
    }

    /// Concatenates lines until one carries the closing bracket.
    fn merge_array_lines(&mut self, first: &str) -> String {
        let mut merged = first.to_string();
        while let Some(line) = self.next_line() {
            match line.find(']') {
                Some(end) => {
                    merged.push_str(&line[..end]);
                    break;
                }
                None => merged.push_str(line),
            }
        }
        merged
    }
}

impl Iterator for Lexer<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            let line = self.next_line()?;
            self.lex_line(line);
        }
    }
}

/// Splits `"key": rest` into the first quoted substring and the trimmed text
/// after the colon that follows it.
fn split_key(line: &str) -> Option<(&str, &str)> {
    let open = line.find('"')?;
    let after_open = &line[open + 1..];
    let close = after_open.find('"')?;
    let key = &after_open[..close];
    let after_key = &after_open[close + 1..];
    let colon = after_key.find(':')?;
    Some((key, after_key[colon + 1..].trim()))
}

fn has_unclosed_bracket(value: &str) -> bool {
    value
        .rfind('[')
        .is_some_and(|open| !value[open..].contains(']'))
}

/// Strips surrounding whitespace, one trailing comma and every double quote.
pub(crate) fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);
    let unquoted = trimmed.replace('"', "");
    let unquoted = unquoted.trim();
    unquoted
        .strip_suffix(',')
        .unwrap_or(unquoted)
        .trim_end()
        .to_string()
}

/// Fuzz-only entrypoint that drains the lexer over arbitrary text.
#[cfg(feature = "fuzzing")]
pub fn fuzz_lex(text: &str) -> usize {
    Lexer::new(text).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: &str, value: &str) -> Event {
        Event::Key {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn lex(text: &str) -> Vec<Event> {
        Lexer::new(text).collect()
    }

    #[test]
    fn scalar_lines_become_keys() {
        let events = lex("  \"Slices\": 5,\n  \"Prefix\": \"run_1\",\n  \"Comment\": \"\"\n");
        assert_eq!(
            events,
            vec![
                key("Slices", "5"),
                key("Prefix", "run_1"),
                Event::Empty("Comment".to_string())
            ]
        );
    }

    #[test]
    fn structural_lines_carry_no_key() {
        let events = lex("{\n  \"Summary\": {\n    \"Frames\": 2\n  },\n}\n");
        assert_eq!(
            events,
            vec![
                Event::ObjectOpen(None),
                Event::ObjectOpen(Some("Summary".to_string())),
                key("Frames", "2"),
                Event::ObjectClose,
                Event::ObjectClose,
            ]
        );
    }

    #[test]
    fn multi_line_arrays_are_merged() {
        let events = lex("\"ChNames\": [\n  \"DAPI\",\n  \"GFP\"\n],\n\"Channels\": 2,\n");
        assert_eq!(
            events,
            vec![
                Event::ArrayOpen("ChNames".to_string()),
                key("ChNames", "DAPI,GFP"),
                Event::ArrayClose,
                key("Channels", "2"),
            ]
        );
    }

    #[test]
    fn single_line_arrays_are_unwrapped() {
        let events = lex("\"ChColors\": [-1, 255],");
        assert_eq!(
            events,
            vec![
                Event::ArrayOpen("ChColors".to_string()),
                key("ChColors", "-1, 255"),
                Event::ArrayClose,
            ]
        );
    }

    #[test]
    fn empty_arrays_emit_no_key() {
        let events = lex("\"Tags\": [],");
        assert_eq!(
            events,
            vec![Event::ArrayOpen("Tags".to_string()), Event::ArrayClose]
        );
    }

    #[test]
    fn brackets_inside_string_values_are_not_arrays() {
        let events = lex("\"Filter-Label\": \"GFP [ex 488]\",");
        assert_eq!(events, vec![key("Filter-Label", "GFP [ex 488]")]);
    }

    #[test]
    fn unclosed_bracket_in_a_value_joins_following_lines() {
        let events = lex("\"Label\": \"GFP [ex\n488 em\n525]\",\n\"Width\": 8,\n");
        assert_eq!(
            events,
            vec![key("Label", "GFP [ex488 em525]"), key("Width", "8")]
        );
    }

    #[test]
    fn values_keep_inner_colons() {
        let events = lex("\"Time\": \"2019-04-23 10:54:46 +0200\",");
        assert_eq!(events, vec![key("Time", "2019-04-23 10:54:46 +0200")]);
    }

    #[test]
    fn inline_empty_object_opens_and_closes() {
        let events = lex("\"UserData\": {},");
        assert_eq!(
            events,
            vec![
                Event::ObjectOpen(Some("UserData".to_string())),
                Event::ObjectClose
            ]
        );
    }

    #[test]
    fn skip_object_consumes_nested_content() {
        let mut lexer = Lexer::new(
            "\"IntendedDimensions\": {\n\"z\": 3,\n\"inner\": {\n\"a\": 1\n}\n},\n\"Width\": 8,\n",
        );
        assert_eq!(
            lexer.next(),
            Some(Event::ObjectOpen(Some("IntendedDimensions".to_string())))
        );
        lexer.skip_object();
        assert_eq!(lexer.next(), Some(key("Width", "8")));
        assert_eq!(lexer.line(), 7);
    }

    #[test]
    fn lines_without_keys_are_skipped() {
        assert!(lex("garbage\n]\n  \n").is_empty());
    }
}
