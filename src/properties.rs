//! Mapping file parser
//!
//! Reads the line-oriented `native = mime-type` format used for flavor map
//! sources:
//!
//! ```text
//! # comment
//! ! also a comment
//! UTF8_STRING = text/plain;charset=UTF-8
//! text/html:text/html;charset=UTF-8
//! LONG_NAME  text/plain;\
//!            charset=UTF-16LE
//! ESCAPED\ KEY = \u0041pplication/x-a
//! ```
//!
//! A logical line continues while it ends in an odd number of backslashes.
//! The key ends at the first unescaped `=`, `:` or whitespace. Keys and values
//! understand `\t \r \n \f`, `\uXXXX` and `\X` for any other `X`.
//!
//! A bad line is recorded as a [`LineDiagnostic`] and skipped. A `\u` escape
//! with fewer than four hex digits fails the whole parse.

use std::fmt;
use std::io::{self, BufRead};

use tracing::warn;

use crate::error::{FlavorMapError, Result};

/// One decoded `key = value` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    /// Line where the logical line starts (1-based)
    pub line: usize,
    /// Decoded key
    pub key: String,
    /// Decoded value (may be empty)
    pub value: String,
}

/// A skipped line and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiagnostic {
    /// Line where the logical line starts (1-based)
    pub line: usize,
    /// Human readable reason
    pub message: String,
}

impl fmt::Display for LineDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Result of parsing one stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedProperties {
    /// Entries in stream order
    pub entries: Vec<PropertyEntry>,
    /// Lines that were skipped
    pub diagnostics: Vec<LineDiagnostic>,
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\x0c'
}

/// Lines of a byte stream, terminators stripped
///
/// Each line is decoded on its own: UTF-8 when valid, Latin-1 otherwise, so a
/// stray byte never costs more than the line it sits on.
struct RawLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for RawLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(e) => return Some(Err(e)),
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        let line = match std::str::from_utf8(&self.buf) {
            Ok(text) => text.to_string(),
            Err(_) => self.buf.iter().map(|&b| char::from(b)).collect(),
        };
        Some(Ok(line))
    }
}

fn ends_with_odd_backslashes(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Parse a mapping stream
pub fn parse_reader<R: BufRead>(reader: R) -> Result<ParsedProperties> {
    let mut parsed = ParsedProperties::default();
    let mut lines = RawLines { reader, buf: Vec::new() }.enumerate();

    while let Some((index, line)) = lines.next() {
        let line = line?;
        let first = line.trim_start_matches(is_blank);
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let start_line = index + 1;
        let mut logical = first.to_string();
        while ends_with_odd_backslashes(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next?.trim_start_matches(is_blank)),
                None => break,
            }
        }

        match split_entry(&logical, start_line) {
            Ok(entry) => parsed.entries.push(entry),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Skipping mapping line {}: {}", start_line, e);
                parsed.diagnostics.push(LineDiagnostic {
                    line: start_line,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(parsed)
}

/// Parse mapping text held in memory
pub fn parse_str(text: &str) -> Result<ParsedProperties> {
    parse_reader(text.as_bytes())
}

/// Split a logical line into decoded key and value
fn split_entry(logical: &str, line: usize) -> Result<PropertyEntry> {
    let chars: Vec<char> = logical.chars().collect();
    let len = chars.len();

    let mut key_end = 0;
    while key_end < len {
        let c = chars[key_end];
        if c == '\\' {
            key_end += 2;
            continue;
        }
        if c == '=' || c == ':' || is_blank(c) {
            break;
        }
        key_end += 1;
    }
    let key_end = key_end.min(len);

    let mut value_start = key_end;
    while value_start < len && is_blank(chars[value_start]) {
        value_start += 1;
    }
    if value_start < len && (chars[value_start] == '=' || chars[value_start] == ':') {
        value_start += 1;
    }
    while value_start < len && is_blank(chars[value_start]) {
        value_start += 1;
    }

    Ok(PropertyEntry {
        line,
        key: unescape(&chars[..key_end], line)?,
        value: unescape(&chars[value_start..], line)?,
    })
}

/// Decode backslash escapes
///
/// Works in UTF-16 units so `\uD83D\uDE00` pairs combine into one char.
fn unescape(chars: &[char], line: usize) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(chars.len());
    let mut buf = [0u16; 2];
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;

        let decoded = if c == '\\' {
            // A dangling backslash can only survive an even trailing run; drop it
            let Some(&escaped) = chars.get(i) else {
                break;
            };
            i += 1;

            match escaped {
                't' => '\t',
                'r' => '\r',
                'n' => '\n',
                'f' => '\x0c',
                'u' => {
                    let digits = &chars[i..chars.len().min(i + 4)];
                    let hex = digits.iter().take_while(|d| d.is_ascii_hexdigit()).count();
                    if hex < 4 {
                        return Err(FlavorMapError::MalformedEscape { line, found: hex });
                    }
                    let code = digits
                        .iter()
                        .fold(0u16, |acc, d| (acc << 4) | d.to_digit(16).unwrap_or(0) as u16);
                    units.push(code);
                    i += 4;
                    continue;
                }
                other => other,
            }
        } else {
            c
        };

        units.extend_from_slice(decoded.encode_utf16(&mut buf));
    }

    String::from_utf16(&units).map_err(|_| FlavorMapError::MalformedLine {
        line,
        reason: "unpaired surrogate in \\u escape".to_string(),
    })
}
