//! MIME type grammar
//!
//! `primary "/" sub *( ";" name "=" value )`, values either tokens or
//! double-quoted strings with backslash escapes.

use crate::error::{FlavorMapError, Result};

const TSPECIALS: &str = "()<>@,;:\\\"/[]?=";

/// Split MIME type, names case-folded, parameters in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedMime {
    pub primary: String,
    pub sub: String,
    pub params: Vec<(String, String)>,
}

fn is_token_char(c: char) -> bool {
    c.is_ascii() && !c.is_ascii_control() && c != ' ' && !TSPECIALS.contains(c)
}

/// Non-empty run of token characters
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

/// Parse a MIME type string
pub(crate) fn parse(input: &str) -> Result<ParsedMime> {
    let err = |reason: &str| FlavorMapError::invalid_mime(input, reason);

    let (base, rest) = match input.split_once(';') {
        Some((base, rest)) => (base, Some(rest)),
        None => (input, None),
    };

    let (primary, sub) = base.split_once('/').ok_or_else(|| err("missing '/' separator"))?;
    let primary = primary.trim().to_ascii_lowercase();
    let sub = sub.trim().to_ascii_lowercase();

    if !is_token(&primary) {
        return Err(err("invalid primary type"));
    }
    if !is_token(&sub) {
        return Err(err("invalid subtype"));
    }

    let params = match rest {
        Some(rest) => parse_parameters(rest).map_err(err)?,
        None => Vec::new(),
    };

    Ok(ParsedMime { primary, sub, params })
}

fn skip_whitespace(chars: &[char], pos: &mut usize) {
    while *pos < chars.len() && chars[*pos].is_whitespace() {
        *pos += 1;
    }
}

fn parse_parameters(input: &str) -> std::result::Result<Vec<(String, String)>, &'static str> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut params = Vec::new();
    let mut pos = 0;

    loop {
        skip_whitespace(&chars, &mut pos);
        if pos >= len {
            break;
        }
        // Empty segments (";;" or a trailing ';') are tolerated
        if chars[pos] == ';' {
            pos += 1;
            continue;
        }

        let start = pos;
        while pos < len && is_token_char(chars[pos]) {
            pos += 1;
        }
        if pos == start {
            return Err("expected parameter name");
        }
        let name = chars[start..pos].iter().collect::<String>().to_ascii_lowercase();

        skip_whitespace(&chars, &mut pos);
        if pos >= len || chars[pos] != '=' {
            return Err("expected '=' after parameter name");
        }
        pos += 1;
        skip_whitespace(&chars, &mut pos);

        let value = if pos < len && chars[pos] == '"' {
            pos += 1;
            let mut value = String::new();
            let mut closed = false;
            while pos < len {
                let c = chars[pos];
                pos += 1;
                match c {
                    '\\' if pos < len => {
                        value.push(chars[pos]);
                        pos += 1;
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => value.push(c),
                }
            }
            if !closed {
                return Err("unterminated quoted parameter value");
            }
            value
        } else {
            let start = pos;
            while pos < len && is_token_char(chars[pos]) {
                pos += 1;
            }
            if pos == start {
                return Err("expected parameter value");
            }
            chars[start..pos].iter().collect()
        };

        params.push((name, value));

        skip_whitespace(&chars, &mut pos);
        if pos < len {
            if chars[pos] != ';' {
                return Err("expected ';' between parameters");
            }
            pos += 1;
        }
    }

    Ok(params)
}

/// Quote a parameter value unless it is a plain token
pub(crate) fn quote_if_needed(value: &str) -> String {
    if is_token(value) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
