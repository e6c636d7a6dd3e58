//! # Schema JSON Parser
//!
//! Recursive-descent JSON parsing for layout schema documents.
//!
//! The parser exists for one reason: a layout schema's field order *is* its
//! byte layout, and a map-based JSON library would throw that order away.
//! `JsonValue::Object` therefore keeps its entries in a `Vec`, in exactly
//! the order they appear in the file.
//!
//! Two deliberate simplifications versus a general-purpose JSON crate:
//!
//! - Values are always owned. Schema documents are a few hundred bytes read
//!   once at startup; there is nothing to win by borrowing string slices
//!   out of the input.
//! - The grammar is strict. Members must be separated by exactly one comma
//!   and a document must contain exactly one value; trailing commas or
//!   trailing content are errors. A schema file is hand-written config, so
//!   a sloppy-but-accepted file is more likely a mistake than a convenience.
//!
//! Errors report the byte offset the parser stopped at.

use eyre::{bail, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    /// Looks up a key on an object; `None` for other kinds or missing keys.
    /// First occurrence wins when a key repeats.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            JsonValue::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "bool",
            JsonValue::Number(_) => "number",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }
}

/// Parses a complete JSON document: one value, optionally surrounded by
/// whitespace, and nothing else.
pub fn parse_document(input: &str) -> Result<JsonValue> {
    let mut parser = JsonParser {
        src: input,
        at: 0,
    };

    parser.skip_ws();
    let value = parser.parse_value()?;
    parser.skip_ws();

    if parser.at < parser.src.len() {
        bail!("trailing content after document at byte {}", parser.at);
    }
    Ok(value)
}

struct JsonParser<'a> {
    src: &'a str,
    at: usize,
}

impl JsonParser<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.at).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.at += 1;
        }
    }

    /// Consumes one expected punctuation byte, or fails naming it.
    fn expect(&mut self, byte: u8, context: &str) -> Result<()> {
        self.skip_ws();
        match self.peek() {
            Some(b) if b == byte => {
                self.at += 1;
                Ok(())
            }
            _ => bail!(
                "expected '{}' {} at byte {}",
                byte as char,
                context,
                self.at
            ),
        }
    }

    fn parse_value(&mut self) -> Result<JsonValue> {
        self.skip_ws();
        match self.peek() {
            Some(b'{') => {
                self.at += 1;
                self.parse_object_body()
            }
            Some(b'[') => {
                self.at += 1;
                self.parse_array_body()
            }
            Some(b'"') => Ok(JsonValue::String(self.parse_string_literal()?)),
            Some(b't') => self.parse_keyword("true", JsonValue::Bool(true)),
            Some(b'f') => self.parse_keyword("false", JsonValue::Bool(false)),
            Some(b'n') => self.parse_keyword("null", JsonValue::Null),
            Some(b'-' | b'0'..=b'9') => Ok(JsonValue::Number(self.parse_number_literal()?)),
            Some(b) => bail!("no value starts with '{}' at byte {}", b as char, self.at),
            None => bail!("document ended where a value was expected"),
        }
    }

    /// Called with the opening `{` already consumed. Entries keep file
    /// order; duplicate keys are preserved for the caller to judge.
    fn parse_object_body(&mut self) -> Result<JsonValue> {
        let mut entries = Vec::new();

        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.at += 1;
            return Ok(JsonValue::Object(entries));
        }

        loop {
            self.skip_ws();
            if self.peek() != Some(b'"') {
                bail!("expected a string key at byte {}", self.at);
            }
            let key = self.parse_string_literal()?;
            self.expect(b':', "after object key")?;
            let value = self.parse_value()?;
            entries.push((key, value));

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.at += 1,
                Some(b'}') => {
                    self.at += 1;
                    return Ok(JsonValue::Object(entries));
                }
                _ => bail!("expected ',' or '}}' after object member at byte {}", self.at),
            }
        }
    }

    /// Called with the opening `[` already consumed.
    fn parse_array_body(&mut self) -> Result<JsonValue> {
        let mut elements = Vec::new();

        self.skip_ws();
        if self.peek() == Some(b']') {
            self.at += 1;
            return Ok(JsonValue::Array(elements));
        }

        loop {
            elements.push(self.parse_value()?);

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.at += 1,
                Some(b']') => {
                    self.at += 1;
                    return Ok(JsonValue::Array(elements));
                }
                _ => bail!("expected ',' or ']' after array element at byte {}", self.at),
            }
        }
    }

    /// Consumes a quoted string, resolving escapes as it goes. The result
    /// is always owned; see the module doc.
    fn parse_string_literal(&mut self) -> Result<String> {
        let opened_at = self.at;
        self.at += 1; // opening quote

        let mut out = String::new();
        loop {
            match self.src[self.at..].chars().next() {
                None => bail!("unterminated string opened at byte {}", opened_at),
                Some('"') => {
                    self.at += 1;
                    return Ok(out);
                }
                Some('\\') => {
                    self.at += 1;
                    self.push_escape(&mut out)?;
                }
                Some(c) => {
                    out.push(c);
                    self.at += c.len_utf8();
                }
            }
        }
    }

    /// Resolves one escape sequence, cursor sitting just past the backslash.
    fn push_escape(&mut self, out: &mut String) -> Result<()> {
        let Some(code) = self.peek() else {
            bail!("string ends in a bare backslash at byte {}", self.at);
        };
        self.at += 1;

        let resolved = match code {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'b' => '\x08',
            b'f' => '\x0C',
            b'u' => {
                let Some(hex) = self.src.get(self.at..self.at + 4) else {
                    bail!("truncated \\u escape at byte {}", self.at);
                };
                let Ok(code_point) = u32::from_str_radix(hex, 16) else {
                    bail!("bad hex in \\u{} at byte {}", hex, self.at);
                };
                self.at += 4;
                match char::from_u32(code_point) {
                    Some(c) => c,
                    None => bail!("\\u{} is not a valid code point", hex),
                }
            }
            other => bail!(
                "unsupported escape '\\{}' at byte {}",
                other as char,
                self.at - 1
            ),
        };
        out.push(resolved);
        Ok(())
    }

    fn parse_keyword(&mut self, keyword: &str, value: JsonValue) -> Result<JsonValue> {
        if self.src[self.at..].starts_with(keyword) {
            self.at += keyword.len();
            Ok(value)
        } else {
            bail!("expected '{}' at byte {}", keyword, self.at)
        }
    }

    fn parse_number_literal(&mut self) -> Result<f64> {
        let start = self.at;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
        ) {
            self.at += 1;
        }

        let literal = &self.src[start..self.at];
        match literal.parse::<f64>() {
            Ok(n) => Ok(n),
            Err(_) => bail!("malformed number literal '{}' at byte {}", literal, start),
        }
    }
}
