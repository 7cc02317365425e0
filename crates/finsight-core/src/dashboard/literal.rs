//! Permissive object-literal parser.
//!
//! Fallback for model replies that are not strict JSON: JavaScript object
//! literals with unquoted or single-quoted keys, single-quoted strings,
//! trailing commas, comments, and function expressions as values. Function
//! expressions are captured as raw source text ([`LiteralValue::Function`]);
//! deciding whether a captured function may become a callable happens later,
//! in the materialization walk, which knows the field it sits under.
//!
//! This parser builds a value tree and nothing else -- it never evaluates
//! anything.

use std::fmt;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<LiteralValue>),
    /// Key/value pairs in source order.
    Object(Vec<(String, LiteralValue)>),
    /// A function expression, captured verbatim.
    Function(String),
}

/// Parse failure with the byte offset where it occurred.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at byte {position}")]
pub struct LiteralError {
    pub position: usize,
    pub message: String,
}

/// Parse a single literal value; trailing content is an error.
pub fn parse_literal(input: &str) -> Result<LiteralValue, LiteralError> {
    let mut parser = Parser { input, pos: 0 };
    parser.skip_trivia();
    let value = parser.parse_value()?;
    parser.skip_trivia();
    if parser.pos < parser.input.len() {
        return Err(parser.error("unexpected trailing content"));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parser at byte {}", self.pos)
    }
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Skip whitespace and `//` / `/* */` comments.
    fn skip_trivia(&mut self) {
        let bytes = self.input.as_bytes();
        loop {
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.rest().starts_with("//") {
                match self.rest().find('\n') {
                    Some(nl) => self.pos += nl + 1,
                    None => self.pos = self.input.len(),
                }
            } else if self.rest().starts_with("/*") {
                match self.rest()[2..].find("*/") {
                    Some(end) => self.pos += 2 + end + 2,
                    None => self.pos = self.input.len(),
                }
            } else {
                break;
            }
        }
    }

    fn parse_value(&mut self) -> Result<LiteralValue, LiteralError> {
        match self.peek() {
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(q @ (b'"' | b'\'')) => Ok(LiteralValue::String(self.parse_string(q)?)),
            Some(b'(') => self.capture_arrow_function(self.pos),
            Some(c) if c.is_ascii_digit() || c == b'-' || c == b'+' || c == b'.' => {
                self.parse_number()
            }
            Some(c) if is_ident_start(c) => self.parse_word(),
            _ => Err(self.error("expected a value")),
        }
    }

    fn parse_object(&mut self) -> Result<LiteralValue, LiteralError> {
        self.pos += 1; // '{'
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(LiteralValue::Object(entries));
                }
                None => return Err(self.error("unterminated object")),
                _ => {}
            }

            let key = self.parse_key()?;
            self.skip_trivia();
            if self.peek() != Some(b':') {
                return Err(self.error("expected ':' after object key"));
            }
            self.pos += 1;
            self.skip_trivia();
            let value = self.parse_value()?;
            entries.push((key, value));

            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1, // trailing comma handled by the '}' check above
                Some(b'}') => {}
                _ => return Err(self.error("expected ',' or '}' in object")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<LiteralValue, LiteralError> {
        self.pos += 1; // '['
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(LiteralValue::Array(items));
                }
                None => return Err(self.error("unterminated array")),
                _ => {}
            }

            items.push(self.parse_value()?);

            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                _ => return Err(self.error("expected ',' or ']' in array")),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(q @ (b'"' | b'\'')) => self.parse_string(q),
            Some(c) if is_ident_start(c) => Ok(self.take_identifier().to_string()),
            _ => Err(self.error("expected object key")),
        }
    }

    fn parse_string(&mut self, quote: u8) -> Result<String, LiteralError> {
        self.pos += 1; // opening quote
        let bytes = self.input.as_bytes();
        let mut out = String::new();

        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b == quote {
                self.pos += 1;
                return Ok(out);
            }
            if b == b'\\' {
                self.pos += 1;
                let escape = bytes.get(self.pos).copied().ok_or_else(|| {
                    self.error("unterminated escape sequence")
                })?;
                match escape {
                    b'"' => out.push('"'),
                    b'\'' => out.push('\''),
                    b'\\' => out.push('\\'),
                    b'/' => out.push('/'),
                    b'n' => out.push('\n'),
                    b't' => out.push('\t'),
                    b'r' => out.push('\r'),
                    b'b' => out.push('\u{0008}'),
                    b'f' => out.push('\u{000C}'),
                    b'u' => {
                        self.pos += 1;
                        let c = self.parse_unicode_escape()?;
                        out.push(c);
                        continue;
                    }
                    other => {
                        return Err(self.error(format!(
                            "unsupported escape '\\{}'",
                            other as char
                        )));
                    }
                }
                self.pos += 1;
            } else {
                // Consume one full UTF-8 character.
                match self.rest().chars().next() {
                    Some(ch) => {
                        out.push(ch);
                        self.pos += ch.len_utf8();
                    }
                    None => break,
                }
            }
        }
        Err(self.error("unterminated string"))
    }

    /// Parse the four hex digits of a `\u` escape (after `\u` was consumed),
    /// combining surrogate pairs.
    fn parse_unicode_escape(&mut self) -> Result<char, LiteralError> {
        let high = self.take_hex4()?;
        if (0xD800..0xDC00).contains(&high) {
            if !self.rest().starts_with("\\u") {
                return Err(self.error("unpaired surrogate in \\u escape"));
            }
            self.pos += 2;
            let low = self.take_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(self.error("invalid low surrogate in \\u escape"));
            }
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(code).ok_or_else(|| self.error("invalid \\u escape"));
        }
        char::from_u32(high).ok_or_else(|| self.error("invalid \\u escape"))
    }

    fn take_hex4(&mut self) -> Result<u32, LiteralError> {
        let hex = self
            .rest()
            .get(..4)
            .ok_or_else(|| self.error("truncated \\u escape"))?;
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| self.error("invalid hex in \\u escape"))?;
        self.pos += 4;
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<LiteralValue, LiteralError> {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        // Leading sign.
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'0'..=b'9' | b'.' => self.pos += 1,
                b'e' | b'E' => {
                    self.pos += 1;
                    if matches!(self.peek(), Some(b'-' | b'+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        let text = &self.input[start..self.pos];
        let stripped = text.strip_prefix('+').unwrap_or(text);
        stripped
            .parse::<f64>()
            .map(LiteralValue::Number)
            .map_err(|_| LiteralError {
                position: start,
                message: format!("invalid number '{text}'"),
            })
    }

    fn take_identifier(&mut self) -> &'a str {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && is_ident_char(bytes[self.pos]) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn parse_word(&mut self) -> Result<LiteralValue, LiteralError> {
        let start = self.pos;
        let word = self.take_identifier();
        match word {
            "null" | "undefined" => Ok(LiteralValue::Null),
            "true" => Ok(LiteralValue::Bool(true)),
            "false" => Ok(LiteralValue::Bool(false)),
            "function" => {
                self.pos = start;
                self.capture_classic_function()
            }
            _ => {
                // A bare identifier can only be an arrow-function parameter.
                self.skip_trivia();
                if self.rest().starts_with("=>") {
                    self.pos += 2;
                    self.capture_arrow_body(start)
                } else {
                    self.pos = start;
                    Err(self.error(format!("unexpected identifier '{word}'")))
                }
            }
        }
    }

    /// Capture a `function ... (...) { ... }` expression verbatim.
    fn capture_classic_function(&mut self) -> Result<LiteralValue, LiteralError> {
        let start = self.pos;
        let body_open = self
            .rest()
            .find('{')
            .ok_or_else(|| self.error("function literal without a body"))?;
        self.pos += body_open;
        let end = self.matching_brace()?;
        let source = self.input[start..end].to_string();
        self.pos = end;
        Ok(LiteralValue::Function(source))
    }

    /// Capture `(params) => body` starting at the opening parenthesis.
    fn capture_arrow_function(&mut self, start: usize) -> Result<LiteralValue, LiteralError> {
        self.skip_balanced(b'(', b')')?;
        self.skip_trivia();
        if !self.rest().starts_with("=>") {
            self.pos = start;
            return Err(self.error("expected '=>' after parenthesized parameter list"));
        }
        self.pos += 2;
        self.capture_arrow_body(start)
    }

    /// Capture the body of an arrow function whose source began at `start`.
    fn capture_arrow_body(&mut self, start: usize) -> Result<LiteralValue, LiteralError> {
        self.skip_trivia();
        if self.peek() == Some(b'{') {
            let end = self.matching_brace()?;
            self.pos = end;
        } else {
            self.skip_expression()?;
        }
        let source = self.input[start..self.pos].trim_end().to_string();
        Ok(LiteralValue::Function(source))
    }

    /// Advance past a balanced delimiter pair starting at the current
    /// position, tracking nested pairs and string literals.
    fn skip_balanced(&mut self, open: u8, close: u8) -> Result<(), LiteralError> {
        let bytes = self.input.as_bytes();
        debug_assert_eq!(self.peek(), Some(open));
        let mut depth = 0usize;
        let mut in_string: Option<u8> = None;
        let mut escaped = false;

        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            self.pos += 1;
            if let Some(quote) = in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == quote {
                    in_string = None;
                }
                continue;
            }
            match b {
                b'"' | b'\'' => in_string = Some(b),
                _ if b == open => depth += 1,
                _ if b == close => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(self.error("unbalanced delimiters"))
    }

    /// Byte offset just past the brace block starting at the current
    /// position (which must be `{`).
    fn matching_brace(&mut self) -> Result<usize, LiteralError> {
        let save = self.pos;
        self.skip_balanced(b'{', b'}')?;
        let end = self.pos;
        self.pos = save;
        Ok(end)
    }

    /// Skip an expression up to the next top-level `,`, `}`, or `]`.
    fn skip_expression(&mut self) -> Result<(), LiteralError> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut depth = 0i32;
        let mut in_string: Option<u8> = None;
        let mut escaped = false;

        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if let Some(quote) = in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == quote {
                    in_string = None;
                }
                self.pos += 1;
                continue;
            }
            match b {
                b'"' | b'\'' => in_string = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' => depth -= 1,
                b']' | b'}' if depth == 0 => break,
                b']' | b'}' => depth -= 1,
                b',' if depth == 0 => break,
                _ => {}
            }
            self.pos += 1;
        }

        if self.pos == start {
            return Err(self.error("expected an expression"));
        }
        Ok(())
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(entries: Vec<(&str, LiteralValue)>) -> LiteralValue {
        LiteralValue::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn test_strict_json_subset() {
        let parsed = parse_literal(r#"{"a": 1, "b": [true, null], "c": "x"}"#).unwrap();
        assert_eq!(
            parsed,
            obj(vec![
                ("a", LiteralValue::Number(1.0)),
                (
                    "b",
                    LiteralValue::Array(vec![LiteralValue::Bool(true), LiteralValue::Null])
                ),
                ("c", LiteralValue::String("x".to_string())),
            ])
        );
    }

    #[test]
    fn test_unquoted_keys_and_single_quotes() {
        let parsed = parse_literal("{chart: {type: 'line'}, labels: ['A', 'B']}").unwrap();
        let LiteralValue::Object(entries) = parsed else {
            panic!("expected object");
        };
        assert_eq!(entries[0].0, "chart");
        assert_eq!(entries[1].1, LiteralValue::Array(vec![
            LiteralValue::String("A".to_string()),
            LiteralValue::String("B".to_string()),
        ]));
    }

    #[test]
    fn test_trailing_commas() {
        let parsed = parse_literal("{a: 1, b: [2, 3,],}").unwrap();
        assert_eq!(
            parsed,
            obj(vec![
                ("a", LiteralValue::Number(1.0)),
                (
                    "b",
                    LiteralValue::Array(vec![
                        LiteralValue::Number(2.0),
                        LiteralValue::Number(3.0)
                    ])
                ),
            ])
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let parsed = parse_literal(
            "{\n// chart settings\na: 1, /* inline */ b: 2}",
        )
        .unwrap();
        assert_eq!(
            parsed,
            obj(vec![
                ("a", LiteralValue::Number(1.0)),
                ("b", LiteralValue::Number(2.0)),
            ])
        );
    }

    #[test]
    fn test_undefined_maps_to_null() {
        assert_eq!(parse_literal("undefined").unwrap(), LiteralValue::Null);
    }

    #[test]
    fn test_classic_function_captured_verbatim() {
        let src = "{formatter: function (val) { return val + \"%\"; }}";
        let parsed = parse_literal(src).unwrap();
        assert_eq!(
            parsed,
            obj(vec![(
                "formatter",
                LiteralValue::Function("function (val) { return val + \"%\"; }".to_string())
            )])
        );
    }

    #[test]
    fn test_arrow_function_captured() {
        let parsed = parse_literal("{formatter: (v) => 'R$ ' + v, next: 1}").unwrap();
        let LiteralValue::Object(entries) = parsed else {
            panic!("expected object");
        };
        assert_eq!(
            entries[0].1,
            LiteralValue::Function("(v) => 'R$ ' + v".to_string())
        );
        assert_eq!(entries[1].1, LiteralValue::Number(1.0));
    }

    #[test]
    fn test_bare_arrow_function_captured() {
        let parsed = parse_literal("{formatter: v => v + 1}").unwrap();
        let LiteralValue::Object(entries) = parsed else {
            panic!("expected object");
        };
        assert_eq!(entries[0].1, LiteralValue::Function("v => v + 1".to_string()));
    }

    #[test]
    fn test_function_inside_array() {
        let parsed = parse_literal("[function (a) { return a; }, 2]").unwrap();
        let LiteralValue::Array(items) = parsed else {
            panic!("expected array");
        };
        assert!(matches!(items[0], LiteralValue::Function(_)));
        assert_eq!(items[1], LiteralValue::Number(2.0));
    }

    #[test]
    fn test_function_body_with_braces_in_string() {
        let src = "{f: function (v) { return \"{\" + v + \"}\"; }}";
        let parsed = parse_literal(src).unwrap();
        let LiteralValue::Object(entries) = parsed else {
            panic!("expected object");
        };
        assert_eq!(
            entries[0].1,
            LiteralValue::Function("function (v) { return \"{\" + v + \"}\"; }".to_string())
        );
    }

    #[test]
    fn test_unicode_escape() {
        assert_eq!(
            parse_literal(r#""café""#).unwrap(),
            LiteralValue::String("caf\u{e9}".to_string())
        );
    }

    #[test]
    fn test_surrogate_pair_escape() {
        assert_eq!(
            parse_literal(r#""😀""#).unwrap(),
            LiteralValue::String("\u{1F600}".to_string())
        );
    }

    #[test]
    fn test_utf8_passthrough() {
        assert_eq!(
            parse_literal("'Análise de Receita'").unwrap(),
            LiteralValue::String("Análise de Receita".to_string())
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_literal("-1.5e3").unwrap(), LiteralValue::Number(-1500.0));
        assert_eq!(parse_literal("+2").unwrap(), LiteralValue::Number(2.0));
        assert_eq!(parse_literal(".5").unwrap(), LiteralValue::Number(0.5));
    }

    #[test]
    fn test_unterminated_string_errors() {
        let err = parse_literal("{a: \"oops}").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_bare_identifier_value_errors() {
        let err = parse_literal("{a: banana}").unwrap_err();
        assert!(err.message.contains("banana"));
    }

    #[test]
    fn test_trailing_garbage_errors() {
        let err = parse_literal("{a: 1} trailing").unwrap_err();
        assert!(err.message.contains("trailing"));
    }

    #[test]
    fn test_error_position_points_into_input() {
        let err = parse_literal("{a: @}").unwrap_err();
        assert_eq!(err.position, 4);
    }
}
