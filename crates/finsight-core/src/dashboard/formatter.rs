//! Chart label formatters materialized from function literals.
//!
//! Earlier prompt revisions instructed the model to emit chart-label
//! formatters as JavaScript function expressions inside the chart config.
//! This module turns such a literal into a [`LabelFormatter`]: the parameter
//! list plus a single `return` expression, evaluated through `jexl-eval`
//! against a context built from the call arguments.
//!
//! **Security note:** this is a restricted deserialization step, not a code
//! evaluator. Only single-expression bodies are accepted, evaluation has no
//! I/O and no ambient state beyond the bound parameters, and the caller
//! (see the materialization walk in the parent module) only compiles
//! literals found under allow-listed config fields.

use serde_json::Value;

/// Errors from formatter compilation or invocation.
#[derive(Debug, thiserror::Error)]
pub enum FormatterError {
    #[error("not a supported function literal: {0}")]
    NotAFunction(String),

    #[error("formatter evaluation failed: {0}")]
    Eval(String),
}

/// A compiled chart-label formatter.
///
/// Holds the original source text (used for serialization and equality)
/// and the extracted parameter names and body expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelFormatter {
    params: Vec<String>,
    body: String,
    source: String,
}

impl LabelFormatter {
    /// Compile a function literal.
    ///
    /// Accepts `function (a, b) { return EXPR; }` (named or anonymous) and
    /// arrow forms `(a) => EXPR`, `a => EXPR`, `(a) => { return EXPR; }`.
    /// Multi-statement bodies are rejected: a formatter is a pure
    /// value-to-label mapping, nothing more.
    pub fn compile(source: &str) -> Result<Self, FormatterError> {
        let (params, body) = parse_function_literal(source)
            .ok_or_else(|| FormatterError::NotAFunction(preview(source)))?;
        Ok(Self {
            params,
            body,
            source: source.trim().to_string(),
        })
    }

    /// The original literal text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parameter names, in declaration order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Invoke the formatter.
    ///
    /// Arguments are bound positionally to the parameter names (missing
    /// arguments bind to null) and the body expression is evaluated in that
    /// context.
    pub fn call(&self, args: &[Value]) -> Result<Value, FormatterError> {
        let mut context = serde_json::Map::new();
        for (i, param) in self.params.iter().enumerate() {
            context.insert(param.clone(), args.get(i).cloned().unwrap_or(Value::Null));
        }

        jexl_eval::Evaluator::new()
            .eval_in_context(&self.body, &Value::Object(context))
            .map_err(|e| FormatterError::Eval(e.to_string()))
    }
}

/// Whether a string looks like a function literal.
///
/// Used by the materialization walk to decide which *string* values under
/// allow-listed fields should be compiled. Deliberately conservative: a
/// false negative leaves an inert string, a false positive would fail the
/// parse loudly.
pub fn looks_like_function(s: &str) -> bool {
    let s = s.trim();
    if s.starts_with("function") && s.contains('(') {
        return true;
    }
    // Arrow forms: `(a, b) => ...` or `ident => ...`
    if let Some(idx) = s.find("=>") {
        let prefix = s[..idx].trim();
        if prefix.starts_with('(') && prefix.ends_with(')') {
            return true;
        }
        return is_identifier(prefix);
    }
    false
}

/// Extract (params, return expression) from a function literal.
///
/// Returns `None` when the text is not a function literal of a supported
/// shape (multi-statement bodies, missing `return`, unbalanced braces).
pub(crate) fn parse_function_literal(src: &str) -> Option<(Vec<String>, String)> {
    let s = src.trim();

    if let Some(rest) = s.strip_prefix("function") {
        // Optional name between `function` and the parameter list.
        let open = rest.find('(')?;
        let close = rest.find(')')?;
        if close < open {
            return None;
        }
        let name = rest[..open].trim();
        if !name.is_empty() && !is_identifier(name) {
            return None;
        }
        let params = split_params(&rest[open + 1..close]);

        let after = rest[close + 1..].trim_start();
        let block = brace_block(after)?;
        let body = return_expression(block)?;
        return Some((params, body));
    }

    // Arrow function.
    let (params, after_arrow) = if s.starts_with('(') {
        let close = s.find(')')?;
        let after = s[close + 1..].trim_start();
        let after = after.strip_prefix("=>")?;
        (split_params(&s[1..close]), after.trim_start())
    } else {
        let idx = s.find("=>")?;
        let ident = s[..idx].trim();
        if !is_identifier(ident) {
            return None;
        }
        (vec![ident.to_string()], s[idx + 2..].trim_start())
    };

    let body = if after_arrow.starts_with('{') {
        return_expression(brace_block(after_arrow)?)?
    } else {
        let expr = after_arrow.trim().trim_end_matches(';').trim();
        if expr.is_empty() {
            return None;
        }
        expr.to_string()
    };

    Some((params, body))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn split_params(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// The interior of the first balanced `{ ... }` block in `s`.
///
/// Tracks string literals so braces inside quotes do not affect depth.
fn brace_block(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
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
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start + 1..i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract the expression of a single `return EXPR;` body.
fn return_expression(block: &str) -> Option<String> {
    let inner = block.trim();
    let rest = inner.strip_prefix("return")?;
    // `return` must be a standalone keyword, not a prefix of an identifier.
    match rest.chars().next() {
        Some(c) if c.is_whitespace() || c == '(' => {}
        _ => return None,
    }
    let expr = rest.trim().trim_end_matches(';').trim();
    if expr.is_empty() || expr.contains(';') {
        // A second statement after the return is out of scope.
        return None;
    }
    Some(expr.to_string())
}

fn preview(s: &str) -> String {
    const MAX: usize = 60;
    let t = s.trim();
    if t.len() <= MAX {
        t.to_string()
    } else {
        let cut = t
            .char_indices()
            .take_while(|(i, _)| *i < MAX)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &t[..cut])
    }
}
