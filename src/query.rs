//! Simple (non-prepared) query path helpers: inline literal substitution
//! of `?` placeholders, and rendering values as CQL literal text.

use std::fmt::Write;

use crate::value::Value;

/// Replace each unescaped `?` placeholder with the next param, in order.
///
/// A `?` inside a single-quoted string literal is not a placeholder.
/// Literal tracking toggles on every single quote, which also handles the
/// CQL `''` escape (it toggles twice). Missing params are not an error:
/// with `None` or too few params the remaining `?` stay as-is.
pub fn substitute(query: &str, params: Option<&[&str]>) -> String {
    let Some(params) = params else {
        return query.to_owned();
    };
    let mut params = params.iter();
    let mut out = String::with_capacity(query.len());
    let mut in_literal = false;
    for ch in query.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                out.push(ch);
            }
            '?' if !in_literal => match params.next() {
                Some(param) => out.push_str(param),
                None => out.push(ch),
            },
            _ => out.push(ch),
        }
    }
    out
}

/// Render a value as CQL literal text, suitable as a [`substitute`] param.
pub fn to_query_literal(value: &Value) -> String {
    let mut out = String::new();
    write_literal(&mut out, value);
    out
}

fn write_literal(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Int(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Bigint(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Float(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Double(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Boolean(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Timestamp(ms) => {
            let _ = write!(out, "{ms}");
        }
        Value::Uuid(u) => {
            let _ = write!(out, "{u}");
        }
        Value::Text(s) => {
            out.push('\'');
            for ch in s.chars() {
                if ch == '\'' {
                    out.push('\'');
                }
                out.push(ch);
            }
            out.push('\'');
        }
        Value::Blob(bytes) => {
            out.push_str("0x");
            for byte in bytes {
                let _ = write!(out, "{byte:02x}");
            }
        }
        Value::List(items) => write_sequence(out, items, '[', ']'),
        Value::Set(items) => write_sequence(out, items, '{', '}'),
        Value::Map(pairs) => {
            out.push('{');
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(out, key);
                out.push_str(": ");
                write_literal(out, value);
            }
            out.push('}');
        }
    }
}

fn write_sequence(out: &mut String, items: &[Value], open: char, close: char) {
    out.push(open);
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_literal(out, item);
    }
    out.push(close);
}
