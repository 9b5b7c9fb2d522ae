use crate::error::{Result, SbrError};
use serde_json::Value;
use std::collections::BTreeMap;

/// Indentation of the argument and field blocks inside a query.
const BLOCK_INDENT: usize = 8;

/// A value substituted for a `$name` placeholder in an argument template.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    Str(String),
    List(Vec<ArgValue>),
}

impl ArgValue {
    pub fn render(&self) -> String {
        match self {
            ArgValue::Int(n) => n.to_string(),
            ArgValue::Str(s) => Value::from(s.as_str()).to_string(),
            ArgValue::List(items) => format!(
                "[{}]",
                items.iter().map(ArgValue::render).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

impl From<i64> for ArgValue {
    fn from(n: i64) -> Self {
        ArgValue::Int(n)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Str(s)
    }
}

impl From<Vec<i64>> for ArgValue {
    fn from(ids: Vec<i64>) -> Self {
        ArgValue::List(ids.into_iter().map(ArgValue::Int).collect())
    }
}

impl From<&[i64]> for ArgValue {
    fn from(ids: &[i64]) -> Self {
        ArgValue::List(ids.iter().copied().map(ArgValue::Int).collect())
    }
}

pub type Args = BTreeMap<String, ArgValue>;

/// Replace every `$name` in `template` with the rendered argument.
pub fn substitute(template: &str, args: &Args) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..len];
        if name.is_empty() {
            out.push('$');
        } else {
            let value = args
                .get(name)
                .ok_or_else(|| SbrError::Config(format!("no value for argument '${}'", name)))?;
            out.push_str(&value.render());
        }
        rest = &after[len..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Strip surrounding blank lines and common leading whitespace, then indent
/// every line by `indent` spaces.
fn format_block(text: &str, indent: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.trim().is_empty()).map_or(start, |i| i + 1);
    let body = &lines[start..end];

    let common = body
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.bytes().take_while(|b| *b == b' ' || *b == b'\t').count())
        .min()
        .unwrap_or(0);
    let pad = " ".repeat(indent);
    body.iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, &l[common..])
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lay out a complete query. Lines queries take no field selection.
pub fn build_query_string(operation: &str, args: &str, fields: Option<&str>) -> String {
    let args = format_block(args, BLOCK_INDENT);
    match fields {
        Some(fields) => format!(
            "query {{\n    {}(\n{}\n    ) {{\n{}\n    }}\n}}",
            operation,
            args,
            format_block(fields, BLOCK_INDENT)
        ),
        None => format!("query {{\n    {}(\n{}\n    )\n}}", operation, args),
    }
}
