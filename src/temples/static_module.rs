//! `temples_static.js`: the curated temple list as a loadable JS module.
//!
//! Written with the literal printer, read back as JSON5 (the printed literal is
//! a JSON5 document, `NaN` included).

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::literal::{to_js_literal, JsValue};
use crate::output::{write_artifact, OutputError};

use super::{Bonus, TempleRecord};

pub const STATIC_MODULE_BANNER: &str =
    "// auto-generated by grepomap build-temples, do not edit by hand";
pub const STATIC_TEMPLES_IDENT: &str = "staticTemples";

/// Deepest `[`/`{` nesting accepted in a module; records sit at depth 2.
const MAX_NESTING: usize = 64;

#[derive(Debug)]
pub enum ModuleError {
    MissingAssignment,
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    NotAnArray,
    Record {
        index: usize,
        source: serde_json::Error,
    },
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAssignment => write!(f, "no `{STATIC_TEMPLES_IDENT} = …` assignment found"),
            Self::Syntax {
                line,
                column,
                message,
            } => write!(f, "{line}:{column}: {message}"),
            Self::NotAnArray => write!(f, "{STATIC_TEMPLES_IDENT} is not an array"),
            Self::Record { index, source } => write!(f, "temple #{index}: {source}"),
        }
    }
}

impl std::error::Error for ModuleError {}

impl From<&Bonus> for JsValue {
    fn from(bonus: &Bonus) -> Self {
        match bonus {
            Bonus::Integer(i) => JsValue::Number(*i as f64),
            Bonus::Decimal(f) => JsValue::Number(*f),
            Bonus::Text(s) => JsValue::String(s.clone()),
        }
    }
}

impl From<&TempleRecord> for JsValue {
    fn from(t: &TempleRecord) -> Self {
        let known = [
            ("id", JsValue::number_or_nan(t.id)),
            ("x", JsValue::number_or_nan(t.x)),
            ("y", JsValue::number_or_nan(t.y)),
            ("name", JsValue::String(t.name.clone())),
            ("type", JsValue::String(t.kind.clone())),
            ("bonus", JsValue::from(&t.bonus)),
            ("size", JsValue::String(t.size.clone())),
            ("owner", JsValue::Number(t.owner as f64)),
            ("contest", JsValue::String(t.contest.clone())),
            ("focus", JsValue::Bool(t.focus)),
        ]
        .map(|(k, v)| (k.to_string(), v));
        let extra = t.extra.iter().map(|(k, v)| (k.clone(), JsValue::from(v)));
        JsValue::object(known.into_iter().chain(extra))
    }
}

pub fn render_static_module(temples: &[TempleRecord]) -> String {
    let list = JsValue::Array(temples.iter().map(JsValue::from).collect());
    format!(
        "{STATIC_MODULE_BANNER}\nconst {STATIC_TEMPLES_IDENT} = {};\n\nmodule.exports = {{ {STATIC_TEMPLES_IDENT} }};\n",
        to_js_literal(&list)
    )
}

/// Byte offset just past the `=` of `staticTemples = …`.
fn assignment_start(src: &str) -> Option<usize> {
    src.match_indices(STATIC_TEMPLES_IDENT).find_map(|(at, ident)| {
        let standalone = src[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '$'));
        let after = &src[at + ident.len()..];
        let rest = after.trim_start();
        let is_assignment = rest.starts_with('=') && !rest.starts_with("==");
        (standalone && is_assignment).then(|| src.len() - rest.len() + 1)
    })
}

/// One-based line and column of a byte offset.
fn line_col(src: &str, offset: usize) -> (usize, usize) {
    let before = &src[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

/// Offset where bracket nesting first exceeds [MAX_NESTING]. Strings and
/// comments are skipped.
fn nesting_overflow(literal: &str) -> Option<usize> {
    let bytes = literal.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            b'[' | b'{' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Some(i);
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    None
}

fn syntax_error(src: &str, offset: usize, err: json5::Error) -> ModuleError {
    let (line0, col0) = line_col(src, offset);
    #[allow(unreachable_patterns)]
    let (message, location) = match err {
        json5::Error::Message { msg, location } => (msg, location),
        other => (other.to_string(), None),
    };
    let (line, column) = match location {
        Some(loc) if loc.line <= 1 => (line0, col0 + loc.column.saturating_sub(1)),
        Some(loc) => (line0 + loc.line - 1, loc.column),
        None => (line0, col0),
    };
    ModuleError::Syntax {
        line,
        column,
        message,
    }
}

/// Reads the `staticTemples` array out of a module. The literal ends at the
/// first `;` that closes a complete JSON5 value, so `;` inside names is fine.
pub fn parse_static_module(src: &str) -> Result<Vec<TempleRecord>, ModuleError> {
    let start = assignment_start(src).ok_or(ModuleError::MissingAssignment)?;
    let rest = &src[start..];

    if let Some(at) = nesting_overflow(rest) {
        let (line, column) = line_col(src, start + at);
        return Err(ModuleError::Syntax {
            line,
            column,
            message: format!("nested deeper than {MAX_NESTING} levels"),
        });
    }

    let ends = rest
        .match_indices(';')
        .map(|(at, _)| at)
        .chain(std::iter::once(rest.len()));
    let mut first_error = None;
    let mut parsed = None;
    for end in ends {
        match json5::from_str::<serde_json::Value>(&rest[..end]) {
            Ok(value) => {
                parsed = Some(value);
                break;
            }
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    let value = match (parsed, first_error) {
        (Some(value), _) => value,
        (None, Some(err)) => return Err(syntax_error(src, start, err)),
        (None, None) => return Err(ModuleError::MissingAssignment),
    };

    let serde_json::Value::Array(items) = value else {
        return Err(ModuleError::NotAnArray);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|source| ModuleError::Record { index, source })
        })
        .collect()
}

/// Loads the curated set. A missing file is the first run and yields an empty set.
pub fn load_static_module(path: &Path) -> Result<Vec<TempleRecord>, OutputError> {
    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no static temples module yet, starting empty");
            return Ok(Vec::new());
        }
        Err(err) => return Err(OutputError::Read(path.to_path_buf(), err)),
    };
    parse_static_module(&src).map_err(|err| OutputError::Module(path.to_path_buf(), err))
}

pub fn write_static_module(path: &Path, temples: &[TempleRecord]) -> Result<(), OutputError> {
    write_artifact(path, &render_static_module(temples))
}
