//! The helper functions callable from template bodies.
//!
//! Every function here is pure: it looks only at its arguments, and regexes
//! are compiled fresh on each call.

use crate::{error::FuncError, template::bridge, value::Value};
use gtmpl::Value as GoValue;
use log::trace;
use regex::Regex;
use std::collections::BTreeMap;
use unicode_segmentation::UnicodeSegmentation;

/// Why a call into the library failed.
#[derive(Debug)]
pub enum CallError {
    /// An argument had the wrong type.
    Argument(String),
    /// The function itself failed.
    Func(FuncError),
}

impl From<FuncError> for CallError {
    fn from(err: FuncError) -> Self {
        CallError::Func(err)
    }
}

impl From<regex::Error> for CallError {
    fn from(err: regex::Error) -> Self {
        CallError::Func(FuncError::Pattern(err))
    }
}

pub type FuncResult = Result<Value, CallError>;

/// A library function with a fixed number of parameters.
#[derive(Debug, Clone, Copy)]
pub struct Function {
    pub arity: usize,
    pub call: fn(&[&Value]) -> FuncResult,
    /// `call` wrapped for registration with the template engine.
    pub adapter: gtmpl::Func,
}

// Expands to a non-capturing closure per function so the adapter coerces to
// a plain `fn` pointer.
macro_rules! register {
    ($lib:expr, $name:literal, $arity:literal, $call:path) => {
        $lib.funcs.insert(
            $name,
            Function {
                arity: $arity,
                call: $call,
                adapter: |args: &[GoValue]| bridge::invoke($name, $arity, $call, args),
            },
        )
    };
}

/// The set of named functions a template is compiled against.
#[derive(Debug, Clone, Default)]
pub struct FunctionLibrary {
    funcs: BTreeMap<&'static str, Function>,
}

impl FunctionLibrary {
    /// A library with no functions; only the template language's built-ins resolve.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard library of helper functions.
    pub fn standard() -> Self {
        let mut lib = Self::empty();
        register!(lib, "json", 1, json);
        register!(lib, "lower", 1, lower);
        register!(lib, "match", 2, match_);
        register!(lib, "replace", 3, replace);
        register!(lib, "split", 2, split);
        register!(lib, "split_n", 3, split_n);
        register!(lib, "title", 1, title);
        register!(lib, "truncate", 2, truncate);
        register!(lib, "upper", 1, upper);
        lib
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.funcs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.funcs.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Function)> + '_ {
        self.funcs.iter().map(|(name, function)| (*name, function))
    }
}

fn string_arg<'a>(args: &[&'a Value], index: usize) -> Result<&'a str, CallError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(CallError::Argument(format!(
            "wrong type for value; expected string; got {}",
            other.kind()
        ))),
        None => Err(CallError::Argument(format!("missing argument {index}"))),
    }
}

fn int_arg(args: &[&Value], index: usize) -> Result<i64, CallError> {
    match args.get(index) {
        Some(value) => value.as_i64().ok_or_else(|| {
            CallError::Argument(format!(
                "wrong type for value; expected int; got {}",
                value.kind()
            ))
        }),
        None => Err(CallError::Argument(format!("missing argument {index}"))),
    }
}

fn json(args: &[&Value]) -> FuncResult {
    let null = Value::Null;
    let value = args.first().copied().unwrap_or(&null);
    let text = value.to_json().map_err(FuncError::Encoding)?;
    Ok(Value::String(text))
}

fn lower(args: &[&Value]) -> FuncResult {
    Ok(Value::String(string_arg(args, 0)?.chars().map(lower_char).collect()))
}

fn upper(args: &[&Value]) -> FuncResult {
    Ok(Value::String(string_arg(args, 0)?.chars().map(upper_char).collect()))
}

// Case mapping is one rune to one rune: characters whose upper case is
// longer than a single rune (like 'ß') are kept as they are.
fn upper_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn lower_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn title(args: &[&Value]) -> FuncResult {
    Ok(Value::String(title_case(string_arg(args, 0)?)))
}

/// Upper-cases the first character of every word and lower-cases the rest.
/// Words are found with Unicode word boundaries, so `_`, `.` between letters
/// and apostrophes stay inside a word while spaces and `-` separate words.
pub fn title_case(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for segment in source.split_word_bounds() {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if segment.chars().any(char::is_alphanumeric) => {
                out.push(upper_char(first));
                out.extend(chars.map(lower_char));
            }
            _ => out.push_str(segment),
        }
    }
    out
}

fn truncate(args: &[&Value]) -> FuncResult {
    let n = int_arg(args, 0)?;
    let source = string_arg(args, 1)?;
    Ok(Value::from(truncate_chars(n, source)))
}

/// Keeps the first `n` characters of `source`; never pads.
pub fn truncate_chars(n: i64, source: &str) -> &str {
    let Ok(n) = usize::try_from(n) else {
        return source;
    };
    match source.char_indices().nth(n) {
        Some((end, _)) => &source[..end],
        None => source,
    }
}

fn compile(pattern: &str) -> Result<Regex, CallError> {
    trace!("compiling pattern {pattern:?}");
    Ok(Regex::new(pattern)?)
}

fn match_(args: &[&Value]) -> FuncResult {
    let pattern = string_arg(args, 0)?;
    let source = string_arg(args, 1)?;
    Ok(Value::Bool(compile(pattern)?.is_match(source)))
}

fn replace(args: &[&Value]) -> FuncResult {
    let pattern = string_arg(args, 0)?;
    let replacement = string_arg(args, 1)?;
    let source = string_arg(args, 2)?;
    let re = compile(pattern)?;
    Ok(Value::from(re.replace_all(source, replacement).into_owned()))
}

fn split(args: &[&Value]) -> FuncResult {
    let pattern = string_arg(args, 0)?;
    let source = string_arg(args, 1)?;
    Ok(Value::from(split_pieces(&compile(pattern)?, source, -1)))
}

fn split_n(args: &[&Value]) -> FuncResult {
    let pattern = string_arg(args, 0)?;
    let n = int_arg(args, 1)?;
    let source = string_arg(args, 2)?;
    Ok(Value::from(split_pieces(&compile(pattern)?, source, n)))
}

/// Splits `source` around matches of `re`, producing at most `limit` pieces
/// when `limit` is positive. The last piece holds the unsplit remainder.
pub fn split_pieces(re: &Regex, source: &str, limit: i64) -> Vec<String> {
    if !re.as_str().is_empty() && source.is_empty() {
        return vec![String::new()];
    }
    let mut pieces = Vec::new();
    let (mut beg, mut end) = (0, 0);
    for m in re.find_iter(source) {
        if limit > 0 && pieces.len() as i64 == limit - 1 {
            break;
        }
        end = m.start();
        if m.end() != 0 {
            pieces.push(source[beg..end].to_string());
        }
        beg = m.end();
    }
    if end != source.len() {
        pieces.push(source[beg..].to_string());
    }
    pieces
}
