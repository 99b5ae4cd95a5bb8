//! The dynamic data model templates are executed against.
//!
//! [`Value`] is a tagged union over the shapes data can take once it has been
//! decoded from JSON or handed over by a host: null, booleans, numbers,
//! strings, ordered lists, unordered maps and attribute bags ("objects").
//! Maps and objects keep their insertion order in memory; anything that
//! renders them (`Display`, JSON encoding) walks keys in ascending order so
//! output never depends on how the data was built.
//!
//! Nesting depth is unbounded. Decoding, formatting, encoding and dropping
//! never recurse on the caller's stack without checking it first.

use crate::{
    constants::NIL_TEXT,
    error::{Error, Result},
    ext::ensure_stack,
};
use indexmap::IndexMap;
use serde::{
    de::{self, MapAccess, SeqAccess, Visitor},
    ser::{Error as _, SerializeMap, SerializeSeq},
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{fmt, io, mem};

/// A numeric value, either an integer or a double.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Returns the integer value, accepting floats that hold an exact integer.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(i) => Some(i),
            Number::Float(f)
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
            {
                Some(f as i64)
            }
            Number::Float(_) => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(v) => f.write_str(&format_float(v)),
        }
    }
}

/// Formats a double the way Go's `%v` verb does: shortest representation,
/// switching to exponent form below 1e-4 and from 1e6 upwards.
pub(crate) fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    let sci = format!("{v:e}");
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        format!("{v}")
    }
}

/// A dynamically typed data value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Decodes JSON text into a value.
    ///
    /// The nesting depth of the input is not limited. Integral numbers that
    /// fit an `i64` decode as [`Number::Int`], everything else as a double.
    pub fn from_json_str(text: &str) -> Result<Value> {
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))
            .and_then(|value| de.end().map(|_| value))
            .map_err(|e| Error::Argument(e.to_string()))?;
        Ok(value)
    }

    /// Encodes the value as compact JSON the way Go's `json.Marshal` does:
    /// map keys in ascending order, `<`, `>` and `&` escaped.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, GoJsonFormatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// The name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "nil",
            Value::Bool(_) => "bool",
            Value::Number(Number::Int(_)) => "int",
            Value::Number(Number::Float(_)) => "float64",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    /// Truthiness: null, false, zero and empty values are false.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) | Value::Object(entries) => !entries.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Entries of a map or object; `None` for every other variant.
    pub fn entries(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(entries) | Value::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Number of nested levels, counting the value itself. Scalars are 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((value, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match value {
                Value::List(items) => pending.extend(items.iter().map(|v| (v, depth + 1))),
                Value::Map(entries) | Value::Object(entries) => {
                    pending.extend(entries.values().map(|v| (v, depth + 1)))
                }
                _ => {}
            }
        }
        deepest
    }
}

impl Drop for Value {
    // Children are detached onto a work list so dropping a deep value never
    // recurses.
    fn drop(&mut self) {
        let mut pending = match self {
            Value::List(items) if !items.is_empty() => mem::take(items),
            Value::Map(entries) | Value::Object(entries) if !entries.is_empty() => {
                mem::take(entries).into_values().collect()
            }
            _ => return,
        };
        while let Some(mut value) = pending.pop() {
            match &mut value {
                Value::List(items) => pending.append(items),
                Value::Map(entries) | Value::Object(entries) => {
                    pending.extend(mem::take(entries).into_values())
                }
                _ => {}
            }
        }
    }
}

/// Entries of a map sorted by key.
pub(crate) fn sorted_entries(entries: &IndexMap<String, Value>) -> Vec<(&String, &Value)> {
    let mut sorted: Vec<_> = entries.iter().collect();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
    sorted
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_stack(|| match self {
            Value::Null => f.write_str(NIL_TEXT),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) | Value::Object(entries) => {
                f.write_str("map[")?;
                for (i, (key, value)) in sorted_entries(entries).into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("]")
            }
        })
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ensure_stack(|| match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Float(v)) if v.is_finite() => serializer.serialize_f64(*v),
            Value::Number(Number::Float(v)) => {
                Err(S::Error::custom(format!("unsupported value: {}", format_float(*v))))
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) | Value::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in sorted_entries(entries) {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        })
    }
}

/// JSON output in the shape of Go's `encoding/json`.
struct GoJsonFormatter;

impl serde_json::ser::Formatter for GoJsonFormatter {
    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            let escaped = match c {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = i + c.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(json_float(value).as_bytes())
    }
}

/// Shortest decimal form, with an exponent below 1e-6 and from 1e21 upwards.
fn json_float(v: f64) -> String {
    let abs = v.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        let sci = format!("{v:e}");
        match sci.split_once('e') {
            Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
            Some((mantissa, exp)) => format!("{mantissa}e+{exp:0>2}"),
            None => sci,
        }
    } else {
        format!("{v}")
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<Value, E> {
        Ok(Value::from(i))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<Value, E> {
        Ok(i64::try_from(u).map_or(Value::from(u as f64), Value::from))
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<Value, E> {
        Ok(Value::from(f))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::from(s))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            entries.insert(key, value);
        }
        Ok(Value::Map(entries))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        ensure_stack(|| match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Number(Number::Int(i)),
                None => n.as_f64().map_or(Value::Null, |f| Value::Number(Number::Float(f))),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        })
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Number::Int(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Number(Number::Int(i64::from(i)))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        i64::try_from(i)
            .map(Value::from)
            .unwrap_or(Value::Number(Number::Float(i as f64)))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested_lists(depth: usize) -> String {
        format!("{}1{}", "[".repeat(depth), "]".repeat(depth))
    }

    #[test]
    fn formats_like_go_verb_v() {
        assert_eq!(Value::Null.to_string(), "<nil>");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(3.0).to_string(), "3");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "[a b]");
        assert_eq!(Value::from(json!([1, null, "x"])).to_string(), "[1 <nil> x]");
    }

    #[test]
    fn float_exponent_thresholds() {
        assert_eq!(format_float(123456.0), "123456");
        assert_eq!(format_float(1e6), "1e+06");
        assert_eq!(format_float(1.5e21), "1.5e+21");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.000015), "1.5e-05");
        assert_eq!(format_float(f64::NAN), "NaN");
        assert_eq!(format_float(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn maps_render_with_sorted_keys() {
        let mut entries = IndexMap::new();
        entries.insert("zeta".to_string(), Value::from(1));
        entries.insert("alpha".to_string(), Value::from("a"));
        entries.insert("mid".to_string(), Value::Null);
        assert_eq!(Value::Map(entries.clone()).to_string(), "map[alpha:a mid:<nil> zeta:1]");
        assert_eq!(Value::Object(entries).to_string(), "map[alpha:a mid:<nil> zeta:1]");
        assert_eq!(Value::Map(IndexMap::new()).to_string(), "map[]");
    }

    #[test]
    fn decodes_json_one_to_one() {
        let value = Value::from_json_str(r#"{"a": [1, 2.5, "s", true, null], "b": {}}"#).unwrap();
        let Value::Map(entries) = &value else {
            panic!("expected a map, got {}", value.kind());
        };
        assert_eq!(
            entries["a"],
            Value::List(vec![
                Value::from(1),
                Value::from(2.5),
                Value::from("s"),
                Value::from(true),
                Value::Null,
            ])
        );
        assert_eq!(entries["b"], Value::Map(IndexMap::new()));
    }

    #[test]
    fn integral_json_numbers_stay_integers() {
        let value = Value::from_json_str(r#"[1000000, 1e6, 18446744073709551615]"#).unwrap();
        assert_eq!(value.to_string(), "[1000000 1e+06 1.8446744073709552e+19]");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(Value::from_json_str("{"), Err(Error::Argument(_))));
        assert!(matches!(Value::from_json_str("1 2"), Err(Error::Argument(_))));
    }

    #[test]
    fn deep_json_decodes_formats_and_drops() {
        let depth = 100_000;
        let value = Value::from_json_str(&nested_lists(depth)).unwrap();
        assert_eq!(value.depth(), depth + 1);
        assert!(value.to_string().starts_with("[[[[1"));
        assert!(value.to_json().unwrap().ends_with("1]]]]"));
        drop(value);
    }

    #[test]
    fn encodes_json_like_go() {
        let value: Value = [("b", Value::from(1)), ("a", Value::from(vec![0.5]))]
            .into_iter()
            .collect();
        assert_eq!(value.to_json().unwrap(), r#"{"a":[0.5],"b":1}"#);
        assert_eq!(
            Value::from("<a & b>").to_json().unwrap(),
            r#""\u003ca \u0026 b\u003e""#
        );
        assert_eq!(Value::from(vec![3.0, 1e21, 1.5e-7]).to_json().unwrap(), "[3,1e+21,1.5e-7]");
        assert!(Value::from(f64::INFINITY).to_json().is_err());
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_true());
        assert!(!Value::from(0).is_true());
        assert!(!Value::from("").is_true());
        assert!(!Value::List(vec![]).is_true());
        assert!(Value::from(0.1).is_true());
        assert!(Value::from(vec![Value::Null]).is_true());
    }
}
